//! # qrvmc-abi
//!
//! `extern "C"` boundary of the QRVMC dynamic VM loader.
//!
//! This crate produces a `cdylib` (`libqrvmc_abi.so`) exporting the loader
//! entry points a host calls to open a VM library, create an instance, and
//! configure it from a `path,name=value,...` string. Decisions that do not
//! touch the OS come from `qrvmc-core`.
//!
//! # Architecture
//!
//! ```text
//! C caller -> loader_abi (register reset, arg decode) -> Loader -> DynamicLibrary
//!                                                          \-> qrvmc-core (symbol, options)
//! ```
//!
//! Rust callers use [`Loader`] directly and get a [`LoaderError`] back instead
//! of going through the process-wide last-error register.
//!
//! [`LoaderError`]: qrvmc_core::LoaderError

pub mod dynlib;
pub mod last_error;
pub mod loader;
pub mod loader_abi;
pub mod telemetry;
pub mod util;
pub mod vm;
pub mod vm_abi;

pub use dynlib::{DynamicLibrary, FakeLibrary, LibraryHandle, SystemLibrary};
pub use loader::Loader;
pub use telemetry::{LoaderCall, LoaderStats};
pub use vm::{CreateFn, QrvmcVm, Vm};
