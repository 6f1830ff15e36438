//! # qrvmc-core
//!
//! Safe, platform-independent logic behind the QRVMC dynamic VM loader.
//!
//! This crate owns every decision the loader makes that does not need to touch
//! the operating system: which symbol a library is expected to export, how a
//! configuration string splits into a path and options, how option results are
//! turned into errors, and how diagnostics are bounded. The `extern "C"`
//! boundary and the actual `dlopen`/`dlsym` calls live in `qrvmc-abi`.
//!
//! No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod abi;
pub mod error;
pub mod message;
pub mod options;
pub mod settings;
pub mod symbol;

pub use abi::{ABI_VERSION, Capabilities, SetOptionStatus};
pub use error::{LoaderError, LoaderErrorCode};
pub use message::{BoundedMessage, LAST_ERROR_CAPACITY};
pub use options::{
    ApplyState, ConfigOption, Configuration, MAX_CONFIG_LENGTH, OptionTarget, apply_options,
    parse_configuration,
};
pub use settings::{BindingMode, binding_mode};
pub use symbol::{
    CREATE_FN_PREFIX, DEFAULT_CREATE_FN, MAX_PATH_LENGTH, derive_create_symbol, library_base_name,
    validate_path,
};
