//! Tooling harness for the QRVMC loader.
//!
//! This crate provides:
//! - Reports: load-and-inspect a configured VM, derived symbols, tokenized configs
//! - Structured JSONL logging of loader calls, with a line validator

#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod structured_log;

pub use error::HarnessError;
pub use report::{ConfigReport, SymbolReport, VmReport};
