//! Loader error codes and the error value carried by every loader operation.

use std::borrow::Cow;

use thiserror::Error;

/// Outcome of a loader call, as surfaced across the C boundary.
///
/// The numeric values are part of the ABI and must never change.
#[repr(i32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderErrorCode {
    /// The loader call succeeded.
    Success = 0,
    /// The loader cannot open the given file name.
    CannotOpen = 1,
    /// The VM create function not found.
    SymbolNotFound = 2,
    /// The invalid argument value provided.
    InvalidArgument = 3,
    /// The creation of a VM instance has failed.
    VmCreationFailure = 4,
    /// The ABI version of the VM instance has mismatched.
    AbiVersionMismatch = 5,
    /// The VM option is invalid.
    InvalidOptionName = 6,
    /// The VM option value is invalid.
    InvalidOptionValue = 7,
    /// Sentinel callers pre-load into the out-parameter.
    #[default]
    UnspecifiedError = -1,
}

impl LoaderErrorCode {
    /// All codes, in ABI order (sentinel last).
    pub const ALL: [Self; 9] = [
        Self::Success,
        Self::CannotOpen,
        Self::SymbolNotFound,
        Self::InvalidArgument,
        Self::VmCreationFailure,
        Self::AbiVersionMismatch,
        Self::InvalidOptionName,
        Self::InvalidOptionValue,
        Self::UnspecifiedError,
    ];

    /// Raw ABI value.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Map a raw ABI value back to a code.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_raw() == raw)
    }

    /// Stable upper-snake-case name, as used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::CannotOpen => "CANNOT_OPEN",
            Self::SymbolNotFound => "SYMBOL_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::VmCreationFailure => "VM_CREATION_FAILURE",
            Self::AbiVersionMismatch => "ABI_VERSION_MISMATCH",
            Self::InvalidOptionName => "INVALID_OPTION_NAME",
            Self::InvalidOptionValue => "INVALID_OPTION_VALUE",
            Self::UnspecifiedError => "UNSPECIFIED_ERROR",
        }
    }
}

/// A failed loader operation: the code plus the formatted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoaderError {
    code: LoaderErrorCode,
    message: String,
}

impl LoaderError {
    pub fn new(code: LoaderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> LoaderErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    // Argument validation (always detected before any OS call).

    pub fn null_file_name() -> Self {
        Self::invalid_argument("file name cannot be null")
    }

    pub fn empty_file_name() -> Self {
        Self::invalid_argument("file name cannot be empty")
    }

    pub fn file_name_too_long(length: usize, max: usize) -> Self {
        Self::invalid_argument(format!(
            "file name is too long ({length}, maximum allowed length is {max})"
        ))
    }

    pub fn file_name_interior_nul() -> Self {
        Self::invalid_argument("file name contains a nul byte")
    }

    pub fn null_configuration() -> Self {
        Self::invalid_argument("configuration cannot be null")
    }

    pub fn configuration_interior_nul() -> Self {
        Self::invalid_argument("configuration contains a nul byte")
    }

    pub fn configuration_too_long(max: usize) -> Self {
        Self::invalid_argument(format!(
            "configuration is too long (maximum allowed length is {max})"
        ))
    }

    fn invalid_argument(detail: impl AsRef<str>) -> Self {
        Self::new(
            LoaderErrorCode::InvalidArgument,
            format!("invalid argument: {}", detail.as_ref()),
        )
    }

    // Open / link.

    /// Open failure. The platform diagnostic wins when one is available.
    pub fn cannot_open(path: &[u8], os_diagnostic: Option<String>) -> Self {
        let message = os_diagnostic.unwrap_or_else(|| format!("cannot open {}", shown(path)));
        Self::new(LoaderErrorCode::CannotOpen, message)
    }

    pub fn symbol_not_found(path: &[u8]) -> Self {
        Self::new(
            LoaderErrorCode::SymbolNotFound,
            format!("QRVMC create function not found in {}", shown(path)),
        )
    }

    // Creation / ABI.

    pub fn creation_failed(path: &[u8]) -> Self {
        Self::new(
            LoaderErrorCode::VmCreationFailure,
            format!("creating QRVMC VM of {} has failed", shown(path)),
        )
    }

    pub fn abi_mismatch(observed: i32, path: &[u8], expected: i32) -> Self {
        Self::new(
            LoaderErrorCode::AbiVersionMismatch,
            format!(
                "QRVMC ABI version {observed} of {} mismatches the expected version {expected}",
                shown(path)
            ),
        )
    }

    // Options.

    pub fn options_unsupported(vm_name: &str, path: &[u8]) -> Self {
        Self::new(
            LoaderErrorCode::InvalidOptionName,
            format!("{vm_name} ({}) does not support any options", shown(path)),
        )
    }

    pub fn unknown_option(vm_name: &str, path: &[u8], name: &[u8]) -> Self {
        Self::new(
            LoaderErrorCode::InvalidOptionName,
            format!(
                "{vm_name} ({}): unknown option '{}'",
                shown(path),
                shown(name)
            ),
        )
    }

    pub fn unsupported_value(vm_name: &str, path: &[u8], name: &[u8], value: &[u8]) -> Self {
        Self::new(
            LoaderErrorCode::InvalidOptionValue,
            format!(
                "{vm_name} ({}): unsupported value '{}' for option '{}'",
                shown(path),
                shown(value),
                shown(name)
            ),
        )
    }

    // Unrecognized set_option results are reported as INVALID_OPTION_VALUE
    // with their own wording.
    pub fn option_unknown_error(
        vm_name: &str,
        path: &[u8],
        name: &[u8],
        value: &[u8],
    ) -> Self {
        Self::new(
            LoaderErrorCode::InvalidOptionValue,
            format!(
                "{vm_name} ({}): unknown error when setting value '{}' for option '{}'",
                shown(path),
                shown(value),
                shown(name)
            ),
        )
    }
}

/// Caller-supplied bytes as they appear in a diagnostic.
fn shown(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
