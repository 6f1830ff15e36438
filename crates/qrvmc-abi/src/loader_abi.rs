//! Loader ABI: `qrvmc_load`, `qrvmc_load_and_create`,
//! `qrvmc_load_and_configure`, `qrvmc_last_error_msg`.
//!
//! Each entry resets the last-error register, runs the [`Loader`], and maps a
//! failure onto both the optional out-parameter code and the register. The
//! `*_via` variants take the dynamic-library backend explicitly.

use std::ffi::{CStr, c_char};

use qrvmc_core::{LoaderError, LoaderErrorCode, MAX_CONFIG_LENGTH};

use crate::dynlib::{DynamicLibrary, SystemLibrary};
use crate::last_error;
use crate::loader::Loader;
use crate::telemetry::{self, LoaderCall};
use crate::util::{CArgError, c_bytes_arg};
use crate::vm::{CreateFn, QrvmcVm, Vm};

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

// Arguments are bytes. Whatever encoding the caller uses reaches `dlopen` and
// `set_option` unchanged.

unsafe fn path_arg<'a>(filename: *const c_char) -> Result<&'a [u8], LoaderError> {
    if filename.is_null() {
        return Err(LoaderError::null_file_name());
    }
    // Read in full: the too-long diagnostic names the observed length.
    // SAFETY: non-null and NUL-terminated per the caller contract.
    Ok(unsafe { CStr::from_ptr(filename) }.to_bytes())
}

unsafe fn config_arg<'a>(config: *const c_char) -> Result<&'a [u8], LoaderError> {
    // SAFETY: forwarded caller contract; at most MAX_CONFIG_LENGTH bytes are read.
    unsafe { c_bytes_arg(config, MAX_CONFIG_LENGTH) }.map_err(|err| match err {
        CArgError::Null => LoaderError::null_configuration(),
        CArgError::Unterminated => LoaderError::configuration_too_long(MAX_CONFIG_LENGTH),
    })
}

/// Argument errors never reach the loader, so they are counted here.
fn rejected<T>(call: LoaderCall, err: LoaderError) -> Result<T, LoaderError> {
    telemetry::observe(call, err.code());
    Err(err)
}

/// Publish the outcome: code to `error_code` when non-null, message to the register.
unsafe fn finish<T>(result: Result<T, LoaderError>, error_code: *mut LoaderErrorCode) -> Option<T> {
    let code = match &result {
        Ok(_) => LoaderErrorCode::Success,
        Err(err) => err.code(),
    };
    if !error_code.is_null() {
        // SAFETY: caller passed a writable out-parameter or null.
        unsafe { *error_code = code };
    }
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            last_error::record(&err);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Backend-generic entry points
// ---------------------------------------------------------------------------

/// [`qrvmc_load`] over an explicit backend.
///
/// # Safety
///
/// `filename` must be null or NUL-terminated; `error_code` null or writable.
pub unsafe fn load_via<L: DynamicLibrary>(
    library: L,
    filename: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> Option<CreateFn> {
    last_error::reset();
    // SAFETY: forwarded caller contract.
    let result = match unsafe { path_arg(filename) } {
        Ok(path) => Loader::new(library).load(path),
        Err(err) => rejected(LoaderCall::Load, err),
    };
    // SAFETY: forwarded caller contract.
    unsafe { finish(result, error_code) }
}

/// [`qrvmc_load_and_create`] over an explicit backend.
///
/// # Safety
///
/// As for [`load_via`]. The returned instance is owned by the caller.
pub unsafe fn load_and_create_via<L: DynamicLibrary>(
    library: L,
    filename: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> *mut QrvmcVm {
    last_error::reset();
    // SAFETY: forwarded caller contract.
    let result = match unsafe { path_arg(filename) } {
        Ok(path) => Loader::new(library).load_and_create(path),
        Err(err) => rejected(LoaderCall::LoadAndCreate, err),
    };
    // SAFETY: forwarded caller contract.
    unsafe { finish(result, error_code) }.map_or(std::ptr::null_mut(), Vm::into_raw)
}

/// [`qrvmc_load_and_configure`] over an explicit backend.
///
/// # Safety
///
/// `config` must be null or NUL-terminated; `error_code` null or writable.
/// The returned instance is owned by the caller.
pub unsafe fn load_and_configure_via<L: DynamicLibrary>(
    library: L,
    config: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> *mut QrvmcVm {
    last_error::reset();
    // SAFETY: forwarded caller contract.
    let result = match unsafe { config_arg(config) } {
        Ok(config) => Loader::new(library).load_and_configure(config),
        Err(err) => rejected(LoaderCall::LoadAndConfigure, err),
    };
    // SAFETY: forwarded caller contract.
    unsafe { finish(result, error_code) }.map_or(std::ptr::null_mut(), Vm::into_raw)
}

// ---------------------------------------------------------------------------
// Exported symbols
// ---------------------------------------------------------------------------

/// Opens a VM library and returns its create function, or null.
///
/// # Safety
///
/// `filename` must be null or NUL-terminated; `error_code` null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_load(
    filename: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> Option<CreateFn> {
    unsafe { load_via(SystemLibrary, filename, error_code) }
}

/// Opens a VM library and creates an ABI-compatible instance, or returns null.
///
/// # Safety
///
/// `filename` must be null or NUL-terminated; `error_code` null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_load_and_create(
    filename: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> *mut QrvmcVm {
    unsafe { load_and_create_via(SystemLibrary, filename, error_code) }
}

/// Loads the library named by `config` and applies its options.
///
/// # Safety
///
/// `config` must be null or NUL-terminated; `error_code` null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_load_and_configure(
    config: *const c_char,
    error_code: *mut LoaderErrorCode,
) -> *mut QrvmcVm {
    unsafe { load_and_configure_via(SystemLibrary, config, error_code) }
}

/// Returns the message of the last failed loader call and clears it.
///
/// A second call without an intervening failure returns null. The pointer
/// stays valid until the next loader call.
///
/// # Safety
///
/// The returned string must not be written through.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_last_error_msg() -> *const c_char {
    last_error::take_ptr()
}
