//! Process-wide last-error register for the legacy C entry points.
//!
//! One slot, reset at the start of every top-level call and filled only when
//! that call fails. Reading it hands the message out once and marks the slot
//! empty. The bytes stay in place until the next failure overwrites them, so
//! a pointer returned by [`take_ptr`] is valid until the next loader call.

use std::ffi::c_char;

use parking_lot::Mutex;
use qrvmc_core::{BoundedMessage, LoaderError};

struct Register {
    message: BoundedMessage,
    pending: bool,
}

static LAST_ERROR: Mutex<Register> = Mutex::new(Register {
    message: BoundedMessage::new(),
    pending: false,
});

/// Forget any unread message.
pub fn reset() {
    LAST_ERROR.lock().pending = false;
}

/// Store `err`'s message, truncated to the register capacity.
pub fn record(err: &LoaderError) {
    let mut register = LAST_ERROR.lock();
    register.message.set(err.message());
    register.pending = true;
}

/// The unread message, if any, as an owned string.
pub fn take() -> Option<String> {
    let mut register = LAST_ERROR.lock();
    if !register.pending {
        return None;
    }
    register.pending = false;
    Some(register.message.as_str().to_owned())
}

/// The unread message as a NUL-terminated pointer into static storage, or null.
pub fn take_ptr() -> *const c_char {
    let mut register = LAST_ERROR.lock();
    if !register.pending {
        return std::ptr::null();
    }
    register.pending = false;
    register.message.as_bytes_with_nul().as_ptr().cast()
}
