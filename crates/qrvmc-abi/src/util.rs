//! C argument helpers shared by the entry points.

use std::ffi::c_char;

/// Length of the C string at `ptr`, reading at most `bound` bytes.
///
/// Returns `None` when no terminator lies within the bound.
///
/// # Safety
///
/// `ptr` must be readable up to its terminator or `bound` bytes, whichever
/// comes first.
pub unsafe fn c_strnlen(ptr: *const c_char, bound: usize) -> Option<usize> {
    // SAFETY: every byte before the terminator or the bound is readable.
    (0..bound).find(|&i| unsafe { *ptr.add(i) } == 0)
}

/// Why a C string argument was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CArgError {
    Null,
    /// No terminator within the first `bound` bytes.
    Unterminated,
}

/// Borrow a NUL-terminated argument as raw bytes, terminator excluded.
///
/// At most `bound` bytes are read, so an argument of `bound` or more bytes is
/// refused without walking the rest of it.
///
/// # Safety
///
/// `ptr` must be null or readable up to its terminator or `bound` bytes, and
/// the bytes must outlive `'a`.
pub unsafe fn c_bytes_arg<'a>(ptr: *const c_char, bound: usize) -> Result<&'a [u8], CArgError> {
    if ptr.is_null() {
        return Err(CArgError::Null);
    }
    // SAFETY: forwarded caller contract.
    let len = unsafe { c_strnlen(ptr, bound) }.ok_or(CArgError::Unterminated)?;
    // SAFETY: `len` bytes were just read successfully.
    Ok(unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) })
}
