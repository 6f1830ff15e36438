//! Dynamic library capability.
//!
//! The loader never calls the platform directly. It goes through
//! [`DynamicLibrary`], implemented by [`SystemLibrary`] (`dlopen` on Unix,
//! `LoadLibrary` on Windows) and by [`FakeLibrary`] for tests.

use std::ffi::{CStr, c_void};

use crate::vm::CreateFn;

mod fake;
mod system;

pub use fake::FakeLibrary;
pub use system::SystemLibrary;

/// Opaque token for an open library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibraryHandle(pub *mut c_void);

/// Open, resolve, close, and report platform diagnostics.
///
/// There is no partial-open state: `open` either returns a handle or nothing.
/// Callers track handle lifecycle; closing the same handle twice is undefined.
pub trait DynamicLibrary {
    fn open(&self, path: &CStr) -> Option<LibraryHandle>;

    fn close(&self, handle: LibraryHandle);

    /// Looks up an exported create function.
    fn create_fn(&self, handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn>;

    /// The diagnostic for the last failed call, returned at most once.
    fn last_os_error(&self) -> Option<String>;
}

impl<L: DynamicLibrary + ?Sized> DynamicLibrary for &L {
    fn open(&self, path: &CStr) -> Option<LibraryHandle> {
        (**self).open(path)
    }

    fn close(&self, handle: LibraryHandle) {
        (**self).close(handle);
    }

    fn create_fn(&self, handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn> {
        (**self).create_fn(handle, symbol)
    }

    fn last_os_error(&self) -> Option<String> {
        (**self).last_os_error()
    }
}
