//! In-memory stand-in for the platform loader.

use std::cell::{Cell, RefCell};
use std::ffi::CStr;

use super::{DynamicLibrary, LibraryHandle};
use crate::vm::CreateFn;

const MAGIC_HANDLE: usize = 0xE7AC;

/// A loader that knows exactly one library exporting exactly one symbol.
///
/// Opening any other path fails with the diagnostic `cannot load library`.
/// Open and close calls are counted so tests can check that no handle leaks.
#[derive(Debug, Default)]
pub struct FakeLibrary {
    path: Option<Vec<u8>>,
    symbol: Option<Vec<u8>>,
    create: Option<CreateFn>,
    last_error: RefCell<Option<String>>,
    opened: Cell<usize>,
    closed: Cell<usize>,
}

impl FakeLibrary {
    /// A library at `path` exporting `create` as `symbol`. Both compare as bytes.
    #[must_use]
    pub fn new(path: impl Into<Vec<u8>>, symbol: impl Into<Vec<u8>>, create: CreateFn) -> Self {
        Self {
            path: Some(path.into()),
            symbol: Some(symbol.into()),
            create: Some(create),
            ..Self::default()
        }
    }

    /// A loader where every open fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opened.get()
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closed.get()
    }

    fn handle() -> LibraryHandle {
        LibraryHandle(std::ptr::without_provenance_mut(MAGIC_HANDLE))
    }
}

impl DynamicLibrary for FakeLibrary {
    fn open(&self, path: &CStr) -> Option<LibraryHandle> {
        self.last_error.replace(None);
        if self.path.as_deref() == Some(path.to_bytes()) {
            self.opened.set(self.opened.get() + 1);
            return Some(Self::handle());
        }
        self.last_error.replace(Some("cannot load library".to_string()));
        None
    }

    fn close(&self, handle: LibraryHandle) {
        debug_assert_eq!(handle, Self::handle());
        self.closed.set(self.closed.get() + 1);
    }

    fn create_fn(&self, handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn> {
        if handle != Self::handle() {
            return None;
        }
        if self.symbol.as_deref() == Some(symbol.to_bytes()) {
            self.create
        } else {
            None
        }
    }

    fn last_os_error(&self) -> Option<String> {
        self.last_error.take()
    }
}
