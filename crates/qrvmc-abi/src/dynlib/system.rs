//! Platform dynamic loader.

use std::ffi::CStr;

use super::{DynamicLibrary, LibraryHandle};
use crate::vm::CreateFn;

/// The operating system's dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLibrary;

// ---------------------------------------------------------------------------
// Unix: dlopen / dlsym / dlclose / dlerror
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod imp {
    use std::ffi::{CStr, c_int};

    use qrvmc_core::BindingMode;

    use super::{CreateFn, LibraryHandle};

    fn open_flags() -> c_int {
        match qrvmc_core::binding_mode() {
            BindingMode::Lazy => libc::RTLD_LAZY,
            BindingMode::Now => libc::RTLD_NOW,
        }
    }

    pub(super) fn open(path: &CStr) -> Option<LibraryHandle> {
        // SAFETY: `path` is NUL-terminated; dlopen runs the library's initializers.
        let handle = unsafe { libc::dlopen(path.as_ptr(), open_flags()) };
        (!handle.is_null()).then_some(LibraryHandle(handle))
    }

    pub(super) fn close(handle: LibraryHandle) {
        // SAFETY: handle came from a successful dlopen and is closed once.
        unsafe { libc::dlclose(handle.0) };
    }

    pub(super) fn create_fn(handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn> {
        // SAFETY: live handle, NUL-terminated symbol name.
        let sym = unsafe { libc::dlsym(handle.0, symbol.as_ptr()) };
        if sym.is_null() {
            return None;
        }
        // SAFETY: by contract the exported symbol is a zero-argument create function.
        Some(unsafe { std::mem::transmute::<*mut libc::c_void, CreateFn>(sym) })
    }

    pub(super) fn last_os_error() -> Option<String> {
        // dlerror clears its own state, so this is consumed once.
        // SAFETY: dlerror returns null or a NUL-terminated string.
        let msg = unsafe { libc::dlerror() };
        if msg.is_null() {
            return None;
        }
        // SAFETY: non-null and NUL-terminated.
        Some(unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned())
    }
}

// ---------------------------------------------------------------------------
// Windows: LoadLibrary / GetProcAddress / FreeLibrary
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod imp {
    use std::ffi::CStr;

    use libloading::os::windows::Library;
    use parking_lot::Mutex;

    use super::{CreateFn, LibraryHandle};

    static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

    fn record(err: libloading::Error) {
        *LAST_ERROR.lock() = Some(err.to_string());
    }

    pub(super) fn open(path: &CStr) -> Option<LibraryHandle> {
        let path = path.to_str().ok()?;
        // SAFETY: loading runs DllMain of the target library.
        match unsafe { Library::new(path) } {
            Ok(lib) => Some(LibraryHandle(Box::into_raw(Box::new(lib)).cast())),
            Err(err) => {
                record(err);
                None
            }
        }
    }

    pub(super) fn close(handle: LibraryHandle) {
        // SAFETY: handle was produced by `open` from a boxed Library and is closed once.
        drop(unsafe { Box::from_raw(handle.0.cast::<Library>()) });
    }

    pub(super) fn create_fn(handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn> {
        // SAFETY: live boxed Library from `open`.
        let lib = unsafe { &*handle.0.cast::<Library>() };
        // SAFETY: by contract the exported symbol is a zero-argument create function.
        match unsafe { lib.get::<CreateFn>(symbol.to_bytes_with_nul()) } {
            Ok(sym) => Some(*sym),
            Err(err) => {
                record(err);
                None
            }
        }
    }

    pub(super) fn last_os_error() -> Option<String> {
        LAST_ERROR.lock().take()
    }
}

impl DynamicLibrary for SystemLibrary {
    fn open(&self, path: &CStr) -> Option<LibraryHandle> {
        imp::open(path)
    }

    fn close(&self, handle: LibraryHandle) {
        imp::close(handle);
    }

    fn create_fn(&self, handle: LibraryHandle, symbol: &CStr) -> Option<CreateFn> {
        imp::create_fn(handle, symbol)
    }

    fn last_os_error(&self) -> Option<String> {
        imp::last_os_error()
    }
}
