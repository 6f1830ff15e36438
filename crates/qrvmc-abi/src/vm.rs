//! The VM instance descriptor and its owning handle.
//!
//! A VM library's create function returns a pointer to a [`QrvmcVm`]. The
//! layout is fixed by the ABI; only [`QrvmcVm::abi_version`] may be read
//! before the version has been checked.

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr::NonNull;

use qrvmc_core::{Capabilities, OptionTarget, SetOptionStatus};

/// Zero-argument entry point exported by every VM library.
pub type CreateFn = unsafe extern "C" fn() -> *mut QrvmcVm;

/// Releases the instance and every resource it owns.
pub type DestroyFn = unsafe extern "C" fn(vm: *mut QrvmcVm);

/// Execution entry point. Its signature belongs to the host interface and is
/// opaque to the loader.
pub type ExecuteFn = unsafe extern "C" fn();

/// Returns the capability bit set of the instance.
pub type GetCapabilitiesFn = unsafe extern "C" fn(vm: *mut QrvmcVm) -> u32;

/// Applies one option. Returns a raw set-option result code; values outside
/// the known set are possible and must be tolerated.
pub type SetOptionFn =
    unsafe extern "C" fn(vm: *mut QrvmcVm, name: *const c_char, value: *const c_char) -> c_int;

/// Instance descriptor shared with VM implementations.
#[repr(C)]
#[derive(Debug)]
pub struct QrvmcVm {
    /// Must equal [`qrvmc_core::ABI_VERSION`] for any other field to be trusted.
    pub abi_version: c_int,
    pub name: *const c_char,
    pub version: *const c_char,
    pub destroy: Option<DestroyFn>,
    pub execute: Option<ExecuteFn>,
    pub get_capabilities: Option<GetCapabilitiesFn>,
    pub set_option: Option<SetOptionFn>,
}

/// Reads an optional C string field.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn field_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Exclusive owner of a created VM instance.
///
/// Dropping the handle invokes the instance's own `destroy` exactly once.
/// Use [`Vm::into_raw`] to hand ownership across the C boundary.
#[derive(Debug)]
pub struct Vm {
    raw: NonNull<QrvmcVm>,
}

impl Vm {
    /// Takes ownership of a raw instance. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live instance returned by a create function,
    /// not owned by anyone else and not yet destroyed.
    pub unsafe fn from_raw(raw: *mut QrvmcVm) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    /// Releases ownership without destroying the instance.
    #[must_use]
    pub fn into_raw(self) -> *mut QrvmcVm {
        let raw = self.raw.as_ptr();
        std::mem::forget(self);
        raw
    }

    #[must_use]
    pub fn as_ptr(&self) -> *mut QrvmcVm {
        self.raw.as_ptr()
    }

    fn descriptor(&self) -> &QrvmcVm {
        // SAFETY: ownership invariant of `Vm`; the instance lives until drop.
        unsafe { self.raw.as_ref() }
    }

    #[must_use]
    pub fn abi_version(&self) -> i32 {
        self.descriptor().abi_version
    }

    #[must_use]
    pub fn is_abi_compatible(&self) -> bool {
        self.abi_version() == qrvmc_core::ABI_VERSION
    }

    #[must_use]
    pub fn name(&self) -> String {
        // SAFETY: descriptor strings are NUL-terminated or null.
        unsafe { field_str(self.descriptor().name) }
    }

    #[must_use]
    pub fn version(&self) -> String {
        // SAFETY: descriptor strings are NUL-terminated or null.
        unsafe { field_str(self.descriptor().version) }
    }

    /// Capabilities reported by the instance; empty when it cannot report any.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        match self.descriptor().get_capabilities {
            // SAFETY: entry point supplied by the instance for itself.
            Some(get) => Capabilities::from_bits(unsafe { get(self.raw.as_ptr()) }),
            None => Capabilities::default(),
        }
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }
}

impl OptionTarget for Vm {
    fn display_name(&self) -> String {
        self.name()
    }

    fn supports_options(&self) -> bool {
        self.descriptor().set_option.is_some()
    }

    /// Passes `name` and `value` to the instance byte for byte. A NUL byte
    /// cannot cross the C boundary and is refused as an invalid name or value
    /// without calling the instance.
    fn set_option(&mut self, name: &[u8], value: &[u8]) -> SetOptionStatus {
        let Some(set_option) = self.descriptor().set_option else {
            return SetOptionStatus::InvalidName;
        };
        let Ok(c_name) = CString::new(name) else {
            return SetOptionStatus::InvalidName;
        };
        let Ok(c_value) = CString::new(value) else {
            return SetOptionStatus::InvalidValue;
        };
        // SAFETY: both strings outlive the call; the entry point belongs to this instance.
        let raw = unsafe { set_option(self.raw.as_ptr(), c_name.as_ptr(), c_value.as_ptr()) };
        SetOptionStatus::from_raw(raw)
    }
}

impl Drop for Vm {
    fn drop(&mut self) {
        if let Some(destroy) = self.descriptor().destroy {
            // SAFETY: last use of the instance; `Vm` is never dropped twice.
            unsafe { destroy(self.raw.as_ptr()) };
        }
    }
}
