//! Instance helper ABI: thin accessors over a [`QrvmcVm`] descriptor.
//!
//! All helpers accept null and treat it as "no instance".

use std::ffi::{c_char, c_int};
use std::mem::ManuallyDrop;

use qrvmc_core::Capabilities;
use qrvmc_core::abi::SET_OPTION_INVALID_NAME;

use crate::vm::{QrvmcVm, Vm};

/// Views a caller-owned instance without taking ownership.
unsafe fn borrowed(vm: *mut QrvmcVm) -> Option<ManuallyDrop<Vm>> {
    // SAFETY: caller passes null or a live instance; ManuallyDrop keeps
    // ownership with the caller.
    unsafe { Vm::from_raw(vm) }.map(ManuallyDrop::new)
}

/// Destroys an instance through its own `destroy` entry point.
///
/// # Safety
///
/// `vm` must be null or a live instance owned by the caller; it is invalid
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_destroy(vm: *mut QrvmcVm) {
    // SAFETY: ownership moves in and is released by Drop.
    drop(unsafe { Vm::from_raw(vm) });
}

/// # Safety
///
/// `vm` must be null or a live instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_is_abi_compatible(vm: *mut QrvmcVm) -> bool {
    unsafe { borrowed(vm) }.is_some_and(|vm| vm.is_abi_compatible())
}

/// The instance's name string, or null.
///
/// # Safety
///
/// `vm` must be null or a live instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_vm_name(vm: *mut QrvmcVm) -> *const c_char {
    if vm.is_null() {
        return std::ptr::null();
    }
    // SAFETY: non-null live instance.
    unsafe { (*vm).name }
}

/// The instance's version string, or null.
///
/// # Safety
///
/// `vm` must be null or a live instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_vm_version(vm: *mut QrvmcVm) -> *const c_char {
    if vm.is_null() {
        return std::ptr::null();
    }
    // SAFETY: non-null live instance.
    unsafe { (*vm).version }
}

/// Whether every bit of `capability` is reported by the instance.
///
/// # Safety
///
/// `vm` must be null or a live, ABI-compatible instance.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_vm_has_capability(vm: *mut QrvmcVm, capability: u32) -> bool {
    unsafe { borrowed(vm) }
        .is_some_and(|vm| vm.has_capability(Capabilities::from_bits(capability)))
}

/// Applies one option and returns the raw set-option result code.
///
/// Instances without an option entry point reject every name.
///
/// # Safety
///
/// `vm` must be null or a live, ABI-compatible instance; `name` and `value`
/// NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qrvmc_set_option(
    vm: *mut QrvmcVm,
    name: *const c_char,
    value: *const c_char,
) -> c_int {
    if vm.is_null() {
        return SET_OPTION_INVALID_NAME;
    }
    // SAFETY: non-null live instance.
    match unsafe { (*vm).set_option } {
        // SAFETY: entry point supplied by the instance for itself.
        Some(set_option) => unsafe { set_option(vm, name, value) },
        None => SET_OPTION_INVALID_NAME,
    }
}
