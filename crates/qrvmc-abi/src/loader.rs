//! The loader proper.
//!
//! [`Loader`] turns a path or configuration string into a create function or
//! a ready [`Vm`]. It reports failures as [`LoaderError`] values and touches no
//! global diagnostic state; the legacy C entry points in
//! [`crate::loader_abi`] layer the last-error register on top.
//!
//! A library whose create function was resolved stays loaded for the rest of
//! the process: the instance's code, including its `destroy`, lives in it.

use std::ffi::CString;

use qrvmc_core::{
    ABI_VERSION, DEFAULT_CREATE_FN, LoaderError, LoaderErrorCode, apply_options,
    derive_create_symbol, parse_configuration, validate_path,
};

use crate::dynlib::{DynamicLibrary, SystemLibrary};
use crate::telemetry::{self, LoaderCall};
use crate::vm::{CreateFn, Vm};

/// Loads VM libraries through a [`DynamicLibrary`] backend.
#[derive(Debug, Default, Clone)]
pub struct Loader<L = SystemLibrary> {
    library: L,
}

impl Loader<SystemLibrary> {
    /// A loader backed by the platform's dynamic linker.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemLibrary)
    }
}

fn outcome<T>(result: &Result<T, LoaderError>) -> LoaderErrorCode {
    match result {
        Ok(_) => LoaderErrorCode::Success,
        Err(err) => err.code(),
    }
}

impl<L: DynamicLibrary> Loader<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    /// Opens the library at `path` and resolves its create function.
    ///
    /// `path` is taken as bytes and handed to the platform unchanged. Tries
    /// `qrvmc_create_<name>` derived from the path, then `qrvmc_create`. The
    /// handle is closed on every failure after a successful open.
    pub fn load(&self, path: impl AsRef<[u8]>) -> Result<CreateFn, LoaderError> {
        let result = self.resolve(path.as_ref());
        telemetry::observe(LoaderCall::Load, outcome(&result));
        result
    }

    /// [`Loader::load`], then create an instance and check its ABI version.
    pub fn load_and_create(&self, path: impl AsRef<[u8]>) -> Result<Vm, LoaderError> {
        let result = self.create(path.as_ref());
        telemetry::observe(LoaderCall::LoadAndCreate, outcome(&result));
        result
    }

    /// Loads the library named by the first token of `config` and applies the
    /// remaining `name[=value]` tokens in order.
    ///
    /// Any failure after creation destroys the instance before returning.
    pub fn load_and_configure(&self, config: impl AsRef<[u8]>) -> Result<Vm, LoaderError> {
        let result = self.configure(config.as_ref());
        telemetry::observe(LoaderCall::LoadAndConfigure, outcome(&result));
        result
    }

    fn resolve(&self, path: &[u8]) -> Result<CreateFn, LoaderError> {
        validate_path(path)?;
        let c_path = CString::new(path).map_err(|_| LoaderError::file_name_interior_nul())?;

        let handle = self
            .library
            .open(&c_path)
            .ok_or_else(|| LoaderError::cannot_open(path, self.library.last_os_error()))?;

        let derived = derive_create_symbol(path);
        let create_fn = [derived.as_slice(), DEFAULT_CREATE_FN.as_bytes()]
            .into_iter()
            .filter_map(|name| CString::new(name).ok())
            .find_map(|name| self.library.create_fn(handle, &name));

        match create_fn {
            Some(create_fn) => Ok(create_fn),
            None => {
                self.library.close(handle);
                Err(LoaderError::symbol_not_found(path))
            }
        }
    }

    fn create(&self, path: &[u8]) -> Result<Vm, LoaderError> {
        let create_fn = self.resolve(path)?;

        // SAFETY: create functions take no arguments and return an owned
        // instance or null.
        let raw = unsafe { create_fn() };
        // SAFETY: a fresh instance is owned by nobody else yet.
        let vm = unsafe { Vm::from_raw(raw) }.ok_or_else(|| LoaderError::creation_failed(path))?;

        if !vm.is_abi_compatible() {
            let observed = vm.abi_version();
            drop(vm);
            return Err(LoaderError::abi_mismatch(observed, path, ABI_VERSION));
        }
        Ok(vm)
    }

    fn configure(&self, config: &[u8]) -> Result<Vm, LoaderError> {
        let configuration = parse_configuration(config)?;
        let mut vm = self.create(configuration.path)?;
        // On failure `vm` goes out of scope here and is destroyed exactly once.
        apply_options(&mut vm, configuration.path, &configuration.options).into_result()?;
        Ok(vm)
    }
}
