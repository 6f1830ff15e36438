//! Machine-readable reports produced by the harness subcommands.

use serde::Serialize;

use qrvmc_abi::{DynamicLibrary, Loader};
use qrvmc_core::{
    DEFAULT_CREATE_FN, LoaderError, derive_create_symbol, library_base_name, parse_configuration,
    validate_path,
};

/// What `load` learned about a configured VM.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VmReport {
    pub path: String,
    pub name: String,
    pub version: String,
    pub abi_version: i32,
    pub capabilities: Vec<&'static str>,
    pub options_applied: usize,
}

/// Symbols the loader would look up for a path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SymbolReport {
    pub path: String,
    pub base_name: String,
    pub symbol: String,
    pub fallback: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OptionReport {
    pub name: String,
    pub value: String,
}

/// A tokenized configuration string.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigReport {
    pub path: String,
    pub options: Vec<OptionReport>,
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Loads and configures the VM named by `config`, reports on it, and destroys it.
pub fn inspect_vm<L: DynamicLibrary>(
    loader: &Loader<L>,
    config: &str,
) -> Result<VmReport, LoaderError> {
    let parsed = parse_configuration(config.as_bytes())?;
    let vm = loader.load_and_configure(config)?;
    Ok(VmReport {
        path: text(parsed.path),
        name: vm.name(),
        version: vm.version(),
        abi_version: vm.abi_version(),
        capabilities: vm.capabilities().names(),
        options_applied: parsed.options.len(),
    })
}

pub fn symbol_report(path: &str) -> Result<SymbolReport, LoaderError> {
    validate_path(path.as_bytes())?;
    Ok(SymbolReport {
        path: path.to_string(),
        base_name: text(&library_base_name(path.as_bytes())),
        symbol: text(&derive_create_symbol(path.as_bytes())),
        fallback: DEFAULT_CREATE_FN,
    })
}

pub fn config_report(config: &str) -> Result<ConfigReport, LoaderError> {
    let parsed = parse_configuration(config.as_bytes())?;
    Ok(ConfigReport {
        path: text(parsed.path),
        options: parsed
            .options
            .iter()
            .map(|option| OptionReport {
                name: text(option.name),
                value: text(option.value),
            })
            .collect(),
    })
}
