#![no_main]
use libfuzzer_sys::fuzz_target;
use qrvmc_core::{CREATE_FN_PREFIX, derive_create_symbol, library_base_name, validate_path};

fuzz_target!(|path: &[u8]| {
    if validate_path(path).is_err() {
        return;
    }

    let base = library_base_name(path);
    assert!(!base.iter().any(|b| matches!(b, b'/' | b'\\' | b'.' | b'-')));
    let symbol = derive_create_symbol(path);
    assert_eq!(
        symbol.strip_prefix(CREATE_FN_PREFIX.as_bytes()),
        Some(base.as_slice())
    );
});
