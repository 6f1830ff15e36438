#![no_main]
use libfuzzer_sys::fuzz_target;
use qrvmc_abi::last_error;
use qrvmc_core::{LAST_ERROR_CAPACITY, LoaderError, LoaderErrorCode};

fuzz_target!(|data: &[u8]| {
    let message = String::from_utf8_lossy(data);
    last_error::reset();
    last_error::record(&LoaderError::new(LoaderErrorCode::UnspecifiedError, message.as_ref()));

    let Some(stored) = last_error::take() else {
        panic!("recorded message must be readable once");
    };
    assert!(stored.len() <= LAST_ERROR_CAPACITY);
    assert!(message.starts_with(&stored));
    assert!(last_error::take().is_none());
});
