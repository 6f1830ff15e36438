#![no_main]
use libfuzzer_sys::fuzz_target;
use qrvmc_core::{MAX_CONFIG_LENGTH, parse_configuration};

fuzz_target!(|config: &[u8]| {
    match parse_configuration(config) {
        Ok(parsed) => {
            assert!(config.len() < MAX_CONFIG_LENGTH);
            assert!(!config.contains(&0));
            assert!(config.starts_with(parsed.path));
            assert!(!parsed.path.contains(&b','));
            for option in &parsed.options {
                assert!(!option.name.iter().any(|b| matches!(b, b',' | b'=')));
                assert!(!option.value.contains(&b','));
            }
        }
        Err(_) => assert!(config.len() >= MAX_CONFIG_LENGTH || config.contains(&0)),
    }
});
