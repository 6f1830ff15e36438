//! Create-function symbol derivation.
//!
//! A VM library at `path/to/libfoo-bar.so.1` is expected to export
//! `qrvmc_create_foo_bar`. Libraries that do not follow the naming scheme may
//! export the generic [`DEFAULT_CREATE_FN`] instead.

use crate::error::LoaderError;

/// Maximum accepted library path length, in bytes.
pub const MAX_PATH_LENGTH: usize = 4096;

/// Prefix of every derived create-function name.
pub const CREATE_FN_PREFIX: &str = "qrvmc_create_";

/// Fallback create-function name tried when the derived one is absent.
pub const DEFAULT_CREATE_FN: &str = "qrvmc_create";

/// Conventional shared-library file prefix, stripped once.
const LIB_PREFIX: &[u8] = b"lib";

fn is_separator(byte: &u8) -> bool {
    matches!(byte, b'/' | b'\\')
}

/// Checks a library path before anything touches the OS.
///
/// Paths are bytes: any encoding the platform loader accepts is passed through.
pub fn validate_path(path: &[u8]) -> Result<(), LoaderError> {
    if path.is_empty() {
        return Err(LoaderError::empty_file_name());
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(LoaderError::file_name_too_long(path.len(), MAX_PATH_LENGTH));
    }
    if path.contains(&0) {
        return Err(LoaderError::file_name_interior_nul());
    }
    Ok(())
}

/// Returns the name part of `path` that identifies the VM.
///
/// Takes the bytes after the last separator (`/` or `\\`), strips a single
/// leading `lib`, cuts at the first `.` and turns every `-` into `_`. The
/// result may be empty.
#[must_use]
pub fn library_base_name(path: &[u8]) -> Vec<u8> {
    let file_name = match path.iter().rposition(is_separator) {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    let stem = file_name.strip_prefix(LIB_PREFIX).unwrap_or(file_name);
    let stem = match stem.iter().position(|&b| b == b'.') {
        Some(pos) => &stem[..pos],
        None => stem,
    };
    stem.iter()
        .map(|&b| if b == b'-' { b'_' } else { b })
        .collect()
}

/// Returns the create-function symbol expected in the library at `path`.
///
/// Callers validate the path first with [`validate_path`].
#[must_use]
pub fn derive_create_symbol(path: &[u8]) -> Vec<u8> {
    let base = library_base_name(path);
    let mut symbol = Vec::with_capacity(CREATE_FN_PREFIX.len() + base.len());
    symbol.extend_from_slice(CREATE_FN_PREFIX.as_bytes());
    symbol.extend_from_slice(&base);
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderErrorCode;

    fn symbol(path: &str) -> String {
        String::from_utf8(derive_create_symbol(path.as_bytes())).unwrap()
    }

    #[test]
    fn plain_and_prefixed_names() {
        for path in ["./aaa.qrvm", "aaa.qrvm", "unittests/libaaa.so", "aaa"] {
            assert_eq!(symbol(path), "qrvmc_create_aaa", "{path}");
        }
    }

    #[test]
    fn only_first_dot_counts() {
        for path in [
            "./aaa.qrvm.0.99",
            "aaa.tar.gz.so",
            "unittests/aaa.x.y.z.so",
            "unittests/aaa.1.lib",
            "unittests/aaa.1.0",
            "unittests/aaa.extextextextextextextextextextextextextextextextext",
        ] {
            assert_eq!(symbol(path), "qrvmc_create_aaa", "{path}");
        }
    }

    #[test]
    fn dashes_become_underscores() {
        assert_eq!(
            symbol("unittests/eee-bbb.dll"),
            "qrvmc_create_eee_bbb"
        );
        assert_eq!(
            symbol("unittests/double-prefix-aaa.qrvm"),
            "qrvmc_create_double_prefix_aaa"
        );
    }

    #[test]
    fn both_separators_recognized() {
        for path in [
            "./eee-bbb.qrvm",
            ".\\eee-bbb.qrvm",
            "./unittests/eee-bbb.dll",
            "./unittests\\eee-bbb.dll",
            ".\\unittests\\eee-bbb.dll",
            ".\\unittests/eee-bbb.dll",
            "unittests\\eee-bbb.dll",
        ] {
            assert_eq!(symbol(path), "qrvmc_create_eee_bbb", "{path}");
        }
    }

    #[test]
    fn lib_prefix_stripped_once() {
        assert_eq!(symbol("liblibaaa.so"), "qrvmc_create_libaaa");
        assert_eq!(symbol("lib/libaaa.so"), "qrvmc_create_aaa");
        // The prefix is only looked for in the file name.
        assert_eq!(symbol("libdir/aaa.so"), "qrvmc_create_aaa");
    }

    #[test]
    fn empty_base_yields_bare_prefix() {
        assert_eq!(symbol("lib.so"), CREATE_FN_PREFIX);
        assert_eq!(symbol("dir/"), CREATE_FN_PREFIX);
        assert_eq!(symbol(".hidden"), CREATE_FN_PREFIX);
        assert_eq!(symbol("lib_.so"), "qrvmc_create__");
    }

    #[test]
    fn near_miss_names() {
        assert_eq!(symbol("libaaa1.so"), "qrvmc_create_aaa1");
        assert_eq!(symbol("libeee3.x"), "qrvmc_create_eee3");
        assert_eq!(symbol("_"), "qrvmc_create__");
    }

    #[test]
    fn validate_rejects_empty_and_long() {
        let err = validate_path(b"").unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidArgument);
        assert_eq!(err.message(), "invalid argument: file name cannot be empty");

        let long = "a".repeat(5000);
        let err = validate_path(long.as_bytes()).unwrap_err();
        assert_eq!(
            err.message(),
            "invalid argument: file name is too long (5000, maximum allowed length is 4096)"
        );

        assert!(validate_path("a".repeat(MAX_PATH_LENGTH).as_bytes()).is_ok());
        assert!(validate_path(b"a\0b").is_err());
    }

    #[test]
    fn non_utf8_names_pass_through() {
        assert_eq!(
            derive_create_symbol(b"/opt/vms/lib\xe9t\xe9-vm.so"),
            b"qrvmc_create_\xe9t\xe9_vm"
        );
        assert!(validate_path(b"/opt/vms/\xff.so").is_ok());
    }
}
