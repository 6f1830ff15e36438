//! Configuration strings and sequential option application.
//!
//! A configuration string has the form `<path>[,<name>[=<value>]]*`. Tokens are
//! separated by commas, a token splits into name and value on its first `=`,
//! and there is no escaping. A single trailing comma is ignored; every other
//! empty token is an option with an empty name. The string is handled as
//! bytes; names and values reach the VM exactly as written.

use crate::abi::SetOptionStatus;
use crate::error::LoaderError;

/// Maximum configuration length in bytes, including the C terminator.
pub const MAX_CONFIG_LENGTH: usize = 4096;

/// One `name[=value]` token. A missing `=` means an empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption<'a> {
    pub name: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> ConfigOption<'a> {
    #[must_use]
    pub fn parse(token: &'a [u8]) -> Self {
        match token.iter().position(|&b| b == b'=') {
            Some(pos) => Self {
                name: &token[..pos],
                value: &token[pos + 1..],
            },
            None => Self {
                name: token,
                value: &[],
            },
        }
    }
}

/// A tokenized configuration string, borrowing from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration<'a> {
    pub path: &'a [u8],
    pub options: Vec<ConfigOption<'a>>,
}

/// Splits `config` into the library path and its options, in textual order.
///
/// Fails with INVALID_ARGUMENT when `config` would not fit in
/// [`MAX_CONFIG_LENGTH`] bytes with its terminator, or contains a NUL byte
/// (which no C string can carry). Nothing is opened here.
pub fn parse_configuration(config: &[u8]) -> Result<Configuration<'_>, LoaderError> {
    if config.len() >= MAX_CONFIG_LENGTH {
        return Err(LoaderError::configuration_too_long(MAX_CONFIG_LENGTH));
    }
    if config.contains(&0) {
        return Err(LoaderError::configuration_interior_nul());
    }

    let (path, rest) = match config.iter().position(|&b| b == b',') {
        Some(pos) => (&config[..pos], &config[pos + 1..]),
        None => (config, &[][..]),
    };
    let options = if rest.is_empty() {
        Vec::new()
    } else {
        rest.strip_suffix(b",")
            .unwrap_or(rest)
            .split(|&b| b == b',')
            .map(ConfigOption::parse)
            .collect()
    };

    Ok(Configuration { path, options })
}

/// Something options can be applied to: in practice a freshly created VM.
pub trait OptionTarget {
    /// Name used in diagnostics.
    fn display_name(&self) -> String;

    /// Whether the target has an option-setting entry point at all.
    fn supports_options(&self) -> bool;

    fn set_option(&mut self, name: &[u8], value: &[u8]) -> SetOptionStatus;
}

/// Progress of [`apply_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyState {
    /// No option has been applied yet.
    Pending,
    /// This many options were accepted, in order.
    Applied(usize),
    /// Application stopped; `applied` options were accepted before `error`.
    Failed { applied: usize, error: LoaderError },
}

impl ApplyState {
    #[must_use]
    pub fn applied(&self) -> usize {
        match self {
            Self::Pending => 0,
            Self::Applied(n) | Self::Failed { applied: n, .. } => *n,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Number of accepted options, or the error that stopped application.
    pub fn into_result(self) -> Result<usize, LoaderError> {
        match self {
            Self::Pending => Ok(0),
            Self::Applied(n) => Ok(n),
            Self::Failed { error, .. } => Err(error),
        }
    }

    fn accept(self) -> Self {
        Self::Applied(self.applied() + 1)
    }

    fn fail(self, error: LoaderError) -> Self {
        Self::Failed {
            applied: self.applied(),
            error,
        }
    }
}

/// Applies `options` to `target` strictly left to right.
///
/// Repeated names are passed through as-is. The first rejection stops
/// application; the caller owns rollback of the target.
pub fn apply_options<T>(target: &mut T, path: &[u8], options: &[ConfigOption<'_>]) -> ApplyState
where
    T: OptionTarget + ?Sized,
{
    let mut state = ApplyState::Pending;
    if options.is_empty() {
        return state;
    }
    if !target.supports_options() {
        return state.fail(LoaderError::options_unsupported(
            &target.display_name(),
            path,
        ));
    }

    for option in options {
        state = match target.set_option(option.name, option.value) {
            SetOptionStatus::Success => state.accept(),
            SetOptionStatus::InvalidName => state.fail(LoaderError::unknown_option(
                &target.display_name(),
                path,
                option.name,
            )),
            SetOptionStatus::InvalidValue => state.fail(LoaderError::unsupported_value(
                &target.display_name(),
                path,
                option.name,
                option.value,
            )),
            SetOptionStatus::Unknown(_) => state.fail(LoaderError::option_unknown_error(
                &target.display_name(),
                path,
                option.name,
                option.value,
            )),
        };
        if state.is_failed() {
            break;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderErrorCode;
    use std::collections::HashMap;

    fn opt<'a>(name: &'a str, value: &'a str) -> ConfigOption<'a> {
        ConfigOption {
            name: name.as_bytes(),
            value: value.as_bytes(),
        }
    }

    fn options(config: &str) -> Vec<ConfigOption<'_>> {
        parse_configuration(config.as_bytes()).unwrap().options
    }

    #[test]
    fn path_only() {
        let cfg = parse_configuration(b"path").unwrap();
        assert_eq!(cfg.path, b"path");
        assert!(cfg.options.is_empty());

        let cfg = parse_configuration(b"path,").unwrap();
        assert_eq!(cfg.path, b"path");
        assert!(cfg.options.is_empty());
    }

    #[test]
    fn options_in_order_with_repeats() {
        assert_eq!(
            options("path,a=_a,b=_b1,c=_c,b=_b2"),
            vec![
                opt("a", "_a"),
                opt("b", "_b1"),
                opt("c", "_c"),
                opt("b", "_b2")
            ]
        );
    }

    #[test]
    fn value_splits_on_first_equals() {
        assert_eq!(options("vm.so,trace=a=b"), vec![opt("trace", "a=b")]);
    }

    #[test]
    fn empty_values_and_flags() {
        assert_eq!(
            options("path,flag,e=,flag=,e"),
            vec![opt("flag", ""), opt("e", ""), opt("flag", ""), opt("e", "")]
        );
    }

    #[test]
    fn degenerate_names_are_kept() {
        assert_eq!(
            options("path,,,=,,=xxx"),
            vec![opt("", ""), opt("", ""), opt("", ""), opt("", ""), opt("", "xxx")]
        );
    }

    #[test]
    fn only_one_trailing_comma_is_dropped() {
        assert_eq!(options("path,x=x,"), vec![opt("x", "x")]);
        assert_eq!(options("path,,"), vec![opt("", "")]);
        assert_eq!(options("path,a,,"), vec![opt("a", ""), opt("", "")]);
    }

    #[test]
    fn empty_path_is_passed_through() {
        let cfg = parse_configuration(b",a=1").unwrap();
        assert!(cfg.path.is_empty());
        assert_eq!(cfg.options, vec![opt("a", "1")]);
    }

    #[test]
    fn non_utf8_bytes_are_kept_verbatim() {
        let cfg = parse_configuration(b"/opt/\xe9/vm.so,charset=\xe9,\xff=1").unwrap();
        assert_eq!(cfg.path, b"/opt/\xe9/vm.so");
        assert_eq!(
            cfg.options,
            vec![
                ConfigOption {
                    name: b"charset",
                    value: b"\xe9"
                },
                ConfigOption {
                    name: b"\xff",
                    value: b"1"
                },
            ]
        );
    }

    #[test]
    fn nul_byte_is_an_argument_error() {
        let configs: [&[u8]; 3] = [b"path,a\0b=1", b"path,a=1\0", b"pa\0th"];
        for config in configs {
            let err = parse_configuration(config).unwrap_err();
            assert_eq!(err.code(), LoaderErrorCode::InvalidArgument);
            assert_eq!(
                err.message(),
                "invalid argument: configuration contains a nul byte"
            );
        }
    }

    #[test]
    fn too_long_configuration() {
        let config = format!("path,{}", "x".repeat(10_000));
        let err = parse_configuration(config.as_bytes()).unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidArgument);
        assert_eq!(
            err.message(),
            "invalid argument: configuration is too long (maximum allowed length is 4096)"
        );

        assert!(parse_configuration("p".repeat(MAX_CONFIG_LENGTH - 1).as_bytes()).is_ok());
        assert!(parse_configuration("p".repeat(MAX_CONFIG_LENGTH).as_bytes()).is_err());
    }

    struct Recorder {
        with_entry_point: bool,
        supported: HashMap<&'static str, Vec<&'static str>>,
        recorded: Vec<(String, String)>,
    }

    impl Recorder {
        fn new(supported: Vec<(&'static str, Vec<&'static str>)>) -> Self {
            Self {
                with_entry_point: true,
                supported: supported.into_iter().collect(),
                recorded: Vec::new(),
            }
        }
    }

    impl OptionTarget for Recorder {
        fn display_name(&self) -> String {
            "recorder".to_string()
        }

        fn supports_options(&self) -> bool {
            self.with_entry_point
        }

        fn set_option(&mut self, name: &[u8], value: &[u8]) -> SetOptionStatus {
            let name = String::from_utf8_lossy(name).into_owned();
            let value = String::from_utf8_lossy(value).into_owned();
            let status = match self.supported.get(name.as_str()) {
                None => SetOptionStatus::InvalidName,
                Some(values) if values.iter().any(|v| *v == value) => SetOptionStatus::Success,
                Some(_) if name == "raise_unknown" => SetOptionStatus::Unknown(-42),
                Some(_) => SetOptionStatus::InvalidValue,
            };
            self.recorded.push((name, value));
            status
        }
    }

    #[test]
    fn all_accepted() {
        let mut target = Recorder::new(vec![("a", vec!["1"]), ("b", vec!["2"])]);
        let state = apply_options(&mut target, b"path", &[opt("a", "1"), opt("b", "2")]);
        assert_eq!(state, ApplyState::Applied(2));
        assert_eq!(
            target.recorded,
            vec![("a".into(), "1".into()), ("b".into(), "2".into())]
        );
    }

    #[test]
    fn no_options_stays_pending() {
        let mut target = Recorder::new(vec![]);
        target.with_entry_point = false;
        let state = apply_options(&mut target, b"path", &[]);
        assert_eq!(state, ApplyState::Pending);
        assert_eq!(state.into_result(), Ok(0));
    }

    #[test]
    fn missing_entry_point_fails_before_any_call() {
        let mut target = Recorder::new(vec![("", vec![""])]);
        target.with_entry_point = false;
        let state = apply_options(&mut target, b"path", &[opt("a", "0")]);
        assert!(target.recorded.is_empty());
        let err = state.into_result().unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidOptionName);
        assert_eq!(err.message(), "recorder (path) does not support any options");
    }

    #[test]
    fn stops_at_first_unknown_name() {
        let mut target = Recorder::new(vec![("a", vec!["_a"]), ("c", vec!["_c"])]);
        let options = [opt("a", "_a"), opt("x", "_b"), opt("c", "_c")];
        let state = apply_options(&mut target, b"path", &options);
        assert_eq!(state.applied(), 1);
        assert_eq!(target.recorded.len(), 2);
        let err = state.into_result().unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidOptionName);
        assert_eq!(err.message(), "recorder (path): unknown option 'x'");
    }

    #[test]
    fn stops_at_first_bad_value() {
        let mut target = Recorder::new(vec![("a", vec!["_a"]), ("b", vec!["_b"]), ("c", vec!["_c"])]);
        let options = [opt("a", "_a"), opt("b", "_b"), opt("c", "_b")];
        let state = apply_options(&mut target, b"path", &options);
        assert_eq!(state.applied(), 2);
        let err = state.into_result().unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidOptionValue);
        assert_eq!(
            err.message(),
            "recorder (path): unsupported value '_b' for option 'c'"
        );
    }

    #[test]
    fn unrecognized_result_code() {
        let mut target = Recorder::new(vec![("raise_unknown", vec![""])]);
        let state = apply_options(&mut target, b"path", &[opt("raise_unknown", "1")]);
        let err = state.into_result().unwrap_err();
        assert_eq!(err.code(), LoaderErrorCode::InvalidOptionValue);
        assert_eq!(
            err.message(),
            "recorder (path): unknown error when setting value '1' for option 'raise_unknown'"
        );
    }
}
