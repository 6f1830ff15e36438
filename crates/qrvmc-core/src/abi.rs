//! ABI constants shared by hosts and VM implementations.

/// The ABI version every loaded instance must report.
///
/// Bumped whenever the instance descriptor layout or any calling convention
/// changes; there is no field-level negotiation.
pub const ABI_VERSION: i32 = 10;

/// Raw `set_option` result codes.
pub const SET_OPTION_SUCCESS: i32 = 0;
pub const SET_OPTION_INVALID_NAME: i32 = 1;
pub const SET_OPTION_INVALID_VALUE: i32 = 2;

/// Interpreted result of an instance's option-setting entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOptionStatus {
    Success,
    InvalidName,
    InvalidValue,
    /// Any code outside the known set. Kept verbatim for diagnostics.
    Unknown(i32),
}

impl SetOptionStatus {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            SET_OPTION_SUCCESS => Self::Success,
            SET_OPTION_INVALID_NAME => Self::InvalidName,
            SET_OPTION_INVALID_VALUE => Self::InvalidValue,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Success => SET_OPTION_SUCCESS,
            Self::InvalidName => SET_OPTION_INVALID_NAME,
            Self::InvalidValue => SET_OPTION_INVALID_VALUE,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Capability bit set reported by `get_capabilities`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const QRVM1: Self = Self(1 << 0);
    pub const ZWASM: Self = Self(1 << 1);
    pub const PRECOMPILES: Self = Self(1 << 2);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Names of the known capability bits that are set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        [
            (Self::QRVM1, "qrvm1"),
            (Self::ZWASM, "zwasm"),
            (Self::PRECOMPILES, "precompiles"),
        ]
        .into_iter()
        .filter(|(cap, _)| self.contains(*cap))
        .map(|(_, name)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_option_status_round_trips_known_codes() {
        assert_eq!(SetOptionStatus::from_raw(0), SetOptionStatus::Success);
        assert_eq!(SetOptionStatus::from_raw(1), SetOptionStatus::InvalidName);
        assert_eq!(SetOptionStatus::from_raw(2), SetOptionStatus::InvalidValue);
        assert_eq!(SetOptionStatus::from_raw(-42), SetOptionStatus::Unknown(-42));
        assert_eq!(SetOptionStatus::Unknown(-42).as_raw(), -42);
    }

    #[test]
    fn capability_names() {
        let caps = Capabilities::QRVM1.union(Capabilities::PRECOMPILES);
        assert!(caps.contains(Capabilities::QRVM1));
        assert!(!caps.contains(Capabilities::ZWASM));
        assert_eq!(caps.names(), vec!["qrvm1", "precompiles"]);
        assert!(Capabilities::default().names().is_empty());
    }
}
