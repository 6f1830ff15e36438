//! Runtime loader settings.
//!
//! The symbol binding mode used when opening VM libraries is set via the
//! `QRVMC_LOADER_BINDING` environment variable:
//! - `lazy` (default): resolve symbols on first use (`RTLD_LAZY`).
//! - `now`: resolve every symbol at open time (`RTLD_NOW`), so a library with
//!   unresolved imports fails to open instead of failing later.
//!
//! Unrecognized values fall back to `lazy`.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable holding the binding mode.
pub const BINDING_ENV: &str = "QRVMC_LOADER_BINDING";

/// How a library's symbols are bound when it is opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingMode {
    #[default]
    Lazy,
    Now,
}

impl BindingMode {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "now" | "eager" | "immediate" => Self::Now,
            _ => Self::Lazy,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lazy => "lazy",
            Self::Now => "now",
        }
    }
}

// 0=unresolved, 1=Lazy, 2=Now.
static CACHED_BINDING: AtomicU8 = AtomicU8::new(0);

const BINDING_UNRESOLVED: u8 = 0;
const BINDING_LAZY: u8 = 1;
const BINDING_NOW: u8 = 2;

fn mode_to_u8(mode: BindingMode) -> u8 {
    match mode {
        BindingMode::Lazy => BINDING_LAZY,
        BindingMode::Now => BINDING_NOW,
    }
}

fn u8_to_mode(v: u8) -> BindingMode {
    match v {
        BINDING_NOW => BindingMode::Now,
        _ => BindingMode::Lazy,
    }
}

/// Get the configured binding mode (reads the env var on first call, caches thereafter).
#[must_use]
pub fn binding_mode() -> BindingMode {
    let cached = CACHED_BINDING.load(Ordering::Acquire);
    if cached != BINDING_UNRESOLVED {
        return u8_to_mode(cached);
    }

    let mode = std::env::var(BINDING_ENV)
        .map(|v| BindingMode::from_str_loose(&v))
        .unwrap_or_default();
    // Concurrent first calls read the same environment and store the same value.
    CACHED_BINDING.store(mode_to_u8(mode), Ordering::Release);
    mode
}

/// Overrides the cached binding mode. Intended for tests and benchmarks.
pub fn set_binding_mode(mode: BindingMode) {
    CACHED_BINDING.store(mode_to_u8(mode), Ordering::Release);
}
