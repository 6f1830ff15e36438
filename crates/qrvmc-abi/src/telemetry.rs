//! Process-wide loader counters.
//!
//! Every top-level loader call publishes one observation. Counters are plain
//! relaxed atomics; a snapshot is a consistent-enough view for tooling, not a
//! synchronization point.

use std::sync::atomic::{AtomicU64, Ordering};

use qrvmc_core::LoaderErrorCode;

/// Which top-level entry produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderCall {
    Load,
    LoadAndCreate,
    LoadAndConfigure,
}

impl LoaderCall {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::LoadAndCreate => "load_and_create",
            Self::LoadAndConfigure => "load_and_configure",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Load => 0,
            Self::LoadAndCreate => 1,
            Self::LoadAndConfigure => 2,
        }
    }
}

const CALLS: usize = 3;
const CODES: usize = LoaderErrorCode::ALL.len();

static CALL_COUNTS: [AtomicU64; CALLS] = [const { AtomicU64::new(0) }; CALLS];
static OUTCOME_COUNTS: [AtomicU64; CODES] = [const { AtomicU64::new(0) }; CODES];

fn code_index(code: LoaderErrorCode) -> usize {
    LoaderErrorCode::ALL
        .iter()
        .position(|c| *c == code)
        .unwrap_or(CODES - 1)
}

/// Record the outcome of one top-level call.
pub fn observe(call: LoaderCall, outcome: LoaderErrorCode) {
    CALL_COUNTS[call.index()].fetch_add(1, Ordering::Relaxed);
    OUTCOME_COUNTS[code_index(outcome)].fetch_add(1, Ordering::Relaxed);
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub loads: u64,
    pub creates: u64,
    pub configures: u64,
    /// Outcome counts in [`LoaderErrorCode::ALL`] order.
    pub outcomes: [u64; CODES],
}

impl LoaderStats {
    #[must_use]
    pub fn outcome(&self, code: LoaderErrorCode) -> u64 {
        self.outcomes[code_index(code)]
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.outcomes.iter().sum::<u64>() - self.outcome(LoaderErrorCode::Success)
    }
}

#[must_use]
pub fn snapshot() -> LoaderStats {
    let mut outcomes = [0; CODES];
    for (slot, counter) in outcomes.iter_mut().zip(OUTCOME_COUNTS.iter()) {
        *slot = counter.load(Ordering::Relaxed);
    }
    LoaderStats {
        loads: CALL_COUNTS[LoaderCall::Load.index()].load(Ordering::Relaxed),
        creates: CALL_COUNTS[LoaderCall::LoadAndCreate.index()].load(Ordering::Relaxed),
        configures: CALL_COUNTS[LoaderCall::LoadAndConfigure.index()].load(Ordering::Relaxed),
        outcomes,
    }
}
