//! Startup validation gate for the coordinated path.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const UNVALIDATED: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Startup validation has not run yet.
    Unvalidated,
    /// The directory was reachable; coordination is enabled.
    Open,
    /// The directory was unreachable; coordination is disabled.
    Closed,
}

impl GateState {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unvalidated => "unvalidated",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            OPEN => Self::Open,
            CLOSED => Self::Closed,
            _ => Self::Unvalidated,
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-once flag recording the startup directory check.
///
/// The first result sticks for the process lifetime. Only
/// [`StartupGate::reopen`] can change a closed gate, and an open gate stays
/// open.
#[derive(Debug, Default)]
pub struct StartupGate {
    state: AtomicU8,
}

impl StartupGate {
    /// Creates an unvalidated gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNVALIDATED),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> GateState {
        GateState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Returns whether coordinated queries may run.
    #[must_use]
    pub fn allows_coordination(&self) -> bool {
        self.state() == GateState::Open
    }

    /// Records the startup check. Later calls leave the first result in
    /// place and return it.
    pub fn record(&self, healthy: bool) -> GateState {
        let target = if healthy { OPEN } else { CLOSED };
        match self
            .state
            .compare_exchange(UNVALIDATED, target, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => GateState::from_raw(target),
            Err(current) => GateState::from_raw(current),
        }
    }

    /// Applies an explicit re-validation result.
    ///
    /// Opens an unvalidated or closed gate when `healthy`; a failed check
    /// closes an unvalidated gate and leaves the others unchanged.
    pub fn reopen(&self, healthy: bool) -> GateState {
        if healthy {
            self.state.store(OPEN, Ordering::Release);
            GateState::Open
        } else {
            self.record(false)
        }
    }
}
