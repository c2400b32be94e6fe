//! Two-step confirmation for clearing the chat.

use std::time::{Duration, Instant};

/// How long the first press stays armed
pub const CLEAR_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearState {
    Disarmed,
    Armed { until: Instant },
}

/// Result of pressing the clear control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// First press; ask the user to press again
    Armed,
    /// Second press inside the window; the caller clears and reloads
    Confirmed,
}

/// Armed/Disarmed state machine with a timeout back to Disarmed.
///
/// Time is passed in explicitly so callers decide which clock to use.
#[derive(Debug, Clone)]
pub struct ClearConfirm {
    state: ClearState,
    window: Duration,
}

impl ClearConfirm {
    pub fn new() -> Self {
        Self::with_window(CLEAR_CONFIRM_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            state: ClearState::Disarmed,
            window,
        }
    }

    /// Current state after applying any elapsed timeout
    pub fn state(&mut self, now: Instant) -> ClearState {
        if let ClearState::Armed { until } = self.state {
            if now >= until {
                self.state = ClearState::Disarmed;
            }
        }
        self.state
    }

    pub fn is_armed(&mut self, now: Instant) -> bool {
        matches!(self.state(now), ClearState::Armed { .. })
    }

    pub fn press(&mut self, now: Instant) -> ClearOutcome {
        match self.state(now) {
            ClearState::Armed { .. } => {
                self.state = ClearState::Disarmed;
                ClearOutcome::Confirmed
            }
            ClearState::Disarmed => {
                self.state = ClearState::Armed {
                    until: now + self.window,
                };
                ClearOutcome::Armed
            }
        }
    }

    pub fn disarm(&mut self) {
        self.state = ClearState::Disarmed;
    }
}

impl Default for ClearConfirm {
    fn default() -> Self {
        Self::new()
    }
}
