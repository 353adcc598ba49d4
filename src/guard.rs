//! Duplicate-submission guard.
//!
//! There is no cancellation for in-flight requests, so a second submission
//! for the same key while one is outstanding is rejected instead of racing
//! it. Modeled as an explicit state machine rather than boolean flags.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlightState {
    Idle,
    Fetching(String),
}

#[derive(Debug)]
pub struct FlightGuard {
    state: Mutex<FlightState>,
}

impl FlightGuard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Idle),
        }
    }

    /// Transitions `Idle -> Fetching(key)`. Returns `false` when a fetch for
    /// the same key is already outstanding; a different key supersedes
    /// (last-write-wins is the caller's concern, arrival order decides).
    pub fn begin(&self, key: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match &*state {
            FlightState::Fetching(current) if current == key => false,
            _ => {
                *state = FlightState::Fetching(key.to_string());
                true
            }
        }
    }

    /// Transitions back to `Idle` once the request settles, success or not.
    pub fn finish(&self) {
        *self.state.lock().unwrap() = FlightState::Idle;
    }
}

impl Default for FlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_key_while_fetching() {
        let guard = FlightGuard::new();
        assert!(guard.begin("0xabc"));
        assert!(!guard.begin("0xabc"));

        guard.finish();
        assert!(guard.begin("0xabc"));
    }

    #[test]
    fn test_different_key_supersedes() {
        let guard = FlightGuard::new();
        assert!(guard.begin("0xabc"));
        assert!(guard.begin("0xdef"));
        assert!(!guard.begin("0xdef"));
    }

    #[test]
    fn test_finish_without_begin_is_harmless() {
        let guard = FlightGuard::new();
        guard.finish();
        assert!(guard.begin("0xabc"));
    }
}
