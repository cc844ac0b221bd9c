//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use callslot_core::CallState;

use super::{CallSnapshot, Invariant, InvariantResult, Violation};

/// At most one call occupies the slot.
///
/// Only one presented session may be live, and while the coordinator
/// reports Ringing or Active it must be that session.
pub struct SingleSlot;

impl Invariant for SingleSlot {
    fn name(&self) -> &'static str {
        "SingleSlot"
    }

    fn check(&self, state: &CallSnapshot) -> InvariantResult {
        if state.live_sessions.len() > 1 {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} live sessions: {:?}",
                    state.live_sessions.len(),
                    state.live_sessions
                ),
            });
        }

        if state.state.occupies_slot()
            && let Some(id) = &state.session
            && !state.live_sessions.contains(id)
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} session {id} was never presented", state.state),
            });
        }
        Ok(())
    }
}

/// Activation time is present exactly while the call is Active.
pub struct StartedAtIffActive;

impl Invariant for StartedAtIffActive {
    fn name(&self) -> &'static str {
        "StartedAtIffActive"
    }

    fn check(&self, state: &CallSnapshot) -> InvariantResult {
        let active = state.state == CallState::Active;
        if active != state.has_started_at {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "state {} with started_at {}",
                    state.state,
                    if state.has_started_at { "set" } else { "unset" }
                ),
            });
        }
        Ok(())
    }
}

/// Displayed elapsed duration never decreases within a session.
pub struct ElapsedMonotonic;

impl Invariant for ElapsedMonotonic {
    fn name(&self) -> &'static str {
        "ElapsedMonotonic"
    }

    fn check(&self, state: &CallSnapshot) -> InvariantResult {
        for (id, history) in &state.elapsed_history {
            for window in history.windows(2) {
                if window[1] < window[0] {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "session {id}: elapsed decreased {:?} → {:?}",
                            window[0], window[1]
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A session ends once: at most one terminal transition and at most one
/// native `endCall` command per session.
pub struct SingleEndCommand;

impl Invariant for SingleEndCommand {
    fn name(&self) -> &'static str {
        "SingleEndCommand"
    }

    fn check(&self, state: &CallSnapshot) -> InvariantResult {
        if let Some((id, count)) = state.end_commands.iter().find(|(_, count)| **count > 1) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("session {id}: {count} endCall commands"),
            });
        }

        if let Some((id, count)) = state.ended.iter().find(|(_, count)| **count > 1) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("session {id}: ended {count} times"),
            });
        }
        Ok(())
    }
}

/// The duration timer runs only for the Active session.
pub struct TimerOnlyWhenActive;

impl Invariant for TimerOnlyWhenActive {
    fn name(&self) -> &'static str {
        "TimerOnlyWhenActive"
    }

    fn check(&self, state: &CallSnapshot) -> InvariantResult {
        let Some(timer) = &state.timer else {
            return Ok(());
        };

        if state.state != CallState::Active || state.session.as_ref() != Some(timer) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("timer for {timer} running while {}", state.state),
            });
        }
        Ok(())
    }
}
