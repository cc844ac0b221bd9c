//! Call session model.
//!
//! A [`CallSession`] is the single logical call occupying the call slot. The
//! coordinator is the only owner; everything else sees it by reference.

use std::fmt;

use crate::env::Environment;

/// Opaque identifier correlating UI state with the native call session.
///
/// Assigned once when the session is created and never reused for a
/// different logical call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(String);

impl CallId {
    /// Wrap an identifier supplied by the platform or a test.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random (version 4) UUID identifier.
    pub fn generate<E: Environment>(env: &E) -> Self {
        let bytes = env.random_u128().to_be_bytes();
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(uuid.hyphenated().to_string())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle phase of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// No call occupies the slot.
    Idle,
    /// Incoming call presented, waiting for the user or the native layer.
    Ringing,
    /// Native layer confirmed the call is connected.
    Active,
    /// Call finished; the slot is free for the next incoming signal.
    Ended,
}

impl CallState {
    /// Whether this state occupies the call slot.
    pub fn occupies_slot(self) -> bool {
        matches!(self, Self::Ringing | Self::Active)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Ringing => "ringing",
            Self::Active => "active",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Why a session reached [`CallState::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// User rejected the ringing call.
    Rejected,
    /// User hung up the active call.
    HungUp,
    /// Native layer reported the call ended (remote hang-up, carrier, OS UI).
    Remote,
    /// No confirmation arrived within the answer timeout.
    AnswerTimeout,
}

/// The single call occupying the slot.
///
/// `started_at` is `Some` if and only if `state` is [`CallState::Active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSession<I> {
    id: CallId,
    caller: Option<String>,
    phone_number: String,
    state: CallState,
    started_at: Option<I>,
    end_reason: Option<EndReason>,
}

impl<I: Copy> CallSession<I> {
    /// Create a ringing session for an incoming signal.
    pub(crate) fn ringing(id: CallId, caller: Option<String>, phone_number: String) -> Self {
        Self {
            id,
            caller,
            phone_number,
            state: CallState::Ringing,
            started_at: None,
            end_reason: None,
        }
    }

    pub(crate) fn activate(&mut self, now: I) {
        self.state = CallState::Active;
        self.started_at = Some(now);
    }

    pub(crate) fn end(&mut self, reason: EndReason) {
        self.state = CallState::Ended;
        self.started_at = None;
        self.end_reason = Some(reason);
    }

    /// Session identifier.
    pub fn id(&self) -> &CallId {
        &self.id
    }

    /// Display name of the caller. `None` if unknown.
    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    /// Caller name, or `"Unknown"` when the signal carried none.
    pub fn caller_or_unknown(&self) -> &str {
        self.caller.as_deref().unwrap_or("Unknown")
    }

    /// Number shown to the user and dialed by the native layer.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> CallState {
        self.state
    }

    /// When the call became active. `None` unless the session is active.
    pub fn started_at(&self) -> Option<I> {
        self.started_at
    }

    /// Why the session ended. `None` while the session is live.
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_at_follows_active_state() {
        let mut session: CallSession<u64> =
            CallSession::ringing("1".into(), Some("John Doe".into()), "123456789".into());
        assert_eq!(session.started_at(), None);

        session.activate(5);
        assert_eq!(session.state(), CallState::Active);
        assert_eq!(session.started_at(), Some(5));

        session.end(EndReason::HungUp);
        assert_eq!(session.state(), CallState::Ended);
        assert_eq!(session.started_at(), None);
        assert_eq!(session.end_reason(), Some(EndReason::HungUp));
    }

    #[test]
    fn missing_caller_shows_unknown() {
        let session: CallSession<u64> = CallSession::ringing("1".into(), None, "42".into());
        assert_eq!(session.caller_or_unknown(), "Unknown");
    }

    #[test]
    fn only_live_states_occupy_slot() {
        assert!(!CallState::Idle.occupies_slot());
        assert!(CallState::Ringing.occupies_slot());
        assert!(CallState::Active.occupies_slot());
        assert!(!CallState::Ended.occupies_slot());
    }
}
