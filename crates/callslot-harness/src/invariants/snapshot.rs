//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the call slot at a point in
//! time. Part of it is read from the coordinator, the rest is accumulated by
//! a [`CallTracker`] from the actions the coordinator emitted so far.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use callslot_core::{CallAction, CallId, CallState, Coordinator, Environment, NativeCommand};

/// Snapshot of the call slot.
#[derive(Debug, Clone)]
pub struct CallSnapshot {
    /// Lifecycle phase reported by the coordinator.
    pub state: CallState,
    /// Current (or last ended) session. `None` before the first call.
    pub session: Option<CallId>,
    /// Whether the session carries an activation time.
    pub has_started_at: bool,
    /// Sessions presented to the user and not ended yet.
    pub live_sessions: BTreeSet<CallId>,
    /// Native `endCall` commands issued per session.
    pub end_commands: BTreeMap<CallId, usize>,
    /// Terminal transitions reported per session.
    pub ended: BTreeMap<CallId, usize>,
    /// Displayed elapsed durations per session, in emission order.
    pub elapsed_history: BTreeMap<CallId, Vec<Duration>>,
    /// Session whose duration timer is running.
    pub timer: Option<CallId>,
}

impl Default for CallSnapshot {
    fn default() -> Self {
        Self {
            state: CallState::Idle,
            session: None,
            has_started_at: false,
            live_sessions: BTreeSet::new(),
            end_commands: BTreeMap::new(),
            ended: BTreeMap::new(),
            elapsed_history: BTreeMap::new(),
            timer: None,
        }
    }
}

impl CallSnapshot {
    /// Snapshot of an untouched slot.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Accumulates the action history needed by history-based invariants.
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
    live_sessions: BTreeSet<CallId>,
    end_commands: BTreeMap<CallId, usize>,
    ended: BTreeMap<CallId, usize>,
    elapsed_history: BTreeMap<CallId, Vec<Duration>>,
    timer: Option<CallId>,
}

impl CallTracker {
    /// Tracker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record actions emitted by the coordinator.
    pub fn observe(&mut self, actions: &[CallAction]) {
        for action in actions {
            match action {
                CallAction::ShowIncoming { id, .. }
                | CallAction::Ringing { id, .. }
                | CallAction::Native(NativeCommand::DisplayIncomingCall { id, .. }) => {
                    self.live_sessions.insert(id.clone());
                },
                CallAction::Native(NativeCommand::EndCall { id }) => {
                    *self.end_commands.entry(id.clone()).or_default() += 1;
                },
                CallAction::Ended { id, .. } => {
                    self.live_sessions.remove(id);
                    *self.ended.entry(id.clone()).or_default() += 1;
                },
                CallAction::StartDurationTimer { id, .. } => self.timer = Some(id.clone()),
                CallAction::CancelDurationTimer { id } => {
                    if self.timer.as_ref() == Some(id) {
                        self.timer = None;
                    }
                },
                CallAction::ElapsedChanged { id, elapsed } => {
                    self.elapsed_history.entry(id.clone()).or_default().push(*elapsed);
                },
                CallAction::Native(_)
                | CallAction::HideIncoming
                | CallAction::ShowOngoing { .. }
                | CallAction::HideOngoing
                | CallAction::Notify { .. } => {},
            }
        }
    }

    /// Combine the recorded history with the coordinator's current state.
    pub fn snapshot<E: Environment>(&self, coordinator: &Coordinator<E>) -> CallSnapshot {
        let session = coordinator.session();
        CallSnapshot {
            state: coordinator.state(),
            session: session.map(|s| s.id().clone()),
            has_started_at: session.and_then(|s| s.started_at()).is_some(),
            live_sessions: self.live_sessions.clone(),
            end_commands: self.end_commands.clone(),
            ended: self.ended.clone(),
            elapsed_history: self.elapsed_history.clone(),
            timer: self.timer.clone(),
        }
    }
}
