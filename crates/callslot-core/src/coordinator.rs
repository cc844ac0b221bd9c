//! Call lifecycle coordinator.
//!
//! The [`Coordinator`] is the single source of truth for the call slot. It
//! consumes [`CallEvent`]s (user actions, native events, timer ticks) and
//! produces [`CallAction`]s (native commands, screen changes, timer
//! requests) for the caller to execute.
//!
//! # State machine
//!
//! ```text
//!            incoming               confirmation (startCallAction | answerCall)
//!   Idle ───────────────▶ Ringing ─────────────────────────────────▶ Active
//!    ▲                     │  │ accept: startCall, stay Ringing        │
//!    │                     │  └────────────────┐                       │
//!    │      reject: endCall│   native endCall  │  hang up: endCall     │
//!    │                     ▼                   ▼  native endCall       │
//!    └──── (implicit) ─── Ended ◀──────────────────────────────────────┘
//! ```
//!
//! Native commands only express intent. Transitions into Active are gated on
//! the native confirmation event, never on the call site of `startCall`.
//!
//! # Races
//!
//! Native events and timer ticks carrying an id other than the current
//! session's are ignored. User actions issued in the wrong state are no-ops.

use std::{collections::VecDeque, time::Duration};

use crate::{
    env::Environment,
    native::{HANDLE_TYPE_GENERIC, NativeCommand, NativeEvent},
    session::{CallId, CallSession, CallState, EndReason},
};

/// Cadence of the elapsed-duration display.
pub const DURATION_TICK: Duration = Duration::from_secs(1);

/// Default wait for a confirmation after the user accepted.
pub const ANSWER_TIMEOUT: Duration = Duration::from_secs(30);

/// Notice title when the native layer ends a call the user did not end.
pub const CALL_ENDED_TITLE: &str = "Call ended!";

/// Notice title when an accepted call never got confirmed.
pub const CALL_FAILED_TITLE: &str = "Call failed";

/// Identifiers of replaced sessions remembered to refuse reuse.
pub const RETIRED_ID_CAPACITY: usize = 64;

/// How an incoming call is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// In-app modal with accept and reject buttons.
    #[default]
    InAppModal,
    /// OS incoming-call UI via `displayIncomingCall`.
    NativeUi,
}

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Call presentation strategy.
    pub presentation: Presentation,
    /// Wait for confirmation after accept. `None` waits forever.
    pub answer_timeout: Option<Duration>,
    /// Elapsed-duration refresh period.
    pub duration_tick: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            presentation: Presentation::InAppModal,
            answer_timeout: Some(ANSWER_TIMEOUT),
            duration_tick: DURATION_TICK,
        }
    }
}

impl CoordinatorConfig {
    /// Set the presentation strategy.
    #[must_use]
    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// Set the answer timeout. `None` disables it.
    #[must_use]
    pub fn with_answer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.answer_timeout = timeout;
        self
    }
}

/// Inputs to the coordinator.
///
/// Generic over `I` (Instant type) so simulation can drive virtual time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent<I> {
    /// Incoming-call signal (simulated or real).
    Incoming {
        /// Explicit identifier. `None` generates a fresh one.
        id: Option<CallId>,
        /// Caller display name.
        caller: Option<String>,
        /// Caller number.
        phone_number: String,
    },

    /// User pressed Accept.
    Accept,

    /// User pressed Reject.
    Reject,

    /// User pressed Hang Up.
    HangUp,

    /// Native call-management event.
    Native(NativeEvent),

    /// Duration timer fired for a session.
    DurationTick {
        /// Session the timer was started for.
        id: CallId,
        /// Current time from the environment.
        now: I,
    },

    /// Periodic housekeeping tick (answer timeout).
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Instructions produced by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallAction {
    /// Invoke the native call-management layer (fire-and-forget).
    Native(NativeCommand),

    /// Call is ringing on the OS incoming-call UI.
    ///
    /// Indication only; the app has nothing to hide afterwards. The call
    /// either becomes active or ends.
    Ringing {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Show the in-app incoming-call modal.
    ShowIncoming {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Hide the in-app incoming-call modal.
    HideIncoming,

    /// Show the ongoing-call screen.
    ShowOngoing {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Hide the ongoing-call screen.
    HideOngoing,

    /// Acquire the recurring duration timer for a session.
    StartDurationTimer {
        /// Session identifier.
        id: CallId,
        /// Timer period.
        period: Duration,
    },

    /// Release the duration timer of a session.
    CancelDurationTimer {
        /// Session identifier.
        id: CallId,
    },

    /// Displayed elapsed duration changed.
    ElapsedChanged {
        /// Session identifier.
        id: CallId,
        /// Time since the call became active.
        elapsed: Duration,
    },

    /// Session reached [`CallState::Ended`].
    Ended {
        /// Session identifier.
        id: CallId,
        /// Why the session ended.
        reason: EndReason,
    },

    /// User-acknowledged notice.
    Notify {
        /// Notice title.
        title: String,
        /// Notice body.
        message: String,
    },
}

/// Call lifecycle coordinator owning the single call slot.
#[derive(Debug, Clone)]
pub struct Coordinator<E: Environment> {
    env: E,
    config: CoordinatorConfig,
    session: Option<CallSession<E::Instant>>,
    /// Ids of replaced sessions, oldest first.
    retired: VecDeque<CallId>,
    /// When the user accepted the ringing call. `None` if not accepted.
    accepted_at: Option<E::Instant>,
    /// Displayed elapsed duration of the active call.
    elapsed: Duration,
}

impl<E: Environment> Coordinator<E> {
    /// Create a coordinator with an empty slot.
    pub fn new(env: E, config: CoordinatorConfig) -> Self {
        Self {
            env,
            config,
            session: None,
            retired: VecDeque::new(),
            accepted_at: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: CallEvent<E::Instant>) -> Vec<CallAction> {
        match event {
            CallEvent::Incoming { id, caller, phone_number } => {
                self.on_incoming(id, caller, phone_number)
            },
            CallEvent::Accept => self.on_accept(),
            CallEvent::Reject => self.on_reject(),
            CallEvent::HangUp => self.on_hang_up(),
            CallEvent::Native(event) => self.on_native(event),
            CallEvent::DurationTick { id, now } => self.on_duration_tick(&id, now),
            CallEvent::Tick { now } => self.on_tick(now),
        }
    }

    /// Incoming-call signal with a generated identifier.
    pub fn incoming_call(
        &mut self,
        caller: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Vec<CallAction> {
        self.on_incoming(None, Some(caller.into()), phone_number.into())
    }

    /// User accepts the ringing call.
    pub fn accept(&mut self) -> Vec<CallAction> {
        self.on_accept()
    }

    /// User rejects the ringing call.
    pub fn reject(&mut self) -> Vec<CallAction> {
        self.on_reject()
    }

    /// User hangs up the active call.
    pub fn hang_up(&mut self) -> Vec<CallAction> {
        self.on_hang_up()
    }

    /// Native layer delivered an event.
    pub fn native_event(&mut self, event: NativeEvent) -> Vec<CallAction> {
        self.on_native(event)
    }

    /// Housekeeping tick.
    pub fn tick(&mut self, now: E::Instant) -> Vec<CallAction> {
        self.on_tick(now)
    }

    /// Current session, including an ended one not yet replaced.
    pub fn session(&self) -> Option<&CallSession<E::Instant>> {
        self.session.as_ref()
    }

    /// Current lifecycle phase of the slot.
    pub fn state(&self) -> CallState {
        self.session.as_ref().map_or(CallState::Idle, CallSession::state)
    }

    /// Whether the user accepted and a confirmation is pending.
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.accepted_at.is_some()
    }

    /// Displayed elapsed duration. Zero unless the call is active.
    pub fn elapsed(&self) -> Duration {
        if self.state() == CallState::Active { self.elapsed } else { Duration::ZERO }
    }

    /// Whether `id` belonged to an earlier session.
    ///
    /// Only the last [`RETIRED_ID_CAPACITY`] sessions are remembered.
    pub fn is_retired(&self, id: &CallId) -> bool {
        self.retired.contains(id)
    }

    fn on_incoming(
        &mut self,
        id: Option<CallId>,
        caller: Option<String>,
        phone_number: String,
    ) -> Vec<CallAction> {
        if let Some(current) = self.session.as_ref().filter(|s| s.state().occupies_slot()) {
            tracing::warn!(current = %current.id(), "call slot busy, ignoring incoming call");
            return vec![];
        }

        let id = match id {
            Some(id)
                if self.is_retired(&id) || self.session.as_ref().is_some_and(|s| s.id() == &id) =>
            {
                tracing::warn!(%id, "incoming call reuses previous id, ignoring");
                return vec![];
            },
            Some(id) => id,
            None => CallId::generate(&self.env),
        };

        let session = CallSession::ringing(id.clone(), caller, phone_number);
        let caller = session.caller_or_unknown().to_string();
        let number = session.phone_number().to_string();
        tracing::debug!(%id, %caller, "call ringing");

        if let Some(previous) = self.session.replace(session) {
            self.retire(previous.id().clone());
        }
        self.accepted_at = None;
        self.elapsed = Duration::ZERO;

        match self.config.presentation {
            Presentation::InAppModal => vec![CallAction::ShowIncoming { id, caller }],
            Presentation::NativeUi => vec![
                CallAction::Native(NativeCommand::DisplayIncomingCall {
                    id: id.clone(),
                    caller_name: caller.clone(),
                    number,
                    handle_type: HANDLE_TYPE_GENERIC.to_string(),
                    has_video: false,
                }),
                CallAction::Ringing { id, caller },
            ],
        }
    }

    fn retire(&mut self, id: CallId) {
        if self.retired.len() == RETIRED_ID_CAPACITY {
            self.retired.pop_front();
        }
        self.retired.push_back(id);
    }

    /// Whether the in-app modal is presenting the ringing call.
    ///
    /// False under native presentation and once the user accepted.
    fn modal_visible(&self) -> bool {
        self.config.presentation == Presentation::InAppModal && self.accepted_at.is_none()
    }

    fn on_accept(&mut self) -> Vec<CallAction> {
        let Some(session) = self.session.as_ref().filter(|s| s.state() == CallState::Ringing)
        else {
            tracing::debug!(state = %self.state(), "accept ignored");
            return vec![];
        };

        if self.accepted_at.is_some() {
            tracing::debug!(id = %session.id(), "accept already pending");
            return vec![];
        }

        let command = NativeCommand::StartCall {
            id: session.id().clone(),
            number: session.phone_number().to_string(),
            caller_name: session.caller_or_unknown().to_string(),
        };
        tracing::debug!(id = %session.id(), "call accepted, awaiting confirmation");

        let mut actions = Vec::with_capacity(2);
        if self.modal_visible() {
            actions.push(CallAction::HideIncoming);
        }
        actions.push(CallAction::Native(command));
        self.accepted_at = Some(self.env.now());
        actions
    }

    fn on_reject(&mut self) -> Vec<CallAction> {
        let modal_visible = self.modal_visible();
        let Some(session) = self.session.as_mut().filter(|s| s.state() == CallState::Ringing)
        else {
            tracing::debug!(state = %self.state(), "reject ignored");
            return vec![];
        };

        session.end(EndReason::Rejected);
        let id = session.id().clone();
        self.accepted_at = None;
        tracing::debug!(%id, "call rejected");

        let mut actions = Vec::with_capacity(3);
        if modal_visible {
            actions.push(CallAction::HideIncoming);
        }
        actions.extend([
            CallAction::Native(NativeCommand::EndCall { id: id.clone() }),
            CallAction::Ended { id, reason: EndReason::Rejected },
        ]);
        actions
    }

    fn on_hang_up(&mut self) -> Vec<CallAction> {
        let Some(session) = self.session.as_mut().filter(|s| s.state() == CallState::Active)
        else {
            tracing::debug!(state = %self.state(), "hang up ignored");
            return vec![];
        };

        session.end(EndReason::HungUp);
        let id = session.id().clone();
        tracing::debug!(%id, "call hung up");

        vec![
            CallAction::CancelDurationTimer { id: id.clone() },
            CallAction::HideOngoing,
            CallAction::Native(NativeCommand::EndCall { id: id.clone() }),
            CallAction::Ended { id, reason: EndReason::HungUp },
        ]
    }

    fn on_native(&mut self, event: NativeEvent) -> Vec<CallAction> {
        let now = self.env.now();
        let modal_visible = self.modal_visible();
        let Some(session) = self.session.as_mut().filter(|s| s.id() == event.call_id()) else {
            tracing::debug!(
                kind = event.kind().name(),
                id = %event.call_id(),
                "stale native event"
            );
            return vec![];
        };

        match (event, session.state()) {
            (
                NativeEvent::StartCallAction { .. } | NativeEvent::AnswerCall { .. },
                CallState::Ringing,
            ) => {
                session.activate(now);
                let id = session.id().clone();
                let caller = session.caller_or_unknown().to_string();
                self.accepted_at = None;
                self.elapsed = Duration::ZERO;
                tracing::debug!(%id, "call active");

                let mut actions = Vec::with_capacity(6);
                if modal_visible {
                    actions.push(CallAction::HideIncoming);
                }
                actions.extend([
                    CallAction::Native(NativeCommand::SetCurrentCallActive { id: id.clone() }),
                    CallAction::ShowOngoing { id: id.clone(), caller },
                    CallAction::StartDurationTimer {
                        id: id.clone(),
                        period: self.config.duration_tick,
                    },
                    CallAction::ElapsedChanged { id, elapsed: Duration::ZERO },
                ]);
                actions
            },
            (NativeEvent::EndCall { .. }, CallState::Ringing) => {
                session.end(EndReason::Remote);
                let id = session.id().clone();
                self.accepted_at = None;
                tracing::debug!(%id, "ringing call ended by native layer");

                let mut actions = Vec::with_capacity(3);
                if modal_visible {
                    actions.push(CallAction::HideIncoming);
                }
                actions.extend([
                    CallAction::Ended { id: id.clone(), reason: EndReason::Remote },
                    ended_notice(&id),
                ]);
                actions
            },
            (NativeEvent::EndCall { .. }, CallState::Active) => {
                session.end(EndReason::Remote);
                let id = session.id().clone();
                tracing::debug!(%id, "active call ended by native layer");

                vec![
                    CallAction::CancelDurationTimer { id: id.clone() },
                    CallAction::HideOngoing,
                    CallAction::Ended { id: id.clone(), reason: EndReason::Remote },
                    ended_notice(&id),
                ]
            },
            (event, state) => {
                tracing::debug!(
                    kind = event.kind().name(),
                    id = %event.call_id(),
                    %state,
                    end_reason = ?session.end_reason(),
                    "native event needs no transition"
                );
                vec![]
            },
        }
    }

    fn on_duration_tick(&mut self, id: &CallId, now: E::Instant) -> Vec<CallAction> {
        let Some(started_at) = self
            .session
            .as_ref()
            .filter(|s| s.id() == id)
            .and_then(CallSession::started_at)
        else {
            tracing::debug!(%id, "stale duration tick");
            return vec![];
        };

        // Display has whole-second resolution
        let elapsed = (now - started_at).max(self.elapsed);
        let changed = elapsed.as_secs() != self.elapsed.as_secs();
        self.elapsed = elapsed;

        if changed { vec![CallAction::ElapsedChanged { id: id.clone(), elapsed }] } else { vec![] }
    }

    fn on_tick(&mut self, now: E::Instant) -> Vec<CallAction> {
        let (Some(accepted_at), Some(timeout)) = (self.accepted_at, self.config.answer_timeout)
        else {
            return vec![];
        };

        if now - accepted_at < timeout {
            return vec![];
        }

        let Some(session) = self.session.as_mut().filter(|s| s.state() == CallState::Ringing)
        else {
            self.accepted_at = None;
            return vec![];
        };

        session.end(EndReason::AnswerTimeout);
        let id = session.id().clone();
        self.accepted_at = None;
        tracing::warn!(%id, ?timeout, "no confirmation after accept, ending call");

        vec![
            CallAction::Native(NativeCommand::EndCall { id: id.clone() }),
            CallAction::Ended { id: id.clone(), reason: EndReason::AnswerTimeout },
            CallAction::Notify {
                title: CALL_FAILED_TITLE.to_string(),
                message: format!("No answer confirmation for {id}"),
            },
        ]
    }
}

fn ended_notice(id: &CallId) -> CallAction {
    CallAction::Notify { title: CALL_ENDED_TITLE.to_string(), message: format!("UUID: {id}") }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        task::{Context, Poll},
    };

    use super::*;

    struct ImmediateFuture;

    impl Future for ImmediateFuture {
        type Output = ();
        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            Poll::Ready(())
        }
    }

    /// Virtual clock in milliseconds; `Duration` doubles as the instant type.
    #[derive(Clone, Default)]
    struct TestEnv {
        millis: Arc<AtomicU64>,
    }

    impl TestEnv {
        fn advance(&self, by: Duration) {
            self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Environment for TestEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            ImmediateFuture
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = i as u8;
            }
        }
    }

    fn ringing() -> (Coordinator<TestEnv>, TestEnv, CallId) {
        let env = TestEnv::default();
        let mut coordinator = Coordinator::new(env.clone(), CoordinatorConfig::default());
        let _ = coordinator.handle(CallEvent::Incoming {
            id: Some("call-1".into()),
            caller: Some("John Doe".into()),
            phone_number: "123456789".into(),
        });
        (coordinator, env, "call-1".into())
    }

    fn active() -> (Coordinator<TestEnv>, TestEnv, CallId) {
        let (mut coordinator, env, id) = ringing();
        let _ = coordinator.accept();
        let _ = coordinator.native_event(NativeEvent::StartCallAction { id: id.clone() });
        (coordinator, env, id)
    }

    #[test]
    fn incoming_shows_modal() {
        let env = TestEnv::default();
        let mut coordinator = Coordinator::new(env, CoordinatorConfig::default());
        let actions = coordinator.incoming_call("John Doe", "123456789");

        assert_eq!(coordinator.state(), CallState::Ringing);
        assert!(matches!(
            actions.as_slice(),
            [CallAction::ShowIncoming { caller, .. }] if caller == "John Doe"
        ));
    }

    #[test]
    fn generated_ids_are_uuids() {
        let env = TestEnv::default();
        let mut coordinator = Coordinator::new(env, CoordinatorConfig::default());
        let _ = coordinator.incoming_call("John Doe", "123456789");

        let id = coordinator.session().map(|s| s.id().to_string()).unwrap_or_default();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn native_ui_presentation_displays_incoming_call() {
        let env = TestEnv::default();
        let config = CoordinatorConfig::default().with_presentation(Presentation::NativeUi);
        let mut coordinator = Coordinator::new(env, config);
        let actions = coordinator.incoming_call("John Doe", "123456789");

        assert!(matches!(
            actions.as_slice(),
            [
                CallAction::Native(NativeCommand::DisplayIncomingCall { has_video: false, .. }),
                CallAction::Ringing { caller, .. },
            ] if caller == "John Doe"
        ));
    }

    #[test]
    fn native_ui_never_hides_a_modal() {
        let env = TestEnv::default();
        let config = CoordinatorConfig::default().with_presentation(Presentation::NativeUi);
        let mut coordinator = Coordinator::new(env, config);
        let incoming = |coordinator: &mut Coordinator<TestEnv>, id: &str| {
            coordinator.handle(CallEvent::Incoming {
                id: Some(id.into()),
                caller: Some("John Doe".into()),
                phone_number: "123456789".into(),
            })
        };

        // Answered on the OS UI
        let _ = incoming(&mut coordinator, "n1");
        let answered = coordinator.native_event(NativeEvent::AnswerCall { id: "n1".into() });
        assert_eq!(coordinator.state(), CallState::Active);
        assert!(!answered.contains(&CallAction::HideIncoming));
        let _ = coordinator.hang_up();

        // Accepted in the app
        let _ = incoming(&mut coordinator, "n2");
        let accepted = coordinator.accept();
        assert!(matches!(accepted.as_slice(), [CallAction::Native(NativeCommand::StartCall {
            ..
        })]));
        let _ = coordinator.native_event(NativeEvent::EndCall { id: "n2".into() });

        // Declined on the OS UI
        let _ = incoming(&mut coordinator, "n3");
        let declined = coordinator.native_event(NativeEvent::EndCall { id: "n3".into() });
        assert!(!declined.contains(&CallAction::HideIncoming));
        assert_eq!(coordinator.state(), CallState::Ended);
    }

    #[test]
    fn accept_stays_ringing_until_confirmed() {
        let (mut coordinator, _env, id) = ringing();
        let actions = coordinator.accept();

        assert_eq!(actions, vec![
            CallAction::HideIncoming,
            CallAction::Native(NativeCommand::StartCall {
                id,
                number: "123456789".into(),
                caller_name: "John Doe".into(),
            }),
        ]);
        assert_eq!(coordinator.state(), CallState::Ringing);
        assert!(coordinator.is_awaiting_confirmation());

        // Double tap does not start a second call
        assert!(coordinator.accept().is_empty());
    }

    #[test]
    fn confirmation_activates_and_starts_timer() {
        let (mut coordinator, _env, id) = ringing();
        let _ = coordinator.accept();
        let actions = coordinator.native_event(NativeEvent::StartCallAction { id: id.clone() });

        assert_eq!(coordinator.state(), CallState::Active);
        assert!(coordinator.session().and_then(CallSession::started_at).is_some());
        assert!(actions.contains(&CallAction::Native(NativeCommand::SetCurrentCallActive {
            id: id.clone()
        })));
        assert!(actions.contains(&CallAction::StartDurationTimer { id, period: DURATION_TICK }));
        assert!(!actions.contains(&CallAction::HideIncoming));
    }

    #[test]
    fn native_answer_hides_modal() {
        let (mut coordinator, _env, id) = ringing();
        let actions = coordinator.native_event(NativeEvent::AnswerCall { id });

        assert_eq!(coordinator.state(), CallState::Active);
        assert_eq!(actions.first(), Some(&CallAction::HideIncoming));
    }

    #[test]
    fn reject_ends_call() {
        let (mut coordinator, _env, id) = ringing();
        let actions = coordinator.reject();

        assert_eq!(coordinator.state(), CallState::Ended);
        assert!(actions.contains(&CallAction::Native(NativeCommand::EndCall { id })));
        assert!(coordinator.reject().is_empty());
    }

    #[test]
    fn hang_up_cancels_timer_and_ends_call() {
        let (mut coordinator, _env, id) = active();
        let actions = coordinator.hang_up();

        assert_eq!(actions, vec![
            CallAction::CancelDurationTimer { id: id.clone() },
            CallAction::HideOngoing,
            CallAction::Native(NativeCommand::EndCall { id: id.clone() }),
            CallAction::Ended { id, reason: EndReason::HungUp },
        ]);
        assert_eq!(coordinator.session().and_then(CallSession::started_at), None);
    }

    #[test]
    fn hang_up_while_ringing_is_noop() {
        let (mut coordinator, _env, _id) = ringing();
        assert!(coordinator.hang_up().is_empty());
        assert_eq!(coordinator.state(), CallState::Ringing);
    }

    #[test]
    fn remote_end_notifies_user() {
        let (mut coordinator, _env, id) = active();
        let actions = coordinator.native_event(NativeEvent::EndCall { id: id.clone() });

        assert_eq!(coordinator.state(), CallState::Ended);
        assert!(actions.contains(&CallAction::Notify {
            title: CALL_ENDED_TITLE.into(),
            message: format!("UUID: {id}"),
        }));
    }

    #[test]
    fn end_confirmation_after_local_end_is_noop() {
        let (mut coordinator, _env, id) = active();
        let _ = coordinator.hang_up();

        assert!(coordinator.native_event(NativeEvent::EndCall { id: id.clone() }).is_empty());
        assert!(coordinator.native_event(NativeEvent::EndCall { id }).is_empty());
        assert_eq!(coordinator.state(), CallState::Ended);
    }

    #[test]
    fn stale_events_are_ignored() {
        let (mut coordinator, _env, _id) = ringing();
        let stale = CallId::new("other");

        let confirm = NativeEvent::StartCallAction { id: stale.clone() };
        assert!(coordinator.native_event(confirm).is_empty());
        assert!(coordinator.native_event(NativeEvent::EndCall { id: stale }).is_empty());
        assert_eq!(coordinator.state(), CallState::Ringing);
    }

    #[test]
    fn busy_slot_ignores_incoming() {
        let (mut coordinator, _env, id) = active();
        let actions = coordinator.incoming_call("Jane Roe", "555");

        assert!(actions.is_empty());
        assert_eq!(coordinator.session().map(CallSession::id), Some(&id));
    }

    #[test]
    fn reused_id_is_rejected() {
        let (mut coordinator, _env, id) = ringing();
        let _ = coordinator.reject();

        let actions = coordinator.handle(CallEvent::Incoming {
            id: Some(id),
            caller: None,
            phone_number: "1".into(),
        });
        assert!(actions.is_empty());
        assert_eq!(coordinator.state(), CallState::Ended);
    }

    #[test]
    fn retired_id_is_rejected_after_another_call() {
        let (mut coordinator, _env, first) = ringing();
        let _ = coordinator.reject();
        let _ = coordinator.handle(CallEvent::Incoming {
            id: Some("call-2".into()),
            caller: None,
            phone_number: "2".into(),
        });
        let _ = coordinator.reject();

        let actions = coordinator.handle(CallEvent::Incoming {
            id: Some(first.clone()),
            caller: None,
            phone_number: "1".into(),
        });
        assert!(actions.is_empty());
        assert!(coordinator.is_retired(&first));
        assert_eq!(coordinator.session().map(CallSession::id), Some(&CallId::new("call-2")));

        // Late end from the first call cannot reach a newer session
        let _ = coordinator.incoming_call("Jane Roe", "555");
        assert!(coordinator.native_event(NativeEvent::EndCall { id: first }).is_empty());
        assert_eq!(coordinator.state(), CallState::Ringing);
    }

    #[test]
    fn retired_ids_are_bounded() {
        let (mut coordinator, _env, first) = ringing();
        for n in 0..RETIRED_ID_CAPACITY {
            let _ = coordinator.reject();
            let _ = coordinator.handle(CallEvent::Incoming {
                id: Some(CallId::new(format!("call-{}", n + 2))),
                caller: None,
                phone_number: "1".into(),
            });
        }

        assert!(coordinator.is_retired(&CallId::new("call-2")));
        assert!(!coordinator.is_retired(&first));
    }

    #[test]
    fn duration_ticks_whole_seconds() {
        let (mut coordinator, env, id) = active();

        env.advance(Duration::from_millis(400));
        let now = env.now();
        assert!(coordinator.handle(CallEvent::DurationTick { id: id.clone(), now }).is_empty());

        env.advance(Duration::from_millis(700));
        let now = env.now();
        let actions = coordinator.handle(CallEvent::DurationTick { id: id.clone(), now });
        assert!(matches!(
            actions.as_slice(),
            [CallAction::ElapsedChanged { elapsed, .. }] if elapsed.as_secs() == 1
        ));
        assert_eq!(coordinator.elapsed().as_secs(), 1);
    }

    #[test]
    fn stale_duration_tick_ignored() {
        let (mut coordinator, env, _id) = active();
        env.advance(Duration::from_secs(5));

        let now = env.now();
        let actions = coordinator.handle(CallEvent::DurationTick { id: "old".into(), now });
        assert!(actions.is_empty());
        assert_eq!(coordinator.elapsed(), Duration::ZERO);
    }

    #[test]
    fn answer_timeout_ends_unconfirmed_call() {
        let (mut coordinator, env, id) = ringing();
        let _ = coordinator.accept();

        env.advance(ANSWER_TIMEOUT - Duration::from_millis(1));
        assert!(coordinator.tick(env.now()).is_empty());

        env.advance(Duration::from_millis(1));
        let actions = coordinator.tick(env.now());
        assert!(actions.contains(&CallAction::Native(NativeCommand::EndCall { id: id.clone() })));
        assert!(actions.contains(&CallAction::Ended { id, reason: EndReason::AnswerTimeout }));
        assert_eq!(coordinator.state(), CallState::Ended);
    }

    #[test]
    fn disabled_timeout_waits_forever() {
        let env = TestEnv::default();
        let config = CoordinatorConfig::default().with_answer_timeout(None);
        let mut coordinator = Coordinator::new(env.clone(), config);
        let _ = coordinator.incoming_call("John Doe", "123456789");
        let _ = coordinator.accept();

        env.advance(Duration::from_secs(3600));
        assert!(coordinator.tick(env.now()).is_empty());
        assert_eq!(coordinator.state(), CallState::Ringing);
    }
}
