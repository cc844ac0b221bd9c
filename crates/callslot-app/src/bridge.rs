//! Call-layer-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`callslot_core::Coordinator`] and
//! [`callslot_core::PermissionGate`] and adapts them to the application
//! lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into coordinator and gate
//!   events.
//! - Accumulates outgoing [`NativeCommand`]s, permission requests and timer
//!   requests to be executed by the runtime in the next I/O cycle.
//! - Interprets coordinator and gate actions and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use std::time::Duration;

use callslot_core::{
    CallAction, CallError, CallEvent, CallId, Coordinator, CoordinatorConfig, Environment,
    GateAction, NativeCommand, NativeEvent, Permission, PermissionGate, PermissionResults,
};

use crate::{AppAction, AppEvent};

/// Duration timer change requested by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerRequest {
    /// Acquire the recurring timer for a session.
    Start {
        /// Session identifier.
        id: CallId,
        /// Firing period.
        period: Duration,
    },
    /// Release the timer of a session.
    Cancel {
        /// Session identifier.
        id: CallId,
    },
}

/// Bridge between App and the call state machines.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    coordinator: Coordinator<E>,
    gate: PermissionGate,
    outgoing: Vec<NativeCommand>,
    timer_requests: Vec<TimerRequest>,
    permission_requests: Vec<Vec<Permission>>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment, coordinator
    /// configuration and permission gate.
    pub fn new(env: E, config: CoordinatorConfig, gate: PermissionGate) -> Self {
        Self {
            coordinator: Coordinator::new(env, config),
            gate,
            outgoing: Vec::new(),
            timer_requests: Vec::new(),
            permission_requests: Vec::new(),
        }
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::RequestPermissions => {
                if self.gate.is_ready() {
                    return vec![AppEvent::PermissionsGranted];
                }
                let actions = self.gate.acquire();
                self.process_gate_actions(actions)
            },
            AppAction::SimulateIncoming { caller, phone_number } => {
                if !self.gate.is_ready() {
                    tracing::warn!("incoming call before native setup, ignoring");
                    return vec![];
                }
                let actions = self.coordinator.incoming_call(caller, phone_number);
                self.process_call_actions(actions)
            },
            AppAction::Accept => {
                let actions = self.coordinator.accept();
                self.process_call_actions(actions)
            },
            AppAction::Reject => {
                let actions = self.coordinator.reject();
                self.process_call_actions(actions)
            },
            AppAction::HangUp => {
                let actions = self.coordinator.hang_up();
                self.process_call_actions(actions)
            },
            AppAction::Render | AppAction::Quit => vec![],
        }
    }

    /// Handle an event from the native call layer.
    pub fn handle_native_event(&mut self, event: NativeEvent) -> Vec<AppEvent> {
        let actions = self.coordinator.native_event(event);
        self.process_call_actions(actions)
    }

    /// Handle the OS response to a permission batch.
    pub fn handle_permission_results(&mut self, results: &PermissionResults) -> Vec<AppEvent> {
        match self.gate.handle_results(results) {
            Ok(actions) => self.process_gate_actions(actions),
            Err(e) => error_events(&e),
        }
    }

    /// Handle a permission request that failed before producing results.
    pub fn handle_permission_failure(&mut self, reason: impl Into<String>) -> Vec<AppEvent> {
        let error = self.gate.handle_request_failed(reason);
        error_events(&error)
    }

    /// Process a duration timer firing for session `id`.
    pub fn handle_duration_tick(&mut self, id: CallId, now: E::Instant) -> Vec<AppEvent> {
        let actions = self.coordinator.handle(CallEvent::DurationTick { id, now });
        self.process_call_actions(actions)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let actions = self.coordinator.tick(now);
        self.process_call_actions(actions)
    }

    /// Take pending native commands.
    pub fn take_outgoing(&mut self) -> Vec<NativeCommand> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take pending duration timer requests.
    pub fn take_timer_requests(&mut self) -> Vec<TimerRequest> {
        std::mem::take(&mut self.timer_requests)
    }

    /// Take pending permission batches.
    pub fn take_permission_requests(&mut self) -> Vec<Vec<Permission>> {
        std::mem::take(&mut self.permission_requests)
    }

    /// Call lifecycle coordinator.
    pub fn coordinator(&self) -> &Coordinator<E> {
        &self.coordinator
    }

    /// Permission gate.
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    fn process_gate_actions(&mut self, actions: Vec<GateAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                GateAction::RequestPermissions(permissions) => {
                    self.permission_requests.push(permissions);
                    events.push(AppEvent::PermissionsRequested);
                },
                GateAction::Setup(options) => {
                    self.outgoing.push(NativeCommand::Setup(options));
                    events.push(AppEvent::PermissionsGranted);
                },
            }
        }

        events
    }

    fn process_call_actions(&mut self, actions: Vec<CallAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                CallAction::Native(command) => {
                    self.outgoing.push(command);
                },
                CallAction::ShowIncoming { id, caller } => {
                    events.push(AppEvent::IncomingShown { id, caller });
                },
                CallAction::HideIncoming => events.push(AppEvent::IncomingHidden),
                CallAction::Ringing { id, caller } => {
                    events.push(AppEvent::Ringing { id, caller });
                },
                CallAction::ShowOngoing { id, caller } => {
                    events.push(AppEvent::OngoingShown { id, caller });
                },
                CallAction::HideOngoing => events.push(AppEvent::OngoingHidden),
                CallAction::StartDurationTimer { id, period } => {
                    self.timer_requests.push(TimerRequest::Start { id, period });
                },
                CallAction::CancelDurationTimer { id } => {
                    self.timer_requests.push(TimerRequest::Cancel { id });
                },
                CallAction::ElapsedChanged { elapsed, .. } => {
                    events.push(AppEvent::ElapsedChanged { elapsed });
                },
                CallAction::Ended { id, reason } => {
                    events.push(AppEvent::CallEnded { id, reason });
                },
                CallAction::Notify { title, message } => {
                    events.push(AppEvent::Notice { title, message });
                },
            }
        }

        events
    }
}

fn error_events(error: &CallError) -> Vec<AppEvent> {
    if error.is_recoverable() {
        tracing::warn!(%error, "permission flow failed, user may retry");
    } else {
        tracing::error!(%error, "call layer fault");
    }

    match error.alert() {
        Some((title, message)) => vec![AppEvent::PermissionsDenied {
            title: title.to_string(),
            message: message.to_string(),
        }],
        None => vec![AppEvent::Notice { title: "Error".to_string(), message: error.to_string() }],
    }
}
