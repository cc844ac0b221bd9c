//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`callslot_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input comes from a script of [`SimStep`]s. Every poll advances the
//! virtual clock by one frame. The simulated native layer confirms
//! `startCall` with `startCallAction` and echoes `endCall`, the way the OS
//! integration does, but only for kinds that have a live subscription.
//! Scripted answer and decline steps play the OS incoming-call UI for a call
//! handed over with `displayIncomingCall`.

use std::{
    collections::{BTreeSet, VecDeque},
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use callslot_app::{App, AppEvent, Driver, KeyInput, Screen, Subscription};
use callslot_core::{
    CallId, Environment, NativeCommand, NativeEvent, NativeEventKind, Permission,
    PermissionResults, PermissionStatus,
};
use thiserror::Error;

use crate::SimEnv;

/// Virtual time consumed by one poll.
pub const SIM_FRAME: Duration = Duration::from_millis(100);

/// Error type for simulation driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimDriverError {
    /// Simulated native layer refused a command.
    #[error("native layer rejected {0}")]
    Native(String),

    /// Simulated OS failed the permission request.
    #[error("permission request failed")]
    PermissionRequest,

    /// Simulated native layer refused a listener.
    #[error("subscription refused for {0}")]
    Subscribe(&'static str),
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimStep {
    /// Key press.
    Key(KeyInput),
    /// Let virtual time pass without input.
    Wait(Duration),
    /// Deliver a native event as-is.
    Native(NativeEvent),
    /// Remote party hangs up the call shown on screen.
    RemoteHangUp,
    /// User answers on the OS incoming-call UI.
    AnswerNatively,
    /// User declines on the OS incoming-call UI.
    DeclineNatively,
}

/// Rendered frame summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    /// Screen name.
    pub screen: &'static str,
    /// Alert title, if an alert is shown.
    pub alert: Option<String>,
    /// Displayed call duration on the ongoing screen.
    pub elapsed: Option<Duration>,
}

/// Shared state between the driver and its probe.
#[derive(Default)]
struct SimState {
    script: VecDeque<SimStep>,
    native_queue: VecDeque<NativeEvent>,
    commands: Vec<NativeCommand>,
    subscribed: BTreeSet<NativeEventKind>,
    released: Vec<NativeEventKind>,
    permission_requests: Vec<Vec<Permission>>,
    renders: Vec<RenderRecord>,
    on_screen: Option<CallId>,
    /// Call ringing on the OS incoming-call UI.
    ringing: Option<CallId>,
    stopped: bool,
}

impl SimState {
    /// Queue `event` if its kind has a live listener.
    fn deliver(&mut self, event: NativeEvent) {
        if self.subscribed.contains(&event.kind()) {
            self.native_queue.push_back(event);
        }
    }
}

/// Failure injection and native-layer behavior.
#[derive(Debug, Clone)]
struct SimBehavior {
    denied: BTreeSet<Permission>,
    fail_permission_request: bool,
    refuse_subscription: Option<NativeEventKind>,
    fail_commands: bool,
    auto_confirm: bool,
}

impl Default for SimBehavior {
    fn default() -> Self {
        Self {
            denied: BTreeSet::new(),
            fail_permission_request: false,
            refuse_subscription: None,
            fail_commands: false,
            auto_confirm: true,
        }
    }
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`callslot_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SimState>>,
    behavior: SimBehavior,
    next_handle: u64,
}

impl SimDriver {
    /// Create a driver sharing the virtual clock of `env`.
    pub fn new(env: SimEnv) -> Self {
        Self {
            env,
            state: Arc::new(Mutex::new(SimState::default())),
            behavior: SimBehavior::default(),
            next_handle: 1,
        }
    }

    /// Queue scripted input.
    #[must_use]
    pub fn with_script(self, steps: impl IntoIterator<Item = SimStep>) -> Self {
        self.lock().script.extend(steps);
        self
    }

    /// Deny a capability in every permission batch.
    #[must_use]
    pub fn deny(mut self, permission: Permission) -> Self {
        self.behavior.denied.insert(permission);
        self
    }

    /// Fail permission requests before they produce results.
    #[must_use]
    pub fn fail_permission_requests(mut self) -> Self {
        self.behavior.fail_permission_request = true;
        self
    }

    /// Refuse to register a listener for `kind`.
    #[must_use]
    pub fn refuse_subscription(mut self, kind: NativeEventKind) -> Self {
        self.behavior.refuse_subscription = Some(kind);
        self
    }

    /// Reject every native command after setup.
    #[must_use]
    pub fn fail_commands(mut self) -> Self {
        self.behavior.fail_commands = true;
        self
    }

    /// Never confirm `startCall`.
    #[must_use]
    pub fn without_confirmation(mut self) -> Self {
        self.behavior.auto_confirm = false;
        self
    }

    /// Inspection handle valid after the driver moved into a runtime.
    pub fn probe(&self) -> SimProbe {
        SimProbe { state: Arc::clone(&self.state) }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_event(&mut self) -> Option<AppEvent> {
        self.env.advance(SIM_FRAME);
        let mut state = self.lock();

        let Some(step) = state.script.pop_front() else {
            // Script exhausted
            return Some(AppEvent::Key(KeyInput::Char('q')));
        };

        match step {
            SimStep::Key(key) => Some(AppEvent::Key(key)),
            SimStep::Wait(remaining) => {
                if remaining > SIM_FRAME {
                    state.script.push_front(SimStep::Wait(remaining - SIM_FRAME));
                }
                None
            },
            SimStep::Native(event) => {
                state.native_queue.push_back(event);
                None
            },
            SimStep::RemoteHangUp => {
                if let Some(id) = state.on_screen.clone() {
                    state.deliver(NativeEvent::EndCall { id });
                }
                None
            },
            SimStep::AnswerNatively => {
                if let Some(id) = state.ringing.take() {
                    state.deliver(NativeEvent::AnswerCall { id });
                }
                None
            },
            SimStep::DeclineNatively => {
                if let Some(id) = state.ringing.take() {
                    state.deliver(NativeEvent::EndCall { id });
                }
                None
            },
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = Duration;

    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send {
        std::future::ready(Ok(self.next_event()))
    }

    fn request_permissions(
        &mut self,
        permissions: &[Permission],
    ) -> impl Future<Output = Result<PermissionResults, Self::Error>> + Send {
        self.lock().permission_requests.push(permissions.to_vec());

        let result = if self.behavior.fail_permission_request {
            Err(SimDriverError::PermissionRequest)
        } else {
            Ok(permissions
                .iter()
                .map(|p| {
                    let status = if self.behavior.denied.contains(p) {
                        PermissionStatus::Denied
                    } else {
                        PermissionStatus::Granted
                    };
                    (*p, status)
                })
                .collect())
        };
        std::future::ready(result)
    }

    fn invoke(&mut self, command: NativeCommand) -> Result<(), Self::Error> {
        if self.behavior.fail_commands && !matches!(command, NativeCommand::Setup(_)) {
            return Err(SimDriverError::Native(format!("{command:?}")));
        }

        let auto_confirm = self.behavior.auto_confirm;
        let mut state = self.lock();
        let echo = match &command {
            NativeCommand::StartCall { id, .. } if auto_confirm => {
                Some(NativeEvent::StartCallAction { id: id.clone() })
            },
            NativeCommand::EndCall { id } => Some(NativeEvent::EndCall { id: id.clone() }),
            _ => None,
        };
        if let Some(event) = echo {
            state.deliver(event);
        }

        state.commands.push(command);
        Ok(())
    }

    fn poll_native_event(&mut self) -> Option<NativeEvent> {
        self.lock().native_queue.pop_front()
    }

    fn subscribe(&mut self, kind: NativeEventKind) -> Result<Subscription, Self::Error> {
        if self.behavior.refuse_subscription == Some(kind) {
            return Err(SimDriverError::Subscribe(kind.name()));
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.lock().subscribed.insert(kind);
        Ok(Subscription::new(kind, handle))
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let mut state = self.lock();
        state.subscribed.remove(&subscription.kind());
        state.released.push(subscription.kind());
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let (on_screen, elapsed) = match app.screen() {
            Screen::Home => (None, None),
            Screen::Incoming { id, .. } | Screen::Ringing { id, .. } => (Some(id.clone()), None),
            Screen::Ongoing { id, elapsed, .. } => (Some(id.clone()), Some(*elapsed)),
        };
        let ringing = match app.screen() {
            Screen::Ringing { id, .. } => Some(id.clone()),
            _ => None,
        };

        let mut state = self.lock();
        state.on_screen = on_screen;
        state.ringing = ringing;
        state.renders.push(RenderRecord {
            screen: app.screen().name(),
            alert: app.alert().map(|a| a.title.clone()),
            elapsed,
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

/// Read-only view of what the simulated platform observed.
#[derive(Clone)]
pub struct SimProbe {
    state: Arc<Mutex<SimState>>,
}

impl SimProbe {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Native commands in dispatch order.
    pub fn commands(&self) -> Vec<NativeCommand> {
        self.lock().commands.clone()
    }

    /// Event kinds with a live listener.
    pub fn subscribed(&self) -> BTreeSet<NativeEventKind> {
        self.lock().subscribed.clone()
    }

    /// Event kinds whose listener was released, in release order.
    pub fn released(&self) -> Vec<NativeEventKind> {
        self.lock().released.clone()
    }

    /// Permission batches requested.
    pub fn permission_requests(&self) -> Vec<Vec<Permission>> {
        self.lock().permission_requests.clone()
    }

    /// Every rendered frame.
    pub fn renders(&self) -> Vec<RenderRecord> {
        self.lock().renders.clone()
    }

    /// Last rendered frame.
    pub fn last_render(&self) -> Option<RenderRecord> {
        self.lock().renders.last().cloned()
    }

    /// Whether the driver was stopped.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}
