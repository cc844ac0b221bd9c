//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the application completely decoupled from I/O and
//! the native call layer.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks which screen is presented (home, incoming modal, a call ringing
//!   on the OS UI, ongoing call).
//! - Holds the blocking alert until the user acknowledges it.
//! - Maps key presses onto call intents. Whether an intent is valid in the
//!   current call state is decided by the coordinator, not here.

use callslot_core::EndReason;

use crate::{Alert, AppAction, AppEvent, KeyInput, PermissionView, Screen};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Presented screen.
    screen: Screen,
    /// Blocking alert. `None` if nothing to acknowledge.
    alert: Option<Alert>,
    /// Permission status.
    permissions: PermissionView,
    /// Caller name used for simulated incoming calls.
    caller: String,
    /// Caller number used for simulated incoming calls.
    phone_number: String,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App simulating calls from `caller` at `phone_number`.
    pub fn new(caller: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            screen: Screen::Home,
            alert: None,
            permissions: PermissionView::Unknown,
            caller: caller.into(),
            phone_number: phone_number.into(),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::PermissionsRequested => {
                self.permissions = PermissionView::Requesting;
                self.status_message = Some("Requesting permissions...".into());
                vec![AppAction::Render]
            },
            AppEvent::PermissionsGranted => {
                self.permissions = PermissionView::Granted;
                self.status_message = Some("Call integration ready".into());
                vec![AppAction::Render]
            },
            AppEvent::PermissionsDenied { title, message } => {
                self.permissions = PermissionView::Denied;
                self.alert = Some(Alert { title, message });
                vec![AppAction::Render]
            },
            AppEvent::IncomingShown { id, caller } => {
                self.status_message = Some(format!("{caller} is calling..."));
                self.screen = Screen::Incoming { id, caller };
                vec![AppAction::Render]
            },
            AppEvent::IncomingHidden => {
                if matches!(self.screen, Screen::Incoming { .. }) {
                    self.screen = Screen::Home;
                }
                vec![AppAction::Render]
            },
            AppEvent::Ringing { id, caller } => {
                self.status_message = Some(format!("{caller} is calling on the system call UI"));
                self.screen = Screen::Ringing { id, caller };
                vec![AppAction::Render]
            },
            AppEvent::OngoingShown { id, caller } => {
                self.status_message = None;
                self.screen = Screen::Ongoing { id, caller, elapsed: std::time::Duration::ZERO };
                vec![AppAction::Render]
            },
            AppEvent::OngoingHidden => {
                if matches!(self.screen, Screen::Ongoing { .. }) {
                    self.screen = Screen::Home;
                }
                vec![AppAction::Render]
            },
            AppEvent::ElapsedChanged { elapsed } => {
                if let Screen::Ongoing { elapsed: shown, .. } = &mut self.screen {
                    *shown = elapsed;
                }
                vec![AppAction::Render]
            },
            AppEvent::CallEnded { id, reason } => {
                let how = match reason {
                    EndReason::Rejected => "rejected",
                    EndReason::HungUp => "hung up",
                    EndReason::Remote => "ended by remote",
                    EndReason::AnswerTimeout => "not confirmed in time",
                };
                self.status_message = Some(format!("Call {id} {how}"));
                if matches!(&self.screen, Screen::Ringing { id: ringing, .. } if *ringing == id) {
                    self.screen = Screen::Home;
                }
                vec![AppAction::Render]
            },
            AppEvent::Notice { title, message } => {
                self.alert = Some(Alert { title, message });
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.alert.is_some() {
            // Alerts are blocking; only acknowledgement or quit get through
            return match key {
                KeyInput::Enter => self.dismiss_alert(),
                KeyInput::Esc | KeyInput::Char('q') => self.quit(),
                KeyInput::Char(_) => vec![],
            };
        }

        match key {
            KeyInput::Esc | KeyInput::Char('q') => self.quit(),
            KeyInput::Char('i') => self.simulate_incoming(),
            KeyInput::Char('a') => self.accept(),
            KeyInput::Char('r') => self.reject(),
            KeyInput::Char('h') => self.hang_up(),
            KeyInput::Char('p') => self.request_permissions(),
            KeyInput::Char(_) | KeyInput::Enter => vec![],
        }
    }

    /// Run the permission gate.
    pub fn request_permissions(&self) -> Vec<AppAction> {
        vec![AppAction::RequestPermissions, AppAction::Render]
    }

    /// Simulate an incoming call from the configured caller.
    ///
    /// Refused until permissions are granted.
    pub fn simulate_incoming(&mut self) -> Vec<AppAction> {
        if self.permissions != PermissionView::Granted {
            self.status_message = Some("Grant permissions first (press p)".into());
            return vec![AppAction::Render];
        }

        vec![
            AppAction::SimulateIncoming {
                caller: self.caller.clone(),
                phone_number: self.phone_number.clone(),
            },
            AppAction::Render,
        ]
    }

    /// Accept the ringing call.
    pub fn accept(&mut self) -> Vec<AppAction> {
        if let Screen::Incoming { caller, .. } | Screen::Ringing { caller, .. } = &self.screen {
            self.status_message = Some(format!("Connecting to {caller}..."));
        }
        vec![AppAction::Accept, AppAction::Render]
    }

    /// Reject the ringing call.
    pub fn reject(&self) -> Vec<AppAction> {
        vec![AppAction::Reject, AppAction::Render]
    }

    /// Hang up the active call.
    pub fn hang_up(&self) -> Vec<AppAction> {
        vec![AppAction::HangUp, AppAction::Render]
    }

    /// Acknowledge the blocking alert.
    pub fn dismiss_alert(&mut self) -> Vec<AppAction> {
        self.alert = None;
        vec![AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Presented screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Blocking alert. `None` if nothing to acknowledge.
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Permission status.
    pub fn permissions(&self) -> PermissionView {
        self.permissions
    }

    /// Caller name used for simulated incoming calls.
    pub fn caller(&self) -> &str {
        &self.caller
    }

    /// Caller number used for simulated incoming calls.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
