//! In-process loopback native layer.
//!
//! Stands in for the platform call-management integration. Commands travel
//! over an mpsc channel to a tokio task that answers them the way a
//! self-managed platform integration would: `startCall` is confirmed with
//! `startCallAction` and `endCall` is echoed back as an `endCall` event, each
//! after a configurable delay.
//!
//! A call handed over with `displayIncomingCall` waits for the user to act
//! on the simulated OS incoming-call UI: [`LoopbackNative::answer`] delivers
//! `answerCall`, [`LoopbackNative::decline`] delivers `endCall`.
//!
//! Events are only handed out for kinds with a registered listener.

use std::{collections::BTreeMap, time::Duration};

use callslot_app::Subscription;
use callslot_core::{CallId, NativeCommand, NativeEvent, NativeEventKind};
use thiserror::Error;
use tokio::sync::mpsc;

/// Loopback native layer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoopbackError {
    /// Call command issued before `setup`.
    #[error("{0} called before setup")]
    NotSetUp(&'static str),

    /// Native task has stopped.
    #[error("native layer closed")]
    Closed,
}

/// Message to the native task.
#[derive(Debug)]
enum Request {
    Command(NativeCommand),
    /// Event raised by the platform itself, delivered without delay.
    Platform(NativeEvent),
}

/// Handle to a running loopback native layer.
pub struct LoopbackNative {
    requests: mpsc::UnboundedSender<Request>,
    events: mpsc::UnboundedReceiver<NativeEvent>,
    /// Live listener handle per kind.
    listeners: BTreeMap<NativeEventKind, u64>,
    next_handle: u64,
    set_up: bool,
    abort_handle: tokio::task::AbortHandle,
}

impl LoopbackNative {
    /// Spawn the native task, answering commands after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(delay: Duration) -> Self {
        let (requests, mut request_rx) = mpsc::unbounded_channel::<Request>();
        let (event_tx, events) = mpsc::unbounded_channel::<NativeEvent>();

        let handle = tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let event = match request {
                    Request::Command(command) => {
                        let Some(event) = confirmation(&command) else {
                            continue;
                        };
                        tokio::time::sleep(delay).await;
                        event
                    },
                    Request::Platform(event) => event,
                };

                tracing::trace!(kind = event.kind().name(), id = %event.call_id(), "native event");
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            requests,
            events,
            listeners: BTreeMap::new(),
            next_handle: 0,
            set_up: false,
            abort_handle: handle.abort_handle(),
        }
    }

    /// Hand a command to the native task.
    pub fn invoke(&mut self, command: NativeCommand) -> Result<(), LoopbackError> {
        match &command {
            NativeCommand::Setup(options) => {
                tracing::info!(
                    app_name = %options.ios.app_name,
                    self_managed = options.android.self_managed,
                    "native setup"
                );
                self.set_up = true;
            },
            other if !self.set_up => return Err(LoopbackError::NotSetUp(other.name())),
            _ => {},
        }

        tracing::debug!(command = command.name(), "native command");
        self.requests.send(Request::Command(command)).map_err(|_| LoopbackError::Closed)
    }

    /// Simulate the remote party ending call `id`.
    pub fn remote_hang_up(&self, id: CallId) -> Result<(), LoopbackError> {
        tracing::debug!(%id, "remote hang-up");
        self.platform(NativeEvent::EndCall { id })
    }

    /// Simulate the user answering call `id` on the OS incoming-call UI.
    pub fn answer(&self, id: CallId) -> Result<(), LoopbackError> {
        tracing::debug!(%id, "answered on system UI");
        self.platform(NativeEvent::AnswerCall { id })
    }

    /// Simulate the user declining call `id` on the OS incoming-call UI.
    pub fn decline(&self, id: CallId) -> Result<(), LoopbackError> {
        tracing::debug!(%id, "declined on system UI");
        self.platform(NativeEvent::EndCall { id })
    }

    fn platform(&self, event: NativeEvent) -> Result<(), LoopbackError> {
        self.requests.send(Request::Platform(event)).map_err(|_| LoopbackError::Closed)
    }

    /// Register a listener for `kind`.
    pub fn subscribe(&mut self, kind: NativeEventKind) -> Result<Subscription, LoopbackError> {
        if self.requests.is_closed() {
            return Err(LoopbackError::Closed);
        }

        self.next_handle += 1;
        if let Some(previous) = self.listeners.insert(kind, self.next_handle) {
            tracing::warn!(kind = kind.name(), previous, "listener replaced");
        }
        Ok(Subscription::new(kind, self.next_handle))
    }

    /// Release a listener. Stale handles are ignored.
    pub fn unsubscribe(&mut self, subscription: &Subscription) {
        if self.listeners.get(&subscription.kind()) == Some(&subscription.handle()) {
            self.listeners.remove(&subscription.kind());
        }
    }

    /// Take the next event with a registered listener, without waiting.
    pub fn try_recv(&mut self) -> Option<NativeEvent> {
        while let Ok(event) = self.events.try_recv() {
            if self.listeners.contains_key(&event.kind()) {
                return Some(event);
            }
            tracing::trace!(kind = event.kind().name(), "native event dropped without listener");
        }
        None
    }

    /// Stop the native task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for LoopbackNative {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Event the platform sends back for `command`, if any.
fn confirmation(command: &NativeCommand) -> Option<NativeEvent> {
    match command {
        NativeCommand::StartCall { id, .. } => {
            Some(NativeEvent::StartCallAction { id: id.clone() })
        },
        NativeCommand::EndCall { id } => Some(NativeEvent::EndCall { id: id.clone() }),
        NativeCommand::Setup(_)
        | NativeCommand::DisplayIncomingCall { .. }
        | NativeCommand::SetCurrentCallActive { .. } => None,
    }
}
