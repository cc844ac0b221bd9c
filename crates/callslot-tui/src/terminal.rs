//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The native call layer is the
//! in-process [`LoopbackNative`].

use std::{
    collections::BTreeSet,
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use callslot_app::{App, AppEvent, Driver, KeyInput, Screen, Subscription};
use callslot_core::{
    CallId, NativeCommand, NativeEvent, NativeEventKind, Permission, PermissionResults,
    PermissionStatus,
};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{
    loopback::{LoopbackError, LoopbackNative},
    ui,
};

/// Key that simulates the remote party hanging up.
const REMOTE_HANG_UP_KEY: char = 'x';

/// Keys acting on the simulated OS incoming-call UI while a call rings there.
const SYSTEM_ANSWER_KEY: char = 'a';
const SYSTEM_DECLINE_KEY: char = 'r';

/// UI frame; the longest [`TerminalDriver::poll_event`] waits.
const FRAME: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Native call layer error.
    #[error("native layer error: {0}")]
    Native(#[from] LoopbackError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui) and the loopback
/// native layer. Permission prompts are answered from the `--deny` set.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    native: LoopbackNative,
    denied: BTreeSet<Permission>,
    /// Call shown on screen; target of a simulated remote hang-up.
    on_screen: Option<CallId>,
    /// Call ringing on the OS incoming-call UI.
    ringing: Option<CallId>,
    /// Last rendered state, redrawn on resize.
    last_frame: Option<App>,
}

impl TerminalDriver {
    /// Enter the alternate screen and start the native layer.
    ///
    /// Permissions in `denied` are refused whenever requested.
    pub fn new(
        native: LoopbackNative,
        denied: BTreeSet<Permission>,
    ) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self {
            terminal,
            event_stream,
            native,
            denied,
            on_screen: None,
            ringing: None,
            last_frame: None,
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            _ => None,
        }
    }

    /// Keys meant for the simulated platform never reach the app.
    fn handle_key(&mut self, key: KeyInput) -> Result<Option<AppEvent>, TerminalError> {
        match (key, self.ringing.clone()) {
            (KeyInput::Char(REMOTE_HANG_UP_KEY), _) => match self.on_screen.clone() {
                Some(id) => self.native.remote_hang_up(id)?,
                None => tracing::debug!("remote hang-up without a call on screen"),
            },
            (KeyInput::Char(SYSTEM_ANSWER_KEY), Some(id)) => self.native.answer(id)?,
            (KeyInput::Char(SYSTEM_DECLINE_KEY), Some(id)) => self.native.decline(id)?,
            (key, _) => return Ok(Some(AppEvent::Key(key))),
        }
        Ok(None)
    }

    fn redraw(&mut self) -> Result<(), TerminalError> {
        if let Some(app) = &self.last_frame {
            self.terminal.draw(|frame| ui::render(frame, app))?;
        }
        Ok(())
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        match Self::convert_key(key_event.code) {
                            Some(key) => self.handle_key(key),
                            None => Ok(None),
                        }
                    },
                    Some(Ok(Event::Resize(..))) => {
                        self.redraw()?;
                        Ok(None)
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(FRAME) => {
                Ok(Some(AppEvent::Tick))
            }
        }
    }

    async fn request_permissions(
        &mut self,
        permissions: &[Permission],
    ) -> Result<PermissionResults, Self::Error> {
        let results: PermissionResults = permissions
            .iter()
            .map(|&permission| {
                let status = if self.denied.contains(&permission) {
                    PermissionStatus::Denied
                } else {
                    PermissionStatus::Granted
                };
                (permission, status)
            })
            .collect();
        tracing::debug!(?results, "permission prompt answered");
        Ok(results)
    }

    fn invoke(&mut self, command: NativeCommand) -> Result<(), Self::Error> {
        Ok(self.native.invoke(command)?)
    }

    fn poll_native_event(&mut self) -> Option<NativeEvent> {
        self.native.try_recv()
    }

    fn subscribe(&mut self, kind: NativeEventKind) -> Result<Subscription, Self::Error> {
        Ok(self.native.subscribe(kind)?)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.native.unsubscribe(&subscription);
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.on_screen = match app.screen() {
            Screen::Home => None,
            Screen::Incoming { id, .. }
            | Screen::Ringing { id, .. }
            | Screen::Ongoing { id, .. } => Some(id.clone()),
        };
        self.ringing = match app.screen() {
            Screen::Ringing { id, .. } => Some(id.clone()),
            _ => None,
        };
        self.last_frame = Some(app.clone());
        self.redraw()
    }

    fn stop(&mut self) {
        self.native.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
