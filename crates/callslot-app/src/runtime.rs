//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Bridge to the coordinator and permission gate
//! - [`Driver`]: Platform-specific I/O
//!
//! It also owns the scoped resources of a session: the native event
//! [`Subscriptions`] and the [`DurationTimer`] of the active call. Both are
//! released on teardown, including when the runtime is dropped early.

use callslot_core::Environment;

use crate::{
    App, AppAction, AppEvent, Bridge, Driver, DurationTimer, Subscriptions, TimerRequest,
};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and call identifiers
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
    subscriptions: Subscriptions,
    timer: Option<DurationTimer<D::Instant>>,
    torn_down: bool,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime from a driver, the view model and the bridge.
    pub fn new(driver: D, app: App, bridge: Bridge<E>) -> Self {
        Self {
            driver,
            app,
            bridge,
            subscriptions: Subscriptions::new(),
            timer: None,
            torn_down: false,
        }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Registers the native event listeners and runs the permission gate
    /// 2. Polls for input events from the driver
    /// 3. Drains native events from the call layer
    /// 4. Services the duration timer and the coordinator tick
    /// 5. Dispatches native commands through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error or the native
    /// layer rejects a command.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.subscriptions.register_all(&mut self.driver)?;
        self.driver.render(&self.app)?;

        let should_quit = self.process_actions(vec![AppAction::RequestPermissions]).await?;
        if !should_quit {
            loop {
                if self.process_cycle().await? {
                    break;
                }
            }
        }

        self.teardown();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while let Some(event) = self.driver.poll_native_event() {
            if !self.subscriptions.is_subscribed(event.kind()) {
                tracing::debug!(kind = event.kind().name(), "native event without listener");
                continue;
            }

            let events = self.bridge.handle_native_event(event);
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        if let Some(id) = self.timer.as_mut().and_then(|timer| timer.poll(now)) {
            let events = self.bridge.handle_duration_tick(id, now);
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let events = self.bridge.handle_tick(now);
        if self.process_bridge_events(events).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Call operations go through the bridge
                    AppAction::RequestPermissions
                    | AppAction::SimulateIncoming { .. }
                    | AppAction::Accept
                    | AppAction::Reject
                    | AppAction::HangUp => {
                        let mut events = self.bridge.process_app_action(action);
                        events.extend(self.flush().await?);
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        let mut events = events;
        events.extend(self.flush().await?);

        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute everything the bridge accumulated.
    ///
    /// Permission results can issue native setup, so this repeats until the
    /// bridge has nothing left. Returns the events produced along the way.
    async fn flush(&mut self) -> Result<Vec<AppEvent>, D::Error> {
        let mut events = Vec::new();

        loop {
            let commands = self.bridge.take_outgoing();
            let timer_requests = self.bridge.take_timer_requests();
            let permission_requests = self.bridge.take_permission_requests();
            if commands.is_empty() && timer_requests.is_empty() && permission_requests.is_empty()
            {
                return Ok(events);
            }

            for command in commands {
                tracing::debug!(?command, "native command");
                self.driver.invoke(command)?;
            }

            for request in timer_requests {
                self.apply_timer_request(request);
            }

            for permissions in permission_requests {
                match self.driver.request_permissions(&permissions).await {
                    Ok(results) => events.extend(self.bridge.handle_permission_results(&results)),
                    Err(e) => events.extend(self.bridge.handle_permission_failure(e.to_string())),
                }
            }
        }
    }

    fn apply_timer_request(&mut self, request: TimerRequest) {
        match request {
            TimerRequest::Start { id, period } => {
                if let Some(previous) = self.timer.take() {
                    tracing::warn!(
                        id = %previous.id(),
                        period = ?previous.period(),
                        "duration timer replaced"
                    );
                }
                tracing::debug!(%id, ?period, "duration timer started");
                self.timer = Some(DurationTimer::start(id, period, self.driver.now()));
            },
            TimerRequest::Cancel { id } => {
                if self.timer.as_ref().is_some_and(|timer| timer.id() == &id) {
                    tracing::debug!(%id, "duration timer cancelled");
                    self.timer = None;
                } else {
                    tracing::debug!(%id, "cancel for inactive duration timer");
                }
            },
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Release subscriptions and the duration timer, then stop the driver.
    ///
    /// Idempotent.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.timer = None;
        self.subscriptions.release_all(&mut self.driver);
        self.driver.stop();
    }
}

impl<D, E> Drop for Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
