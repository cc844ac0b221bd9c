//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use callslot_core::{NativeCommand, NativeEvent, NativeEventKind, Permission, PermissionResults};

use crate::{App, AppEvent, Subscription};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: Uses crossterm for terminal events and an in-process loopback
///   for the native call layer
/// - **Simulation**: Scripted input, virtual time and an auto-confirming
///   native layer
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next input event.
    ///
    /// Waits at most one UI frame. Returns `None` if no event is ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Ask the OS for a batch of capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be made at all. A denial
    /// is a result, not an error.
    fn request_permissions(
        &mut self,
        permissions: &[Permission],
    ) -> impl Future<Output = Result<PermissionResults, Self::Error>> + Send;

    /// Dispatch a command to the native call layer.
    ///
    /// Fire-and-forget: success only means the command was handed over. Its
    /// effect is observed through a later [`NativeEvent`].
    ///
    /// # Errors
    ///
    /// Returns an error if the native layer is gone.
    fn invoke(&mut self, command: NativeCommand) -> Result<(), Self::Error>;

    /// Take the next pending native event without waiting.
    ///
    /// Returns `None` if nothing is pending.
    fn poll_native_event(&mut self) -> Option<NativeEvent>;

    /// Register a native event listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the native layer refuses the listener.
    fn subscribe(&mut self, kind: NativeEventKind) -> Result<Subscription, Self::Error>;

    /// Release a native event listener.
    fn unsubscribe(&mut self, subscription: Subscription);

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the driver and clean up resources.
    fn stop(&mut self);
}
