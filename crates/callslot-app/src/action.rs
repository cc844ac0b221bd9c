//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Run the permission gate.
    RequestPermissions,

    /// Simulate an incoming-call signal.
    SimulateIncoming {
        /// Caller display name.
        caller: String,
        /// Caller number.
        phone_number: String,
    },

    /// Accept the ringing call.
    Accept,

    /// Reject the ringing call.
    Reject,

    /// Hang up the active call.
    HangUp,
}
