//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard) and system ticks.
//! - Call notifications translated by the [`crate::Bridge`] from coordinator
//!   and permission gate actions.

use std::time::Duration;

use callslot_core::{CallId, EndReason};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Permission request sent to the OS.
    PermissionsRequested,

    /// Every capability granted, native setup issued.
    PermissionsGranted,

    /// Permission batch failed.
    PermissionsDenied {
        /// Alert title.
        title: String,
        /// Alert body.
        message: String,
    },

    /// Incoming-call modal shown.
    IncomingShown {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Incoming-call modal hidden.
    IncomingHidden,

    /// Call ringing on the OS incoming-call UI.
    Ringing {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Ongoing-call screen shown.
    OngoingShown {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },

    /// Ongoing-call screen hidden.
    OngoingHidden,

    /// Displayed call duration changed.
    ElapsedChanged {
        /// Time since the call became active.
        elapsed: Duration,
    },

    /// Call reached its terminal state.
    CallEnded {
        /// Session identifier.
        id: CallId,
        /// Why the call ended.
        reason: EndReason,
    },

    /// Notice that must be acknowledged.
    Notice {
        /// Alert title.
        title: String,
        /// Alert body.
        message: String,
    },
}
