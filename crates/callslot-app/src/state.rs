//! Observable application state types.
//!
//! These structures serve as the "View Model" for the application: the
//! screen currently presented, the blocking alert, and the permission status.
//! They contain what a frontend needs to render without exposing the
//! coordinator's internals.

use std::time::Duration;

use callslot_core::CallId;

/// Screen currently presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Idle screen with the "simulate incoming call" button.
    Home,
    /// Incoming-call modal with accept and reject.
    Incoming {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },
    /// Home with a banner for a call ringing on the OS incoming-call UI.
    Ringing {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
    },
    /// Ongoing-call screen with the running duration.
    Ongoing {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller: String,
        /// Displayed duration.
        elapsed: Duration,
    },
}

impl Screen {
    /// Short name for logs and status lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Incoming { .. } => "incoming",
            Self::Ringing { .. } => "ringing",
            Self::Ongoing { .. } => "ongoing",
        }
    }
}

/// Blocking notice acknowledged with Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub message: String,
}

/// Permission status as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionView {
    /// Not requested yet.
    Unknown,
    /// Request in flight.
    Requesting,
    /// Every capability granted.
    Granted,
    /// Last request failed.
    Denied,
}
