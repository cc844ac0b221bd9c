//! Error types for the call slot.
//!
//! Only conditions that are not absorbed by the coordinator show up here.
//! Stale events and actions issued in the wrong state are normal race
//! outcomes and never become errors.

use thiserror::Error;

use crate::permission::Permission;

/// Alert title shown when the permission batch is not fully granted.
pub const PERMISSIONS_ALERT_TITLE: &str = "Permissions Required";

/// Alert body shown when the permission batch is not fully granted.
pub const PERMISSIONS_ALERT_MESSAGE: &str =
    "You must grant all permissions to use call functionality.";

/// Errors raised by the permission gate and the native boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// At least one requested capability was not granted.
    #[error("permissions denied: {denied:?}")]
    PermissionDenied {
        /// Capabilities that were not granted.
        denied: Vec<Permission>,
    },

    /// The OS permission request itself failed.
    #[error("permission request failed: {0}")]
    PermissionRequest(String),

    /// The native call-management layer raised a fault.
    #[error("native layer fault: {0}")]
    Native(String),

    /// Setup options could not be parsed or are inconsistent.
    #[error("invalid setup options: {0}")]
    InvalidOptions(String),
}

impl CallError {
    /// Returns true if the user can recover by re-triggering the flow.
    ///
    /// Permission failures are terminal for the current attempt only; the
    /// user may grant the capabilities and try again. Native faults and bad
    /// options are not recoverable from inside the app.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::PermissionRequest(_))
    }

    /// User-facing alert `(title, message)` for this error, if any.
    pub fn alert(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::PermissionDenied { .. } | Self::PermissionRequest(_) => {
                Some((PERMISSIONS_ALERT_TITLE, PERMISSIONS_ALERT_MESSAGE))
            },
            Self::Native(_) | Self::InvalidOptions(_) => None,
        }
    }
}
