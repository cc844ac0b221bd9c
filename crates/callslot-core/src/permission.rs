//! Permission gate.
//!
//! Obtains the OS authorizations required before any call UI may be used,
//! then hands off to the one-time native setup. Like the coordinator it is a
//! pure state machine: it returns [`GateAction`]s and never touches the OS.

use std::{collections::BTreeMap, fmt};

use crate::{error::CallError, options::SetupOptions};

/// OS capability required for call handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    /// Telephony control.
    CallPhone,
    /// Microphone capture.
    RecordAudio,
    /// Read access to the device phone numbers.
    ReadPhoneNumbers,
    /// User-visible notifications.
    PostNotifications,
}

impl Permission {
    /// Every capability the gate knows about.
    pub const ALL: [Self; 4] =
        [Self::CallPhone, Self::RecordAudio, Self::ReadPhoneNumbers, Self::PostNotifications];

    /// Platform permission name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CallPhone => "CALL_PHONE",
            Self::RecordAudio => "RECORD_AUDIO",
            Self::ReadPhoneNumbers => "READ_PHONE_NUMBERS",
            Self::PostNotifications => "POST_NOTIFICATIONS",
        }
    }

    /// Parse a platform permission name (case-insensitive, `-` or `_`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.name() == normalized)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single capability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Capability granted.
    Granted,
    /// Capability denied; the OS may ask again.
    Denied,
    /// Capability denied permanently; only the settings screen can grant it.
    NeverAskAgain,
}

/// Per-capability results of a batch request.
pub type PermissionResults = BTreeMap<Permission, PermissionStatus>;

/// Instructions produced by the gate for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Ask the OS for these capabilities in one batch.
    RequestPermissions(Vec<Permission>),
    /// Initialize the native call-management integration.
    Setup(SetupOptions),
}

/// Gate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Nothing requested yet, or the last attempt failed.
    Idle,
    /// Batch request in flight.
    Requesting,
    /// All capabilities granted and setup issued.
    Ready,
}

/// Permission gate state machine.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    permissions: Vec<Permission>,
    options: SetupOptions,
    state: GateState,
}

impl PermissionGate {
    /// Gate requesting every known capability.
    pub fn new(options: SetupOptions) -> Self {
        Self::with_permissions(options, Permission::ALL.to_vec())
    }

    /// Gate requesting a specific batch.
    pub fn with_permissions(options: SetupOptions, permissions: Vec<Permission>) -> Self {
        Self { permissions, options, state: GateState::Idle }
    }

    /// Start the permission flow.
    ///
    /// Returns no actions if setup already happened or a request is in
    /// flight.
    pub fn acquire(&mut self) -> Vec<GateAction> {
        match self.state {
            GateState::Ready | GateState::Requesting => {
                tracing::debug!(state = ?self.state, "permission acquire ignored");
                vec![]
            },
            GateState::Idle => {
                self.state = GateState::Requesting;
                vec![GateAction::RequestPermissions(self.permissions.clone())]
            },
        }
    }

    /// Process the OS response to the batch request.
    ///
    /// Succeeds only if every requested capability is granted. A capability
    /// missing from `results` counts as denied. Setup is issued at most once:
    /// a ready gate never requests again.
    pub fn handle_results(
        &mut self,
        results: &PermissionResults,
    ) -> Result<Vec<GateAction>, CallError> {
        if self.state != GateState::Requesting {
            tracing::debug!(state = ?self.state, "permission results without pending request");
            return Ok(vec![]);
        }

        let denied: Vec<Permission> = self
            .permissions
            .iter()
            .copied()
            .filter(|p| results.get(p) != Some(&PermissionStatus::Granted))
            .collect();

        if !denied.is_empty() {
            self.state = GateState::Idle;
            tracing::warn!(?denied, "call permissions denied");
            return Err(CallError::PermissionDenied { denied });
        }

        tracing::info!("all call permissions granted");
        self.state = GateState::Ready;
        Ok(vec![GateAction::Setup(self.options.clone())])
    }

    /// The OS permission request failed before producing results.
    pub fn handle_request_failed(&mut self, reason: impl Into<String>) -> CallError {
        let reason = reason.into();
        tracing::warn!(%reason, "permission request failed");
        self.state = GateState::Idle;
        CallError::PermissionRequest(reason)
    }

    /// Current gate state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether native setup has been issued.
    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Capabilities requested in each batch.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_granted(permissions: &[Permission]) -> PermissionResults {
        permissions.iter().map(|p| (*p, PermissionStatus::Granted)).collect()
    }

    #[test]
    fn acquire_requests_full_batch() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let actions = gate.acquire();

        assert_eq!(actions, vec![GateAction::RequestPermissions(Permission::ALL.to_vec())]);
        assert_eq!(gate.state(), GateState::Requesting);
    }

    #[test]
    fn all_granted_issues_setup_once() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let _ = gate.acquire();

        let actions = gate.handle_results(&all_granted(&Permission::ALL)).expect("granted");
        assert!(matches!(actions.as_slice(), [GateAction::Setup(_)]));
        assert!(gate.is_ready());

        // Ready gate ignores further acquisition
        assert!(gate.acquire().is_empty());
    }

    #[test]
    fn single_denial_fails_batch() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let _ = gate.acquire();

        let mut results = all_granted(&Permission::ALL);
        results.insert(Permission::RecordAudio, PermissionStatus::NeverAskAgain);

        let err = gate.handle_results(&results).unwrap_err();
        assert_eq!(err, CallError::PermissionDenied { denied: vec![Permission::RecordAudio] });
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn missing_result_counts_as_denied() {
        let mut gate = PermissionGate::with_permissions(SetupOptions::default(), vec![
            Permission::CallPhone,
            Permission::RecordAudio,
        ]);
        let _ = gate.acquire();

        let results = all_granted(&[Permission::CallPhone]);
        assert!(matches!(gate.handle_results(&results), Err(CallError::PermissionDenied { .. })));
    }

    #[test]
    fn user_can_retry_after_denial() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let _ = gate.acquire();
        let _ = gate.handle_results(&PermissionResults::new());

        assert!(matches!(gate.acquire().as_slice(), [GateAction::RequestPermissions(_)]));
    }

    #[test]
    fn request_failure_resets_gate() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let _ = gate.acquire();

        let err = gate.handle_request_failed("activity destroyed");
        assert!(matches!(err, CallError::PermissionRequest(_)));
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn results_without_request_are_ignored() {
        let mut gate = PermissionGate::new(SetupOptions::default());
        let actions = gate.handle_results(&all_granted(&Permission::ALL)).expect("no-op");
        assert!(actions.is_empty());
        assert!(!gate.is_ready());
    }

    #[test]
    fn permission_names_round_trip() {
        assert_eq!(Permission::from_name("record-audio"), Some(Permission::RecordAudio));
        assert_eq!(Permission::from_name("CALL_PHONE"), Some(Permission::CallPhone));
        assert_eq!(Permission::from_name("camera"), None);
    }
}
