//! Native call-management boundary.
//!
//! Commands flow from the coordinator to the platform integration and are
//! fire-and-forget. Their outcome is only ever observed through a later
//! [`NativeEvent`].

use crate::{options::SetupOptions, session::CallId};

/// Call kind passed to `displayIncomingCall`.
pub const HANDLE_TYPE_GENERIC: &str = "generic";

/// Commands sent to the native call-management integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCommand {
    /// One-time initialization of the integration.
    Setup(SetupOptions),

    /// Ask the OS to show its own incoming-call UI.
    DisplayIncomingCall {
        /// Session identifier.
        id: CallId,
        /// Caller display name.
        caller_name: String,
        /// Caller number.
        number: String,
        /// Handle kind (`"generic"`, `"number"`, `"email"`).
        handle_type: String,
        /// Whether the call offers video.
        has_video: bool,
    },

    /// Originate or accept the call under the app's management.
    StartCall {
        /// Session identifier.
        id: CallId,
        /// Number to dial.
        number: String,
        /// Caller display name.
        caller_name: String,
    },

    /// Terminate the call.
    EndCall {
        /// Session identifier.
        id: CallId,
    },

    /// Declare the call connected (required in self-managed mode).
    SetCurrentCallActive {
        /// Session identifier.
        id: CallId,
    },
}

impl NativeCommand {
    /// Method name on the native integration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::DisplayIncomingCall { .. } => "displayIncomingCall",
            Self::StartCall { .. } => "startCall",
            Self::EndCall { .. } => "endCall",
            Self::SetCurrentCallActive { .. } => "setCurrentCallActive",
        }
    }

    /// Session the command refers to. `None` for setup.
    pub fn call_id(&self) -> Option<&CallId> {
        match self {
            Self::Setup(_) => None,
            Self::DisplayIncomingCall { id, .. }
            | Self::StartCall { id, .. }
            | Self::EndCall { id }
            | Self::SetCurrentCallActive { id } => Some(id),
        }
    }
}

/// Events delivered by the native call-management integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// User answered through the native UI.
    AnswerCall {
        /// Session identifier.
        id: CallId,
    },

    /// Call ended, for any cause.
    EndCall {
        /// Session identifier.
        id: CallId,
    },

    /// Native layer is ready for the app to mark the call active.
    StartCallAction {
        /// Session identifier.
        id: CallId,
    },
}

impl NativeEvent {
    /// Session the event refers to.
    pub fn call_id(&self) -> &CallId {
        match self {
            Self::AnswerCall { id } | Self::EndCall { id } | Self::StartCallAction { id } => id,
        }
    }

    /// Subscription kind that delivers this event.
    pub fn kind(&self) -> NativeEventKind {
        match self {
            Self::AnswerCall { .. } => NativeEventKind::AnswerCall,
            Self::EndCall { .. } => NativeEventKind::EndCall,
            Self::StartCallAction { .. } => NativeEventKind::StartCallAction,
        }
    }
}

/// Native event channels an application can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeEventKind {
    /// `answerCall`
    AnswerCall,
    /// `endCall`
    EndCall,
    /// `startCallAction` (platform-specific custom event)
    StartCallAction,
}

impl NativeEventKind {
    /// Every kind the coordinator consumes.
    pub const ALL: [Self; 3] = [Self::AnswerCall, Self::EndCall, Self::StartCallAction];

    /// Event name as exposed by the native integration.
    pub fn name(self) -> &'static str {
        match self {
            Self::AnswerCall => "answerCall",
            Self::EndCall => "endCall",
            Self::StartCallAction => "startCallAction",
        }
    }
}
