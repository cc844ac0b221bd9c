//! Native call-management setup options.
//!
//! Serialized in camelCase so a platform bridge can forward the payload to
//! the native integration unchanged.

use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Configuration passed once to the native `setup` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupOptions {
    /// iOS (CallKit) options.
    pub ios: IosOptions,
    /// Android (ConnectionService) options.
    pub android: AndroidOptions,
}

/// iOS-specific setup options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosOptions {
    /// Application name shown in the system call UI.
    pub app_name: String,
}

/// Android-specific setup options.
///
/// The alert strings describe the phone-account settings dialog shown when
/// the user has to enable the app's calling account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidOptions {
    /// Settings dialog title.
    pub alert_title: String,
    /// Settings dialog rationale.
    pub alert_description: String,
    /// Settings dialog cancel label.
    pub cancel_button: String,
    /// Settings dialog confirm label.
    pub ok_button: String,
    /// Icon resource for the phone account.
    pub image_name: String,
    /// Extra platform capabilities to request.
    #[serde(default)]
    pub additional_permissions: Vec<String>,
    /// Application declares call activation and termination itself.
    #[serde(default)]
    pub self_managed: bool,
    /// Foreground service kept alive while a call is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_service: Option<ForegroundService>,
}

/// Persistent notification descriptor for self-managed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForegroundService {
    /// Notification channel identifier.
    pub channel_id: String,
    /// Notification channel name.
    pub channel_name: String,
    /// Notification title.
    pub notification_title: String,
    /// Notification icon resource.
    pub notification_icon: String,
    /// Foreground service type.
    #[serde(rename = "foregroundServiceType")]
    pub service_type: String,
}

impl Default for ForegroundService {
    fn default() -> Self {
        Self {
            channel_id: "com.callslot".into(),
            channel_name: "VoIP Calls".into(),
            notification_title: "Ongoing Call".into(),
            notification_icon: "ic_active_call".into(),
            service_type: "microphone".into(),
        }
    }
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            ios: IosOptions { app_name: "My app name".into() },
            android: AndroidOptions {
                alert_title: "Permissions required".into(),
                alert_description: "This application needs to access your phone accounts".into(),
                cancel_button: "Cancel".into(),
                ok_button: "Ok".into(),
                image_name: "phone_account_icon".into(),
                additional_permissions: Vec::new(),
                self_managed: false,
                foreground_service: None,
            },
        }
    }
}

impl SetupOptions {
    /// Default options with self-managed mode and a foreground service.
    pub fn self_managed() -> Self {
        Self::default().with_self_managed(ForegroundService::default())
    }

    /// Set the application display name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.ios.app_name = app_name.into();
        self
    }

    /// Request self-managed mode with the given foreground service.
    #[must_use]
    pub fn with_self_managed(mut self, service: ForegroundService) -> Self {
        self.android.self_managed = true;
        self.android.foreground_service = Some(service);
        self
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CallError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| CallError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options are usable by the native layer.
    pub fn validate(&self) -> Result<(), CallError> {
        if self.ios.app_name.trim().is_empty() {
            return Err(CallError::InvalidOptions("app name must not be empty".into()));
        }
        if self.android.foreground_service.is_some() && !self.android.self_managed {
            return Err(CallError::InvalidOptions(
                "foreground service requires self-managed mode".into(),
            ));
        }
        Ok(())
    }
}
