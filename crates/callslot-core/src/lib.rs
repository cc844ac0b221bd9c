//! Core state machines for a single call slot.
//!
//! Sans-IO building blocks shared by every frontend: the call lifecycle
//! [`Coordinator`], the [`PermissionGate`], and the types that make up the
//! boundary with the native call-management integration.
//!
//! # Architecture
//!
//! Both state machines follow the same action-based pattern. They receive
//! events, update their state, and return actions for the caller to execute.
//! Nothing here performs I/O, sleeps, or spawns; time and randomness come from
//! an [`Environment`] so simulation and production run identical logic.
//!
//! # Components
//!
//! - [`Coordinator`]: owns the [`CallSession`] and its transitions
//! - [`PermissionGate`]: batch permission request and one-time native setup
//! - [`NativeCommand`] / [`NativeEvent`]: native call-management boundary
//! - [`SetupOptions`]: payload of the native `setup` call

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod coordinator;
pub mod env;
pub mod error;
pub mod native;
pub mod options;
pub mod permission;
pub mod session;

pub use coordinator::{
    ANSWER_TIMEOUT, CallAction, CallEvent, Coordinator, CoordinatorConfig, DURATION_TICK,
    Presentation, RETIRED_ID_CAPACITY,
};
pub use env::Environment;
pub use error::CallError;
pub use native::{NativeCommand, NativeEvent, NativeEventKind};
pub use options::{AndroidOptions, ForegroundService, IosOptions, SetupOptions};
pub use permission::{
    GateAction, GateState, Permission, PermissionGate, PermissionResults, PermissionStatus,
};
pub use session::{CallId, CallSession, CallState, EndReason};
