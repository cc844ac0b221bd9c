//! Terminal UI for the call slot coordinator
//!
//! A thin shell over [`callslot_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`callslot_app::Runtime`].
//!
//! This crate handles terminal rendering and hosts the in-process loopback
//! that plays the platform's native call layer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod loopback;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use callslot_app::{
    Alert, App, AppAction, AppEvent, Bridge, Driver, KeyInput, PermissionView, Runtime, Screen,
};
pub use loopback::{LoopbackError, LoopbackNative};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
