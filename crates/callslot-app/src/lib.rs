//! Application layer for callslot
//!
//! Pure state machines and generic runtime for UI and call orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (screens, alerts, key handling)
//! - [`Bridge`]: Call bridge (translates App actions to coordinator events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`Subscriptions`] / [`DurationTimer`]: scoped native listeners and the
//!   active call's timer

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod runtime;
mod state;
mod subscription;
mod timer;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TimerRequest};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::{Alert, PermissionView, Screen};
pub use subscription::{Subscription, Subscriptions};
pub use timer::DurationTimer;
