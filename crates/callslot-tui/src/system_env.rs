//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` drives the coordinator with the real monotonic clock and OS
//! randomness. Call identifiers generated from it are not reproducible,
//! which is what a running frontend wants.

use std::time::Duration;

use callslot_core::Environment;

/// Production environment using system time and OS randomness.
///
/// Uses `std::time::Instant::now()` for time, `tokio::time::sleep()` for async
/// sleeping, and getrandom for random call identifiers.
///
/// # Panics
///
/// Panics if the OS RNG fails. Without randomness no call identifier can be
/// generated, and the failure indicates an OS-level problem.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG failure is unrecoverable");
    }
}
