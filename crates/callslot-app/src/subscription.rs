//! Native event subscriptions.
//!
//! The native layer only delivers events for kinds that have a live
//! [`Subscription`]. [`Subscriptions`] tracks them for one runtime: each kind
//! is registered at most once and every registration is released on teardown.

use std::collections::BTreeMap;

use callslot_core::NativeEventKind;

use crate::Driver;

/// Handle to one registered native event listener.
///
/// Issued by [`Driver::subscribe`] and handed back to
/// [`Driver::unsubscribe`] to release it.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    kind: NativeEventKind,
    handle: u64,
}

impl Subscription {
    /// Create a handle for a listener the driver registered.
    pub fn new(kind: NativeEventKind, handle: u64) -> Self {
        Self { kind, handle }
    }

    /// Event kind the listener receives.
    pub fn kind(&self) -> NativeEventKind {
        self.kind
    }

    /// Driver-assigned listener handle.
    pub fn handle(&self) -> u64 {
        self.handle
    }
}

/// Registry of live subscriptions, one per event kind.
#[derive(Debug, Default)]
pub struct Subscriptions {
    active: BTreeMap<NativeEventKind, Subscription>,
}

impl Subscriptions {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`.
    ///
    /// Returns `false` without touching the driver if `kind` is already
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the listener cannot be registered.
    pub fn register<D: Driver>(
        &mut self,
        driver: &mut D,
        kind: NativeEventKind,
    ) -> Result<bool, D::Error> {
        if self.active.contains_key(&kind) {
            tracing::warn!(kind = kind.name(), "duplicate native subscription refused");
            return Ok(false);
        }

        let subscription = driver.subscribe(kind)?;
        tracing::debug!(kind = kind.name(), handle = subscription.handle(), "subscribed");
        self.active.insert(kind, subscription);
        Ok(true)
    }

    /// Register a listener for every kind the coordinator consumes.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. Kinds registered before the failure
    /// stay registered and are released by [`Self::release_all`].
    pub fn register_all<D: Driver>(&mut self, driver: &mut D) -> Result<(), D::Error> {
        for kind in NativeEventKind::ALL {
            self.register(driver, kind)?;
        }
        Ok(())
    }

    /// Whether events of `kind` are currently delivered.
    pub fn is_subscribed(&self, kind: NativeEventKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Release every registered listener.
    pub fn release_all<D: Driver>(&mut self, driver: &mut D) {
        for (kind, subscription) in std::mem::take(&mut self.active) {
            tracing::debug!(kind = kind.name(), handle = subscription.handle(), "unsubscribed");
            driver.unsubscribe(subscription);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no subscription is live.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
