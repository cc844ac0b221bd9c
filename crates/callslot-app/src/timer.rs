//! Recurring duration timer.

use std::{ops::Sub, time::Duration};

use callslot_core::CallId;

/// Recurring timer bound to one active call.
///
/// Owned by the runtime between the coordinator's start and cancel requests.
/// Dropping the value cancels the timer; there is nothing to release.
#[derive(Debug)]
pub struct DurationTimer<I> {
    id: CallId,
    period: Duration,
    last_fired: I,
}

impl<I> DurationTimer<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Start a timer for `id` firing every `period` from `now`.
    pub fn start(id: CallId, period: Duration, now: I) -> Self {
        Self { id, period, last_fired: now }
    }

    /// Fire if a full period elapsed since the last firing.
    ///
    /// Returns the session id the tick belongs to.
    pub fn poll(&mut self, now: I) -> Option<CallId> {
        if now < self.last_fired || now - self.last_fired < self.period {
            return None;
        }

        self.last_fired = now;
        Some(self.id.clone())
    }

    /// Session the timer was started for.
    pub fn id(&self) -> &CallId {
        &self.id
    }

    /// Firing period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<I> Drop for DurationTimer<I> {
    fn drop(&mut self) {
        tracing::trace!(id = %self.id, "duration timer released");
    }
}
