/*!
 * Single-slot pending timer.
 *
 * A controller owns exactly one `TimerSlot` for delayed stage transitions.
 * Arming replaces whatever was pending, and a timer only fires while the
 * stage that armed it is still current, so a transition can never land in a
 * stage that has already been left.
 */

use std::time::Duration;

use super::stage::Stage;

/// An outstanding delayed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    /// Stage that armed the timer
    pub owner: Stage,
    /// Stage to enter when it fires
    pub target: Stage,
    /// Session time at which it becomes due
    pub deadline: Duration,
}

#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<PendingTimer>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending timer
    pub fn arm(&mut self, owner: Stage, target: Stage, deadline: Duration) {
        self.pending = Some(PendingTimer { owner, target, deadline });
    }

    /// Cancel the pending timer, returning it if there was one
    pub fn cancel(&mut self) -> Option<PendingTimer> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingTimer> {
        self.pending.as_ref()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|timer| timer.deadline)
    }

    /// Take the timer if it is due at `now` and still owned by `current`.
    ///
    /// A due timer owned by another stage is discarded.
    pub fn take_due(&mut self, now: Duration, current: Stage) -> Option<PendingTimer> {
        let timer = self.pending?;
        if timer.deadline > now {
            return None;
        }
        self.pending = None;
        (timer.owner == current).then_some(timer)
    }
}
