// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync scheduling as a pure state machine.
//!
//! The scheduler owns no timers. The engine feeds it events with the
//! current instant, asks for the next deadline to sleep until, and asks
//! which action is due. That keeps the debounce and polling rules testable
//! without sleeping.

use std::time::Duration;
use tokio::time::Instant;

/// Work the engine should perform now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Pull,
    Push,
}

#[derive(Debug, Clone)]
pub struct SyncScheduler {
    debounce: Duration,
    poll_interval: Duration,
    /// Credentials are present; timers are armed only while true.
    active: bool,
    /// Local changes not yet pushed.
    dirty: bool,
    /// Immediate pull requested at this instant (credential acquisition).
    pull_requested: Option<Instant>,
    push_at: Option<Instant>,
    next_poll: Option<Instant>,
}

impl SyncScheduler {
    pub fn new(debounce: Duration, poll_interval: Duration) -> Self {
        Self {
            debounce,
            poll_interval,
            active: false,
            dirty: false,
            pull_requested: None,
            push_at: None,
            next_poll: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Login or token restore: pull immediately, then poll on the interval.
    pub fn on_credentials_acquired(&mut self, now: Instant) {
        self.active = true;
        self.pull_requested = Some(now);
        self.next_poll = Some(now + self.poll_interval);
        if self.dirty {
            self.push_at = Some(now + self.debounce);
        }
    }

    /// Logout or hard auth failure: cancel every pending timer.
    ///
    /// The dirty flag survives so edits made while signed out are pushed
    /// after the next login.
    pub fn on_credentials_lost(&mut self) {
        self.active = false;
        self.pull_requested = None;
        self.push_at = None;
        self.next_poll = None;
    }

    /// A local edit (re)starts the debounce window.
    pub fn on_local_mutation(&mut self, now: Instant) {
        self.dirty = true;
        if self.active {
            self.push_at = Some(now + self.debounce);
        }
    }

    /// The earliest instant something becomes due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.active {
            return None;
        }
        if self.pull_requested.is_some() {
            return self.pull_requested;
        }
        match (self.push_at, self.next_poll) {
            (Some(push), Some(poll)) => Some(push.min(poll)),
            (push, poll) => push.or(poll),
        }
    }

    /// Take the next due action, updating internal state as if it started.
    ///
    /// A pull never runs over unpushed edits: a due push is preferred over a
    /// due poll, and a poll tick that arrives while edits are still inside
    /// their debounce window pushes them right away instead of pulling.
    pub fn take_due(&mut self, now: Instant) -> Option<SyncAction> {
        if !self.active {
            return None;
        }
        if self.pull_requested.take().is_some() {
            return Some(SyncAction::Pull);
        }
        if self.push_at.is_some_and(|at| at <= now) {
            self.push_at = None;
            return Some(SyncAction::Push);
        }
        if self.next_poll.is_some_and(|at| at <= now) {
            self.next_poll = Some(now + self.poll_interval);
            if self.dirty {
                self.push_at = None;
                return Some(SyncAction::Push);
            }
            return Some(SyncAction::Pull);
        }
        None
    }

    /// A push is starting with the current snapshot. Edits arriving while it
    /// is in flight mark the scheduler dirty again.
    pub fn begin_push(&mut self) {
        self.dirty = false;
    }

    /// Record how a push ended.
    ///
    /// Either way the next poll moves one interval out, so a push isn't
    /// immediately chased by a pull. A soft failure keeps the changes dirty
    /// and retries at that next tick, once per tick.
    pub fn on_push_finished(&mut self, now: Instant, succeeded: bool) {
        if !self.active {
            return;
        }
        self.next_poll = Some(now + self.poll_interval);
        if !succeeded {
            self.dirty = true;
            let retry = now + self.poll_interval;
            self.push_at = Some(self.push_at.map_or(retry, |at| at.min(retry)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_secs(2);
    const POLL: Duration = Duration::from_secs(30);

    fn scheduler() -> SyncScheduler {
        SyncScheduler::new(DEBOUNCE, POLL)
    }

    #[test]
    fn test_inactive_scheduler_does_nothing() {
        let mut s = scheduler();
        let now = Instant::now();
        s.on_local_mutation(now);

        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.take_due(now + POLL * 2), None);
        assert!(s.is_dirty());
    }

    #[test]
    fn test_credentials_trigger_immediate_pull() {
        let mut s = scheduler();
        let now = Instant::now();
        s.on_credentials_acquired(now);

        assert!(s.next_deadline().unwrap() <= now);
        assert_eq!(s.take_due(now), Some(SyncAction::Pull));
        assert_eq!(s.take_due(now), None);
        assert_eq!(s.next_deadline(), Some(now + POLL));
    }

    #[test]
    fn test_rapid_mutations_coalesce_into_one_push() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);

        for i in 0..5 {
            s.on_local_mutation(start + Duration::from_millis(500 * i));
        }
        let last = start + Duration::from_millis(2000);

        assert_eq!(s.take_due(last + DEBOUNCE - Duration::from_millis(1)), None);
        assert_eq!(s.take_due(last + DEBOUNCE), Some(SyncAction::Push));
        s.begin_push();
        assert_eq!(s.take_due(last + DEBOUNCE), None);
    }

    #[test]
    fn test_interval_poll() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);

        assert_eq!(s.take_due(start + POLL), Some(SyncAction::Pull));
        assert_eq!(s.next_deadline(), Some(start + POLL * 2));
    }

    #[test]
    fn test_due_push_runs_before_due_poll() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);
        s.on_local_mutation(start + POLL - DEBOUNCE);

        let later = start + POLL + Duration::from_secs(1);
        assert_eq!(s.take_due(later), Some(SyncAction::Push));
        s.begin_push();
        assert_eq!(s.take_due(later), Some(SyncAction::Pull));
    }

    #[test]
    fn test_poll_tick_pushes_pending_edits_instead_of_pulling() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);
        s.on_local_mutation(start + Duration::from_secs(29));

        // Debounce would fire at 31s; the 30s poll must not pull first.
        let tick = start + POLL;
        assert_eq!(s.take_due(tick), Some(SyncAction::Push));
        s.begin_push();
        assert_eq!(s.take_due(tick), None);

        s.on_push_finished(tick, true);
        assert!(!s.is_dirty());
        assert_eq!(s.take_due(start + Duration::from_secs(31)), None);
        assert_eq!(s.take_due(tick + POLL), Some(SyncAction::Pull));
    }

    #[test]
    fn test_failing_pushes_retry_once_per_tick() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);
        s.on_local_mutation(start);

        let mut now = start + DEBOUNCE;
        for _ in 0..3 {
            assert_eq!(s.take_due(now), Some(SyncAction::Push));
            s.begin_push();
            s.on_push_finished(now, false);
            assert_eq!(s.take_due(now), None);
            assert_eq!(s.next_deadline(), Some(now + POLL));
            now += POLL;
        }
    }

    #[test]
    fn test_successful_push_postpones_poll() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);
        s.on_local_mutation(start + Duration::from_secs(27));

        let pushed = start + Duration::from_secs(29);
        assert_eq!(s.take_due(pushed), Some(SyncAction::Push));
        s.begin_push();
        s.on_push_finished(pushed, true);

        assert_eq!(s.take_due(start + POLL), None);
        assert_eq!(s.next_deadline(), Some(pushed + POLL));
    }

    #[test]
    fn test_failed_push_retries_on_next_tick_not_immediately() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.take_due(start);
        s.on_local_mutation(start);

        let pushed = start + DEBOUNCE;
        assert_eq!(s.take_due(pushed), Some(SyncAction::Push));
        s.begin_push();
        s.on_push_finished(pushed, false);

        assert!(s.is_dirty());
        assert_eq!(s.take_due(pushed + Duration::from_secs(1)), None);
        assert_eq!(s.take_due(pushed + POLL), Some(SyncAction::Push));
    }

    #[test]
    fn test_credential_loss_cancels_timers_and_keeps_dirty() {
        let mut s = scheduler();
        let start = Instant::now();
        s.on_credentials_acquired(start);
        s.on_local_mutation(start);
        s.on_credentials_lost();

        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.take_due(start + POLL), None);
        assert!(s.is_dirty());

        let relogin = start + POLL;
        s.on_credentials_acquired(relogin);
        assert_eq!(s.take_due(relogin), Some(SyncAction::Pull));
        assert_eq!(s.take_due(relogin + DEBOUNCE), Some(SyncAction::Push));
    }
}
