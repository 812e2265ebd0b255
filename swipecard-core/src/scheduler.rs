//! Timer abstraction.
//!
//! The carousel never sleeps. It asks a [`Scheduler`] to fire a
//! [`TimerKind`] after a delay and is told about expiry through
//! `SwipeCarousel::on_timer`. Each kind has at most one live token; arming a
//! kind again cancels the previous token, and expiries carrying a stale
//! token are dropped.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Deferred work the carousel can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Grace period between render and the reconciliation sweep.
    Reconcile,
    /// Autoplay countdown.
    Autoplay,
    /// Rebuild after a conditional entity changed.
    ConditionalDebounce,
    /// Re-enable smooth scrolling on the next frame.
    RestoreSmoothing,
    /// Reset the remote signal when no settle event arrives.
    RemoteSettleFallback,
}

impl TimerKind {
    /// Name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            TimerKind::Reconcile => "reconcile",
            TimerKind::Autoplay => "autoplay",
            TimerKind::ConditionalDebounce => "conditional_debounce",
            TimerKind::RestoreSmoothing => "restore_smoothing",
            TimerKind::RemoteSettleFallback => "remote_settle_fallback",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one scheduled expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Backend for deferred work. Expiries are delivered to
/// [`SwipeCarousel::on_timer`](crate::SwipeCarousel::on_timer) with the token
/// returned here.
pub trait Scheduler {
    /// Deliver `kind` after `delay`.
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerToken;
    /// Cancelling an unknown or already fired token is a no-op.
    fn cancel(&mut self, token: TimerToken);
}

/// Tracks the live token per timer kind.
#[derive(Debug, Default)]
pub struct TimerSlots {
    live: HashMap<TimerKind, TimerToken>,
}

impl TimerSlots {
    /// No live timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind`, cancelling whatever was pending for it.
    pub fn arm<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        kind: TimerKind,
        delay: Duration,
    ) -> TimerToken {
        if let Some(previous) = self.live.remove(&kind) {
            scheduler.cancel(previous);
        }
        let token = scheduler.schedule(kind, delay);
        self.live.insert(kind, token);
        token
    }

    /// Cancel the live timer of `kind`, if any.
    pub fn disarm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, kind: TimerKind) {
        if let Some(token) = self.live.remove(&kind) {
            scheduler.cancel(token);
        }
    }

    /// Consume the slot if `token` is the live one for `kind`.
    pub fn take_if_current(&mut self, kind: TimerKind, token: TimerToken) -> bool {
        if self.live.get(&kind) == Some(&token) {
            self.live.remove(&kind);
            true
        } else {
            false
        }
    }

    /// Cancel every live timer.
    pub fn cancel_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        for (_, token) in self.live.drain() {
            scheduler.cancel(token);
        }
    }

    /// Whether a timer of `kind` is live.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.live.contains_key(&kind)
    }
}

/// Virtual-clock scheduler. Nothing fires on its own; the owner advances
/// the clock and delivers due timers.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_token: u64,
    pending: BTreeMap<(Duration, TimerToken), TimerKind>,
}

impl ManualScheduler {
    /// Clock at zero, nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Timers not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether a timer of `kind` is waiting.
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.values().any(|pending| *pending == kind)
    }

    /// Remove the earliest timer due at or before `deadline` and move the
    /// clock to its expiry. Ties fire in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerKind, TimerToken)> {
        let (&(at, token), _) = self.pending.first_key_value()?;
        if at > deadline {
            return None;
        }
        let kind = self.pending.remove(&(at, token))?;
        self.now = self.now.max(at);
        Some((kind, token))
    }

    /// Move the clock without firing anything.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.pending.insert((self.now + delay, token), kind);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|(_, pending), _| *pending != token);
    }
}
