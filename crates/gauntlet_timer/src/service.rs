//! Timer scheduler

use gauntlet_core::EntityId;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Opaque token for one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer that came due during [`TimerService::advance`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerFired<T> {
    /// Entity that scheduled the timer
    pub owner: EntityId,
    /// Event tag
    pub tag: T,
    /// Handle of the timer that fired
    pub handle: TimerHandle,
    /// Scheduler time at which it was due
    pub due: f64,
}

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    owner: EntityId,
    tag: T,
    due: f64,
    period: Option<f64>,
    seq: u64,
}

/// Schedules tagged events for entities.
///
/// The clock is kept in `f64` so long sessions do not drift cooldown
/// windows.
#[derive(Debug)]
pub struct TimerService<T> {
    now: f64,
    next_handle: u64,
    next_seq: u64,
    pending: HashMap<TimerHandle, PendingTimer<T>>,
    by_key: HashMap<(EntityId, T), TimerHandle>,
}

impl<T> TimerService<T>
where
    T: Copy + Eq + Hash + fmt::Debug,
{
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 0,
            next_seq: 0,
            pending: HashMap::new(),
            by_key: HashMap::new(),
        }
    }

    /// Current scheduler time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Fire `tag` for `owner` once, `delay` seconds from now
    pub fn schedule_once(&mut self, owner: EntityId, delay: f32, tag: T) -> TimerHandle {
        self.insert(owner, tag, delay.max(0.0) as f64, None)
    }

    /// Fire `tag` for `owner` every `period` seconds, first after one period.
    ///
    /// Returns `None` for a non-positive period.
    pub fn schedule_repeating(&mut self, owner: EntityId, period: f32, tag: T) -> Option<TimerHandle> {
        if period.is_nan() || period <= 0.0 {
            log::warn!("Rejected repeating timer {:?} for {} with period {}", tag, owner, period);
            return None;
        }
        Some(self.insert(owner, tag, period as f64, Some(period as f64)))
    }

    fn insert(&mut self, owner: EntityId, tag: T, delay: f64, period: Option<f64>) -> TimerHandle {
        // Same owner and tag restarts the timer
        if let Some(previous) = self.by_key.remove(&(owner, tag)) {
            self.pending.remove(&previous);
        }

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let seq = self.next_seq;
        self.next_seq += 1;

        self.pending.insert(
            handle,
            PendingTimer {
                owner,
                tag,
                due: self.now + delay,
                period,
                seq,
            },
        );
        self.by_key.insert((owner, tag), handle);
        handle
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.remove(&handle) {
            Some(timer) => {
                self.by_key.remove(&(timer.owner, timer.tag));
                true
            }
            None => false,
        }
    }

    /// Cancel the pending timer for `(owner, tag)`
    pub fn cancel_tag(&mut self, owner: EntityId, tag: T) -> bool {
        match self.by_key.remove(&(owner, tag)) {
            Some(handle) => self.pending.remove(&handle).is_some(),
            None => false,
        }
    }

    /// Cancel everything an entity has scheduled. Returns how many timers
    /// were dropped.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, timer| timer.owner != owner);
        self.by_key.retain(|(key_owner, _), _| *key_owner != owner);
        before - self.pending.len()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
        self.by_key.clear();
    }

    /// Whether a handle is still waiting to fire
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Whether `(owner, tag)` has a pending timer
    pub fn is_scheduled(&self, owner: EntityId, tag: T) -> bool {
        self.by_key.contains_key(&(owner, tag))
    }

    /// Seconds until a pending timer fires
    pub fn time_remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .get(&handle)
            .map(|timer| (timer.due - self.now).max(0.0) as f32)
    }

    /// Number of pending timers
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock by `dt` seconds and collect every timer that came
    /// due, earliest first.
    ///
    /// A repeating timer fires once for each period that elapsed, so a long
    /// frame does not swallow cannon shots or laser toggles.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerFired<T>> {
        let target = self.now + dt.max(0.0) as f64;
        let mut fired = Vec::new();

        loop {
            let next = self
                .pending
                .iter()
                .filter(|(_, timer)| timer.due <= target)
                .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                .map(|(handle, _)| *handle);

            let Some(handle) = next else { break };

            let Some(timer) = self.pending.get_mut(&handle) else { break };
            let due = timer.due;
            self.now = due;

            fired.push(TimerFired {
                owner: timer.owner,
                tag: timer.tag,
                handle,
                due,
            });

            match timer.period {
                Some(period) => {
                    timer.due += period;
                    timer.seq = self.next_seq;
                    self.next_seq += 1;
                }
                None => {
                    let key = (timer.owner, timer.tag);
                    self.pending.remove(&handle);
                    self.by_key.remove(&key);
                }
            }
        }

        self.now = target;
        fired
    }
}

impl<T> Default for TimerService<T>
where
    T: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
