//! Timer queue and the mock sleep future.

use pin_project::pin_project;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use super::MockClock;
use crate::runtime::Callback;

/// What happens when an entry's deadline is reached.
enum Wakeup {
    /// A parked [`MockSleep`]; its waker lives in [`SleepState::wakers`].
    Sleep,
    /// A callback handed to [`Scheduler::schedule_after`](crate::runtime::Scheduler::schedule_after).
    Callback(Callback),
}

impl fmt::Debug for Wakeup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sleep => f.write_str("Sleep"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A pending entry in the timer queue.
#[derive(Debug)]
struct TimerEntry {
    deadline: Duration,
    wakeup: Wakeup,
    /// Insertion order; breaks deadline ties
    id: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse order for min-heap behavior (earliest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Internal state for pending sleeps and scheduled callbacks.
///
/// Removing a sleep only forgets its waker. The heap entry stays behind as a
/// tombstone and is discarded once it reaches the top.
#[derive(Debug)]
pub(crate) struct SleepState {
    pending: BinaryHeap<TimerEntry>,
    /// Live sleeps by id; `None` until first polled
    wakers: HashMap<u64, Option<Waker>>,
    callbacks: usize,
    next_id: u64,
}

impl SleepState {
    pub(crate) fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            wakers: HashMap::new(),
            callbacks: 0,
            next_id: 0,
        }
    }

    fn push(&mut self, deadline: Duration, wakeup: Wakeup) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(TimerEntry {
            deadline,
            wakeup,
            id,
        });
        id
    }

    /// Register a sleep and return its ID
    fn register(&mut self, deadline: Duration) -> u64 {
        let id = self.push(deadline, Wakeup::Sleep);
        self.wakers.insert(id, None);
        id
    }

    /// Queue a callback to run once time reaches `deadline`.
    pub(crate) fn schedule(&mut self, deadline: Duration, callback: Callback) -> u64 {
        self.callbacks += 1;
        self.push(deadline, Wakeup::Callback(callback))
    }

    /// Update the waker for a sleep.
    ///
    /// A sleep that already fired but was not ready when polled again (the
    /// clock was set back) is queued anew under the same id.
    fn update_waker(&mut self, id: u64, deadline: Duration, waker: &Waker) {
        if let Some(slot) = self.wakers.get_mut(&id) {
            if !slot.as_ref().is_some_and(|current| current.will_wake(waker)) {
                *slot = Some(waker.clone());
            }
            return;
        }
        self.pending.push(TimerEntry {
            deadline,
            wakeup: Wakeup::Sleep,
            id,
        });
        self.wakers.insert(id, Some(waker.clone()));
    }

    /// Remove every entry whose deadline has passed.
    ///
    /// Parked sleeps are woken in place. Callbacks are handed back in
    /// deadline order so the caller can run them without holding the lock.
    #[must_use]
    pub(crate) fn take_expired(&mut self, current_time: Duration) -> Vec<Callback> {
        let mut due = Vec::new();
        while self
            .pending
            .peek()
            .is_some_and(|entry| entry.deadline <= current_time)
        {
            let Some(entry) = self.pending.pop() else {
                break;
            };
            match entry.wakeup {
                Wakeup::Sleep => {
                    if let Some(Some(waker)) = self.wakers.remove(&entry.id) {
                        waker.wake();
                    }
                }
                Wakeup::Callback(callback) => {
                    self.callbacks -= 1;
                    due.push(callback);
                }
            }
        }
        self.discard_tombstones();
        due
    }

    /// Remove a sleep entry
    fn remove(&mut self, id: u64) {
        if self.wakers.remove(&id).is_some() {
            self.discard_tombstones();
        }
    }

    fn discard_tombstones(&mut self) {
        while self.pending.peek().is_some_and(|entry| {
            matches!(entry.wakeup, Wakeup::Sleep) && !self.wakers.contains_key(&entry.id)
        }) {
            self.pending.pop();
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.wakers.len() + self.callbacks
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.pending.peek().map(|entry| entry.deadline)
    }
}

/// A future that completes when virtual time advances past its deadline.
///
/// Created by [`MockClock::sleep`].
#[pin_project(PinnedDrop)]
#[derive(Debug)]
pub struct MockSleep {
    clock: MockClock,
    deadline: Duration,
    id: u64,
    registered: bool,
}

impl MockSleep {
    pub(crate) fn new(clock: MockClock, duration: Duration) -> Self {
        let deadline = clock.now().saturating_add(duration);
        Self {
            clock,
            deadline,
            id: 0,
            registered: false,
        }
    }

    /// Returns the deadline for this sleep.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Returns the remaining time until this sleep completes.
    ///
    /// Returns `Duration::ZERO` if the deadline has already passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_sub(self.clock.now())
    }

    /// Returns `true` if this sleep has completed.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        self.clock.now() >= self.deadline
    }
}

impl Future for MockSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if !*this.registered {
            let mut sleeps = this.clock.inner.sleeps.lock();
            *this.id = sleeps.register(*this.deadline);
            *this.registered = true;
        }

        let mut sleeps = this.clock.inner.sleeps.lock();
        if this.clock.now() >= *this.deadline {
            sleeps.remove(*this.id);
            *this.registered = false;
            Poll::Ready(())
        } else {
            sleeps.update_waker(*this.id, *this.deadline, cx.waker());
            Poll::Pending
        }
    }
}

#[pin_project::pinned_drop]
impl PinnedDrop for MockSleep {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if *this.registered {
            this.clock.inner.sleeps.lock().remove(*this.id);
        }
    }
}
