//! `MockClock` implementation for virtual time control.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::sleep::{MockSleep, SleepState};
use crate::runtime::{Callback, Scheduler, TimeSource};

/// A mock clock that provides virtual time control for async tests.
///
/// `MockClock` is both a [`TimeSource`] and a [`Scheduler`]. Callbacks
/// scheduled on it run when time is moved to or past their deadline, never
/// before, and never from inside `schedule_after` itself.
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned and shared across threads.
/// All clones share the same underlying time state.
///
/// # Example
///
/// ```rust
/// use async_expectations::clock::MockClock;
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now(), Duration::ZERO);
///
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(clock.now(), Duration::from_secs(10));
///
/// // Clone shares the same time
/// let clock2 = clock.clone();
/// clock2.advance(Duration::from_secs(5));
/// assert_eq!(clock.now(), Duration::from_secs(15));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    pub(crate) inner: Arc<ClockInner>,
}

#[derive(Debug)]
pub(crate) struct ClockInner {
    state: Mutex<ClockState>,
    /// Pending sleeps and scheduled callbacks
    pub(crate) sleeps: Mutex<SleepState>,
}

#[derive(Debug)]
struct ClockState {
    current_time: Duration,
    paused: bool,
    /// `TimeSource::sleep` moves time forward by itself
    auto_advance: bool,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new `MockClock` starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start_time(Duration::ZERO)
    }

    /// Creates a new `MockClock` starting at the specified time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use async_expectations::clock::MockClock;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::with_start_time(Duration::from_secs(100));
    /// assert_eq!(clock.now(), Duration::from_secs(100));
    /// ```
    #[must_use]
    pub fn with_start_time(start: Duration) -> Self {
        Self::build(start, false)
    }

    /// Creates a clock whose [`TimeSource::sleep`] advances time itself.
    ///
    /// A waiter that sleeps 10ms on this clock moves virtual time forward by
    /// 10ms and runs every callback that became due, so polling loops finish
    /// instantly and deterministically with no driver task.
    ///
    /// # Example
    ///
    /// ```rust
    /// use async_expectations::clock::MockClock;
    /// use async_expectations::runtime::TimeSource;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::auto_advancing();
    /// futures::executor::block_on(TimeSource::sleep(&clock, Duration::from_secs(3)));
    /// assert_eq!(clock.now(), Duration::from_secs(3));
    /// ```
    #[must_use]
    pub fn auto_advancing() -> Self {
        Self::build(Duration::ZERO, true)
    }

    fn build(start: Duration, auto_advance: bool) -> Self {
        Self {
            inner: Arc::new(ClockInner {
                state: Mutex::new(ClockState {
                    current_time: start,
                    paused: false,
                    auto_advance,
                }),
                sleeps: Mutex::new(SleepState::new()),
            }),
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.state.lock().current_time
    }

    /// Returns `true` if sleeping on this clock advances it.
    #[must_use]
    pub fn is_auto_advancing(&self) -> bool {
        self.inner.state.lock().auto_advance
    }

    /// Advances the clock by the specified duration.
    ///
    /// Pending sleeps whose deadline is reached are woken and scheduled
    /// callbacks that became due are run, in deadline order, on the calling
    /// thread. Time saturates at [`Duration::MAX`].
    ///
    /// # Panics
    ///
    /// Panics if the clock is paused.
    ///
    /// # Example
    ///
    /// ```rust
    /// use async_expectations::clock::MockClock;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::new();
    /// clock.advance(Duration::from_secs(10));
    /// clock.advance(Duration::from_millis(500));
    /// assert_eq!(clock.now(), Duration::from_millis(10_500));
    /// ```
    pub fn advance(&self, duration: Duration) {
        let new_time = {
            let mut state = self.inner.state.lock();
            assert!(!state.paused, "Cannot advance time while clock is paused");
            state.current_time = state.current_time.saturating_add(duration);
            state.current_time
        };
        self.fire_expired(new_time);
    }

    /// Sets the clock to an absolute time.
    ///
    /// Unlike `advance`, this allows setting time to any value,
    /// including values less than the current time. Moving backwards never
    /// un-fires a callback.
    ///
    /// # Panics
    ///
    /// Panics if the clock is paused.
    pub fn set(&self, time: Duration) {
        {
            let mut state = self.inner.state.lock();
            assert!(!state.paused, "Cannot set time while clock is paused");
            state.current_time = time;
        }
        self.fire_expired(time);
    }

    /// Advances the clock to a specific time.
    ///
    /// This method only moves time forward - if the specified time
    /// is less than or equal to the current time, this is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the clock is paused.
    pub fn advance_to(&self, time: Duration) {
        let new_time = {
            let mut state = self.inner.state.lock();
            assert!(!state.paused, "Cannot advance time while clock is paused");
            if time > state.current_time {
                state.current_time = time;
            }
            state.current_time
        };
        self.fire_expired(new_time);
    }

    /// Jumps to the earliest pending deadline, if any, and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the clock is paused.
    pub fn advance_to_next(&self) -> Option<Duration> {
        let next = self.inner.sleeps.lock().next_deadline()?;
        self.advance_to(next);
        Some(next)
    }

    /// Pauses the clock, preventing time from advancing.
    ///
    /// While paused, calls to `advance`, `set`, or `advance_to` will panic
    /// and sleeps on an auto-advancing clock wait like on a manual one.
    pub fn pause(&self) {
        self.inner.state.lock().paused = true;
    }

    /// Resumes a paused clock.
    pub fn resume(&self) {
        self.inner.state.lock().paused = false;
    }

    /// Returns whether the clock is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.state.lock().paused
    }

    /// Creates a sleep future that completes when virtual time advances past its deadline.
    ///
    /// The sleep never moves time itself; some other party has to call
    /// [`advance`](Self::advance).
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> MockSleep {
        MockSleep::new(self.clone(), duration)
    }

    /// Returns the number of pending sleeps and scheduled callbacks.
    ///
    /// Sleeps are registered when first polled, not when created.
    ///
    /// ```rust
    /// use async_expectations::clock::MockClock;
    /// use async_expectations::runtime::Scheduler;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::new();
    /// clock.schedule_after(Duration::from_secs(1), Box::new(|| {}));
    /// assert_eq!(clock.pending_count(), 1);
    ///
    /// clock.advance(Duration::from_secs(1));
    /// assert_eq!(clock.pending_count(), 0);
    /// ```
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.sleeps.lock().pending_count()
    }

    fn fire_expired(&self, now: Duration) {
        // Collected under the lock, run after it is released so a callback
        // may schedule more work on this clock.
        let due = self.inner.sleeps.lock().take_expired(now);
        if !due.is_empty() {
            trace!(?now, count = due.len(), "running due callbacks");
        }
        for callback in due {
            callback();
        }
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Duration {
        MockClock::now(self)
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let auto = {
            let state = self.inner.state.lock();
            state.auto_advance && !state.paused
        };
        if auto {
            Box::pin(async move { self.advance(duration) })
        } else {
            Box::pin(MockClock::sleep(self, duration))
        }
    }
}

impl Scheduler for MockClock {
    fn schedule_after(&self, delay: Duration, callback: Callback) {
        let deadline = self.now().saturating_add(delay);
        trace!(?delay, ?deadline, "scheduling callback on mock clock");
        self.inner.sleeps.lock().schedule(deadline, callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let callback: Callback = Box::new(move || {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_new_clock_starts_at_zero() {
        let clock = MockClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        assert!(!clock.is_auto_advancing());
    }

    #[test]
    fn test_advance() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), Duration::from_secs(10));

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), Duration::from_secs(15));
    }

    #[test]
    fn test_advance_saturates() {
        let clock = MockClock::with_start_time(Duration::from_secs(1));
        clock.advance(Duration::MAX);
        assert_eq!(clock.now(), Duration::MAX);
    }

    #[test]
    fn test_set_can_go_backwards() {
        let clock = MockClock::new();
        clock.set(Duration::from_secs(100));
        clock.set(Duration::from_secs(50));
        assert_eq!(clock.now(), Duration::from_secs(50));
    }

    #[test]
    fn test_advance_to_only_moves_forward() {
        let clock = MockClock::new();
        clock.advance_to(Duration::from_secs(10));
        clock.advance_to(Duration::from_secs(5));
        assert_eq!(clock.now(), Duration::from_secs(10));
    }

    #[test]
    #[should_panic(expected = "Cannot advance time while clock is paused")]
    fn test_advance_while_paused_panics() {
        let clock = MockClock::new();
        clock.pause();
        clock.advance(Duration::from_secs(1));
    }

    #[test]
    #[should_panic(expected = "Cannot set time while clock is paused")]
    fn test_set_while_paused_panics() {
        let clock = MockClock::new();
        clock.pause();
        clock.set(Duration::from_secs(1));
    }

    #[test]
    fn test_scheduled_callback_fires_at_deadline_not_before() {
        let clock = MockClock::new();
        let (count, callback) = counter();

        clock.schedule_after(Duration::from_millis(100), callback);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_millis(99));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(10));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_delay_waits_for_next_advance() {
        let clock = MockClock::new();
        let (count, callback) = counter();

        clock.schedule_after(Duration::ZERO, callback);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        clock.advance(Duration::ZERO);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_advance_to_next() {
        let clock = MockClock::new();
        let (count, callback) = counter();
        assert_eq!(clock.advance_to_next(), None);

        clock.schedule_after(Duration::from_millis(250), callback);
        assert_eq!(clock.advance_to_next(), Some(Duration::from_millis(250)));
        assert_eq!(clock.now(), Duration::from_millis(250));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_can_reschedule() {
        let clock = MockClock::new();
        let (count, callback) = counter();

        let clock2 = clock.clone();
        clock.schedule_after(
            Duration::from_secs(1),
            Box::new(move || clock2.schedule_after(Duration::from_secs(1), callback)),
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(clock.pending_count(), 1);

        clock.advance(Duration::from_secs(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_auto_advancing_sleep_moves_time() {
        let clock = MockClock::auto_advancing();
        let (count, callback) = counter();
        clock.schedule_after(Duration::from_millis(100), callback);

        futures::executor::block_on(TimeSource::sleep(&clock, Duration::from_millis(60)));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        futures::executor::block_on(TimeSource::sleep_until(&clock, Duration::from_millis(120)));
        assert_eq!(clock.now(), Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::thread;

        let clock = MockClock::new();
        let clock2 = clock.clone();

        let handle = thread::spawn(move || {
            for _ in 0..1000 {
                clock2.advance(Duration::from_millis(1));
            }
        });

        for _ in 0..1000 {
            clock.advance(Duration::from_millis(1));
        }

        handle.join().unwrap();
        assert_eq!(clock.now(), Duration::from_millis(2000));
    }
}
