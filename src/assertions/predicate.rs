//! Slow, coarse-grained predicate expectations.
//!
//! A [`PredicateExpectation`] evaluates its predicate once when the wait
//! starts and afterwards only on fixed ticks, one poll interval apart
//! (one second by default). A tick that would land after the timeout is
//! never evaluated. With the default interval any timeout under a second
//! can only succeed if the predicate already holds at the start, however
//! early the condition actually becomes true.
//!
//! ```rust
//! use async_expectations::assertions::PredicateExpectation;
//! use async_expectations::clock::MockClock;
//! use async_expectations::toggle::DelayedToggle;
//! use std::time::Duration;
//!
//! let clock = MockClock::auto_advancing();
//! let sut = DelayedToggle::new(clock.clone());
//! let expectation = PredicateExpectation::new(sut.predicate()).with_time_source(clock.clone());
//!
//! sut.schedule_toggle(Duration::from_millis(100));
//!
//! // The flag flips at 100ms but nobody looks again before 1s.
//! let short = futures::executor::block_on(expectation.wait(Duration::from_millis(900)));
//! assert!(short.is_err());
//! ```

use std::time::Duration;

use tracing::{debug, trace};

use super::config::PollConfig;
use crate::error::{Error, Result};
use crate::runtime::{TimeSource, TokioTime};

/// An expectation fulfilled once a predicate returns `true`.
pub struct PredicateExpectation<F, T = TokioTime> {
    predicate: F,
    time: T,
    poll_interval: Duration,
    description: String,
}

impl<F> PredicateExpectation<F, TokioTime>
where
    F: Fn() -> bool,
{
    /// Create an expectation on `predicate`, timed with Tokio.
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            time: TokioTime::new(),
            poll_interval: PollConfig::predicate().poll_interval,
            description: "predicate".to_string(),
        }
    }
}

impl<F, T> PredicateExpectation<F, T>
where
    F: Fn() -> bool,
    T: TimeSource,
{
    /// Poll against a different clock.
    #[must_use]
    pub fn with_time_source<U: TimeSource>(self, time: U) -> PredicateExpectation<F, U> {
        PredicateExpectation {
            predicate: self.predicate,
            time,
            poll_interval: self.poll_interval,
            description: self.description,
        }
    }

    /// Change the distance between two evaluations.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = PollConfig::predicate().poll_interval(interval).poll_interval;
        self
    }

    /// Name used in the timeout error.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The current poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait up to `timeout` for the predicate to hold.
    ///
    /// The expectation can be waited on more than once; every wait starts
    /// its own tick schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no evaluation within `timeout` saw the
    /// predicate hold. The wait always lasts the full timeout in that case.
    pub async fn wait(&self, timeout: Duration) -> Result<()> {
        let start = self.time.now();
        let deadline = start.saturating_add(timeout);
        let mut tick = start;
        let mut evaluations = 0;

        loop {
            evaluations += 1;
            let fulfilled = (self.predicate)();
            trace!(description = %self.description, evaluations, fulfilled, "evaluated predicate");
            if fulfilled {
                debug!(description = %self.description, evaluations, "predicate expectation fulfilled");
                return Ok(());
            }

            // A saturated tick equals the deadline, so stop once it was evaluated.
            let next = tick.saturating_add(self.poll_interval);
            if tick >= deadline || next > deadline {
                self.time.sleep_until(deadline).await;
                debug!(description = %self.description, ?timeout, evaluations, "predicate expectation timed out");
                return Err(Error::timeout(self.description.clone(), timeout, evaluations));
            }
            tick = next;
            self.time.sleep_until(tick).await;
        }
    }
}
