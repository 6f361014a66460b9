//! Timing configuration shared by the polling waiters.

use std::time::Duration;

/// Default overall timeout for [`expect`](super::expect).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default polling interval for [`expect`](super::expect).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default polling interval for [`PredicateExpectation`](super::PredicateExpectation).
pub const PREDICATE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll intervals below this are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long to wait and how often to look.
///
/// # Example
///
/// ```rust
/// use async_expectations::assertions::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::eventually()
///     .timeout(Duration::from_secs(3))
///     .poll_interval(Duration::from_millis(50));
///
/// assert_eq!(config.timeout, Duration::from_secs(3));
/// assert_eq!(config.poll_interval, Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Overall time budget.
    pub timeout: Duration,
    /// Time between two evaluations.
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::eventually()
    }
}

impl PollConfig {
    /// Fine-grained polling: 1s timeout, 10ms interval.
    #[must_use]
    pub const fn eventually() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Coarse polling: 1s interval. The timeout is supplied per wait.
    #[must_use]
    pub const fn predicate() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: PREDICATE_POLL_INTERVAL,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval, raised to [`MIN_POLL_INTERVAL`] if smaller.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }
}
