//! Fine-grained "eventually" expectations.
//!
//! [`expect`] wraps a value source (any `Fn() -> V`) and polls it every
//! [`DEFAULT_POLL_INTERVAL`](super::config::DEFAULT_POLL_INTERVAL) until a
//! [`Matcher`] is satisfied or the timeout runs out.
//!
//! The source is called at arbitrary frequency, so it must not have side
//! effects.

use std::fmt::Debug;
use std::time::Duration;

use tracing::{debug, trace};

use super::config::PollConfig;
use super::matcher::Matcher;
use crate::error::{Error, Result};
use crate::runtime::{TimeSource, TokioTime};

/// Start an expectation on a value source, timed with Tokio.
///
/// # Example
///
/// ```rust
/// use async_expectations::assertions::{expect, matcher::be_true};
/// use async_expectations::clock::MockClock;
/// use async_expectations::toggle::DelayedToggle;
/// use std::time::Duration;
///
/// let clock = MockClock::auto_advancing();
/// let sut = DelayedToggle::new(clock.clone());
/// sut.schedule_toggle(Duration::from_millis(100));
///
/// let outcome = futures::executor::block_on(
///     expect(|| sut.read()).with_time_source(clock).to_eventually(be_true()),
/// );
/// assert!(outcome.is_ok());
/// ```
pub fn expect<F, V>(source: F) -> Expectation<F, TokioTime>
where
    F: Fn() -> V,
{
    Expectation {
        source,
        time: TokioTime::new(),
        config: PollConfig::eventually(),
    }
}

/// A pending expectation built by [`expect`].
#[must_use = "expectations do nothing until one of the `to_*` methods is awaited"]
pub struct Expectation<F, T = TokioTime> {
    source: F,
    time: T,
    config: PollConfig,
}

/// How a polling run ended.
enum Polled<V> {
    /// The stop condition held for this value.
    Stopped(V, usize),
    /// Time ran out; the last value seen.
    TimedOut(V, usize),
}

impl<F, V, T> Expectation<F, T>
where
    F: Fn() -> V,
    V: Debug,
    T: TimeSource,
{
    /// Poll against a different clock.
    pub fn with_time_source<U: TimeSource>(self, time: U) -> Expectation<F, U> {
        Expectation {
            source: self.source,
            time,
            config: self.config,
        }
    }

    /// Set the overall timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the time between evaluations.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.poll_interval(interval);
        self
    }

    /// Replace the whole timing configuration.
    pub fn config(mut self, config: PollConfig) -> Self {
        self.config = config.poll_interval(config.poll_interval);
        self
    }

    /// The timing this expectation will use.
    pub fn poll_config(&self) -> PollConfig {
        self.config
    }

    /// Wait until the value matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] if the value still does not match
    /// when the timeout is reached.
    pub async fn to_eventually<M: Matcher<V>>(self, matcher: M) -> Result<()> {
        match self.poll(|value| matcher.matches(value)).await {
            Polled::Stopped(_, evaluations) => {
                debug!(evaluations, expected = %matcher.describe(), "expectation met");
                Ok(())
            }
            Polled::TimedOut(value, evaluations) => Err(Error::assertion_failed(format!(
                "expected to eventually {}, got {:?} after {:?} ({} evaluations): {}",
                matcher.describe(),
                value,
                self.config.timeout,
                evaluations,
                matcher.describe_mismatch(&value),
            ))),
        }
    }

    /// Wait until the value stops matching.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] if the value still matches when the
    /// timeout is reached.
    pub async fn to_eventually_not<M: Matcher<V>>(self, matcher: M) -> Result<()> {
        match self.poll(|value| !matcher.matches(value)).await {
            Polled::Stopped(_, evaluations) => {
                debug!(evaluations, rejected = %matcher.describe(), "expectation met");
                Ok(())
            }
            Polled::TimedOut(value, evaluations) => Err(Error::assertion_failed(format!(
                "expected to eventually not {}, got {:?} after {:?} ({} evaluations)",
                matcher.describe(),
                value,
                self.config.timeout,
                evaluations,
            ))),
        }
    }

    /// Check that the value never matches for the whole timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] as soon as the value matches.
    pub async fn to_never<M: Matcher<V>>(self, matcher: M) -> Result<()> {
        match self.poll(|value| matcher.matches(value)).await {
            Polled::Stopped(value, evaluations) => Err(Error::assertion_failed(format!(
                "expected to never {}, got {:?} on evaluation {}",
                matcher.describe(),
                value,
                evaluations,
            ))),
            Polled::TimedOut(_, evaluations) => {
                debug!(evaluations, rejected = %matcher.describe(), "never matched");
                Ok(())
            }
        }
    }

    /// Evaluate the source until `stop` holds or the deadline passes.
    ///
    /// The source is always evaluated at least once and once more at the
    /// deadline itself.
    async fn poll(&self, stop: impl Fn(&V) -> bool) -> Polled<V> {
        let deadline = self.time.now().saturating_add(self.config.timeout);
        let mut evaluations = 0;
        loop {
            let value = (self.source)();
            evaluations += 1;
            trace!(evaluations, ?value, "evaluated expectation");
            if stop(&value) {
                return Polled::Stopped(value, evaluations);
            }

            let now = self.time.now();
            if now >= deadline {
                return Polled::TimedOut(value, evaluations);
            }
            let next = now.saturating_add(self.config.poll_interval).min(deadline);
            self.time.sleep_until(next).await;
        }
    }
}

/// Await an eventually-expectation and panic if it fails.
///
/// Must be used inside an async context.
///
/// # Example
///
/// ```rust
/// use async_expectations::assert_eventually;
/// use async_expectations::assertions::matcher::be_true;
///
/// # async fn run() {
/// let ready = std::sync::atomic::AtomicBool::new(true);
/// assert_eventually!(ready.load(std::sync::atomic::Ordering::SeqCst), be_true());
/// # }
/// ```
#[macro_export]
macro_rules! assert_eventually {
    ($value:expr, $matcher:expr) => {{
        if let Err(err) = $crate::assertions::expect(|| $value)
            .to_eventually($matcher)
            .await
        {
            panic!("{}", err);
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        if let Err(err) = $crate::assertions::expect(|| $value)
            .to_eventually($matcher)
            .await
        {
            panic!("{}: {}", err, format_args!($($arg)+));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::matcher::{be_false, be_true, equal};
    use crate::clock::MockClock;
    use crate::toggle::DelayedToggle;
    use std::cell::Cell;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        futures::executor::block_on(future)
    }

    #[test]
    fn test_already_matching_evaluates_once() {
        let calls = Cell::new(0);
        let clock = MockClock::auto_advancing();
        let result = block_on(
            expect(|| {
                calls.set(calls.get() + 1);
                true
            })
            .with_time_source(clock.clone())
            .to_eventually(be_true()),
        );

        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_to_eventually_waits_for_toggle() {
        let clock = MockClock::auto_advancing();
        let sut = DelayedToggle::new(clock.clone());
        sut.schedule_toggle(Duration::from_millis(100));

        let result = block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .to_eventually(be_true()),
        );

        assert!(result.is_ok());
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_to_eventually_times_out() {
        let clock = MockClock::auto_advancing();
        let sut = DelayedToggle::new(clock.clone());
        sut.schedule_toggle(Duration::from_secs(5));

        let err = block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .timeout(Duration::from_millis(300))
                .poll_interval(Duration::from_millis(100))
                .to_eventually(be_true()),
        )
        .unwrap_err();

        assert_eq!(clock.now(), Duration::from_millis(300));
        let message = err.to_string();
        assert!(message.contains("expected to eventually be true"), "{message}");
        assert!(message.contains("(4 evaluations)"), "{message}");
    }

    #[test]
    fn test_to_eventually_not() {
        let clock = MockClock::auto_advancing();
        let sut = DelayedToggle::new(clock.clone());
        sut.schedule_toggle(Duration::from_millis(40));
        sut.schedule_toggle(Duration::from_millis(80));

        block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .to_eventually(be_true()),
        )
        .unwrap();
        block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .to_eventually_not(be_true()),
        )
        .unwrap();

        assert_eq!(clock.now(), Duration::from_millis(80));
        assert_eq!(sut.flip_count(), 2);
    }

    #[test]
    fn test_to_never() {
        let clock = MockClock::auto_advancing();
        let sut = DelayedToggle::new(clock.clone());
        sut.schedule_toggle(Duration::from_secs(2));

        block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .to_never(be_true()),
        )
        .unwrap();

        let err = block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .timeout(Duration::from_secs(2))
                .to_never(be_true()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected to never be true"));
    }

    #[test]
    fn test_non_bool_values() {
        let clock = MockClock::auto_advancing();
        let clock2 = clock.clone();

        block_on(
            expect(|| clock2.now().as_millis() / 100)
                .with_time_source(clock.clone())
                .to_eventually(equal(3)),
        )
        .unwrap();
        assert_eq!(clock.now(), Duration::from_millis(300));
    }

    #[test]
    fn test_config_replaces_timing() {
        let config = PollConfig::eventually()
            .timeout(Duration::from_secs(4))
            .poll_interval(Duration::from_millis(250));
        let expectation = expect(|| false).config(config);
        assert_eq!(expectation.poll_config(), config);

        let clock = MockClock::auto_advancing();
        let result = block_on(expectation.with_time_source(clock.clone()).to_eventually(be_false()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_unbounded_timeout() {
        let clock = MockClock::with_start_time(Duration::from_millis(1));
        block_on(
            expect(|| true)
                .with_time_source(clock.clone())
                .timeout(Duration::MAX)
                .to_eventually(be_true()),
        )
        .unwrap();

        let clock = MockClock::auto_advancing();
        let sut = DelayedToggle::new(clock.clone());
        sut.schedule_toggle(Duration::from_millis(100));
        block_on(
            expect(|| sut.read())
                .with_time_source(clock.clone())
                .timeout(Duration::MAX)
                .to_eventually(be_true()),
        )
        .unwrap();
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_unbounded_poll_interval() {
        let clock = MockClock::auto_advancing();
        clock.advance(Duration::from_millis(1));
        let err = block_on(
            expect(|| false)
                .with_time_source(clock.clone())
                .timeout(Duration::from_millis(300))
                .poll_interval(Duration::MAX)
                .to_eventually(be_true()),
        )
        .unwrap_err();

        // once at the start and once at the deadline
        assert!(err.to_string().contains("(2 evaluations)"), "{err}");
        assert_eq!(clock.now(), Duration::from_millis(301));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_on_tokio() {
        let sut = DelayedToggle::on_current_runtime().unwrap();
        sut.schedule_toggle(Duration::from_millis(100));

        // The second look is pushed to the end of time, past the outer timeout.
        let waiting = expect(|| sut.read())
            .timeout(Duration::MAX)
            .poll_interval(Duration::MAX)
            .to_eventually(be_true());
        assert!(tokio::time::timeout(Duration::from_secs(1), waiting).await.is_err());
        assert!(sut.read());
    }

    #[tokio::test(start_paused = true)]
    async fn test_assert_eventually_macro() {
        let sut = DelayedToggle::on_current_runtime().unwrap();
        sut.schedule_toggle(Duration::from_millis(100));

        assert_eventually!(sut.read(), be_true());
        assert_eventually!(sut.flip_count(), equal(1), "toggle fired {} times", sut.flip_count());
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "expected to eventually be true")]
    async fn test_assert_eventually_macro_panics() {
        let sut = DelayedToggle::on_current_runtime().unwrap();
        sut.schedule_toggle(Duration::from_secs(3));

        assert_eventually!(sut.read(), be_true());
    }
}
