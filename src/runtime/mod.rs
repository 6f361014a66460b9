//! Runtime abstractions for time and deferred work.
//!
//! The waiters and the toggle never talk to a runtime directly. They go
//! through two narrow traits so the same code runs on Tokio or on a
//! [`MockClock`](crate::clock::MockClock):
//!
//! - [`TimeSource`] - current time and sleeping, used by the polling waiters
//! - [`Scheduler`] - fire a callback no earlier than a given delay
//!
//! # Example
//!
//! ```rust
//! use async_expectations::clock::MockClock;
//! use async_expectations::runtime::Scheduler;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! let fired = Arc::new(AtomicBool::new(false));
//! let fired2 = fired.clone();
//! clock.schedule_after(
//!     Duration::from_millis(100),
//!     Box::new(move || fired2.store(true, Ordering::SeqCst)),
//! );
//!
//! clock.advance(Duration::from_millis(99));
//! assert!(!fired.load(Ordering::SeqCst));
//! clock.advance(Duration::from_millis(1));
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::Result;

/// A source of time for async operations.
///
/// This trait abstracts over different time implementations, allowing
/// code to work with both real time and mock time.
///
/// # Implementations
///
/// - [`MockClock`](crate::clock::MockClock) - Mock time for testing
/// - [`TokioTime`] - Tokio time, including paused test time
pub trait TimeSource: Send + Sync {
    /// Get the current time as a duration since an epoch.
    fn now(&self) -> Duration;

    /// Create a future that completes after the given duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Create a future that completes at the given instant.
    fn sleep_until(&self, deadline: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let now = self.now();
        if deadline <= now {
            Box::pin(std::future::ready(()))
        } else {
            self.sleep(deadline - now)
        }
    }
}

/// A deferred callback handed to a [`Scheduler`].
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a callback later.
///
/// The only guarantee is a lower bound: the callback runs no earlier than
/// `delay` after `schedule_after` returns. There is no upper bound, and the
/// callback never runs synchronously inside `schedule_after`.
pub trait Scheduler: Send + Sync {
    /// Schedule `callback` to run once, at least `delay` from now.
    fn schedule_after(&self, delay: Duration, callback: Callback);
}

impl<S: Scheduler + ?Sized> Scheduler for std::sync::Arc<S> {
    fn schedule_after(&self, delay: Duration, callback: Callback) {
        (**self).schedule_after(delay, callback);
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        (**self).sleep(duration)
    }
}

/// Which Tokio scheduler flavor to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// Single thread; every task and timer runs on the calling thread.
    #[default]
    CurrentThread,
    /// Work-stealing pool.
    MultiThread,
}

/// Configuration for runtimes built by [`RuntimeConfig::block_on`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Scheduler flavor.
    pub flavor: Flavor,
    /// Worker threads for [`Flavor::MultiThread`]; Tokio's default when `None`.
    pub worker_threads: Option<usize>,
}

impl RuntimeConfig {
    /// Create a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a multi-threaded runtime.
    #[must_use]
    pub fn multi_thread(mut self) -> Self {
        self.flavor = Flavor::MultiThread;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Build a Tokio runtime matching this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeBuild`](crate::Error::RuntimeBuild) if Tokio fails to start.
    pub fn build(&self) -> Result<::tokio::runtime::Runtime> {
        let mut builder = match self.flavor {
            Flavor::CurrentThread => ::tokio::runtime::Builder::new_current_thread(),
            Flavor::MultiThread => ::tokio::runtime::Builder::new_multi_thread(),
        };
        if let (Flavor::MultiThread, Some(threads)) = (self.flavor, self.worker_threads) {
            builder.worker_threads(threads);
        }
        Ok(builder.enable_all().build()?)
    }

    /// Run a future to completion on a fresh runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeBuild`](crate::Error::RuntimeBuild) if the runtime cannot be built.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        Ok(self.build()?.block_on(future))
    }
}

pub mod tokio;

pub use self::tokio::{TokioScheduler, TokioTime};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_builder() {
        let config = RuntimeConfig::new().multi_thread().worker_threads(2);

        assert_eq!(config.flavor, Flavor::MultiThread);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[test]
    fn test_runtime_config_default() {
        let config = RuntimeConfig::default();

        assert_eq!(config.flavor, Flavor::CurrentThread);
        assert_eq!(config.worker_threads, None);
    }

    #[test]
    fn test_block_on_runs_future() {
        let value = RuntimeConfig::new().block_on(async { 7 }).unwrap();
        assert_eq!(value, 7);

        let value = RuntimeConfig::new()
            .multi_thread()
            .worker_threads(1)
            .block_on(async { 8 })
            .unwrap();
        assert_eq!(value, 8);
    }
}
