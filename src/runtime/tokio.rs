//! Tokio integration.
//!
//! [`TokioTime`] reads `tokio::time`, so it follows paused test time
//! (`#[tokio::test(start_paused = true)]`) as well as the wall clock.
//! [`TokioScheduler`] spawns deferred callbacks onto the runtime that was
//! current when it was created.
//!
//! # Example
//!
//! ```rust
//! use async_expectations::runtime::{RuntimeConfig, Scheduler, TokioScheduler};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! RuntimeConfig::new()
//!     .block_on(async {
//!         let scheduler = TokioScheduler::current().unwrap();
//!         let fired = Arc::new(AtomicBool::new(false));
//!         let fired2 = fired.clone();
//!         scheduler.schedule_after(
//!             Duration::from_millis(5),
//!             Box::new(move || fired2.store(true, Ordering::SeqCst)),
//!         );
//!         assert!(!fired.load(Ordering::SeqCst));
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         assert!(fired.load(Ordering::SeqCst));
//!     })
//!     .unwrap();
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use ::tokio::runtime::Handle;
use ::tokio::time::Instant;
use tracing::trace;

use super::{Callback, Scheduler, TimeSource};
use crate::error::{Error, Result};

/// Tokio-based time source.
///
/// `now()` is measured from the moment the source was created.
#[derive(Debug, Clone)]
pub struct TokioTime {
    start: Instant,
}

impl TokioTime {
    /// Create a new Tokio time source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for TokioTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioTime {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(::tokio::time::sleep(duration))
    }

    fn sleep_until(&self, deadline: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        match self.start.checked_add(deadline) {
            Some(instant) => Box::pin(::tokio::time::sleep_until(instant)),
            None => Box::pin(::tokio::time::sleep(Duration::MAX)),
        }
    }
}

/// Schedules callbacks as detached Tokio tasks.
///
/// Each callback gets its own task that sleeps for the delay and then runs
/// it. Tokio timers only promise a lower bound, so the callback may run
/// noticeably later than asked on a busy runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Capture the runtime the caller is currently running on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a Tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| Error::NoRuntime(e.to_string()))
    }

    /// Schedule onto an explicit runtime handle.
    #[must_use]
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime handle callbacks are spawned on.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) {
        trace!(?delay, "scheduling deferred callback on tokio");
        self.handle.spawn(async move {
            ::tokio::time::sleep(delay).await;
            callback();
        });
    }
}
