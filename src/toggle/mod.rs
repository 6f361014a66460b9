//! A boolean flag that flips itself some time later.
//!
//! [`DelayedToggle`] is the smallest useful asynchronous state change: a flag
//! that starts `false` and is inverted by a callback handed to a
//! [`Scheduler`]. It exists to give the polling waiters in
//! [`assertions`](crate::assertions) something real to wait on.
//!
//! The scheduled callback only holds a [`Weak`] reference to the flag. If the
//! toggle is dropped before the delay elapses the callback finds nothing to
//! flip and returns quietly.
//!
//! # Example
//!
//! ```rust
//! use async_expectations::clock::MockClock;
//! use async_expectations::toggle::DelayedToggle;
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! let toggle = DelayedToggle::new(clock.clone());
//!
//! toggle.schedule_toggle(Duration::from_millis(100));
//! assert!(!toggle.read());
//!
//! clock.advance(Duration::from_millis(100));
//! assert!(toggle.read());
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::runtime::{Scheduler, TokioScheduler};

#[derive(Debug, Default)]
struct ToggleState {
    flag: AtomicBool,
    flips: AtomicUsize,
}

impl ToggleState {
    fn flip(&self) {
        self.flag.fetch_xor(true, Ordering::SeqCst);
        self.flips.fetch_add(1, Ordering::SeqCst);
    }
}

/// A flag that is inverted once per [`schedule_toggle`](Self::schedule_toggle) call.
///
/// The toggle is owned by whoever created it and is not
/// `Clone`; observers borrow it through [`read`](Self::read) or
/// [`predicate`](Self::predicate).
#[derive(Debug)]
pub struct DelayedToggle<S: Scheduler = TokioScheduler> {
    state: Arc<ToggleState>,
    scheduler: S,
}

/// The name this type goes by in the polling examples.
pub type AsyncWorkPerformer<S = TokioScheduler> = DelayedToggle<S>;

impl DelayedToggle<TokioScheduler> {
    /// Create a toggle that schedules onto the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`](crate::Error::NoRuntime) outside a Tokio runtime.
    pub fn on_current_runtime() -> Result<Self> {
        Ok(Self::new(TokioScheduler::current()?))
    }
}

impl<S: Scheduler> DelayedToggle<S> {
    /// Create a toggle whose flag starts out `false`.
    #[must_use]
    pub fn new(scheduler: S) -> Self {
        Self {
            state: Arc::new(ToggleState::default()),
            scheduler,
        }
    }

    /// Invert the flag once, no sooner than `after` from now.
    ///
    /// The flip runs on the scheduler this toggle was created with, not on
    /// whatever runtime is current when this is called. It never happens
    /// inside this call, even for a zero delay. How much later than `after`
    /// it lands is up to the scheduler.
    pub fn schedule_toggle(&self, after: Duration) {
        let state: Weak<ToggleState> = Arc::downgrade(&self.state);
        debug!(?after, "scheduling toggle");
        self.scheduler.schedule_after(
            after,
            Box::new(move || {
                if let Some(state) = state.upgrade() {
                    state.flip();
                }
            }),
        );
    }

    /// [`schedule_toggle`](Self::schedule_toggle) taking fractional seconds.
    ///
    /// Negative, NaN and infinite values are treated as zero; finite values
    /// too large for a [`Duration`] saturate.
    pub fn schedule_toggle_secs(&self, seconds: f64) {
        let after = if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self.schedule_toggle(after);
    }

    /// Current value of the flag.
    #[must_use]
    pub fn read(&self) -> bool {
        self.state.flag.load(Ordering::SeqCst)
    }

    /// How many scheduled flips have been applied so far.
    #[must_use]
    pub fn flip_count(&self) -> usize {
        self.state.flips.load(Ordering::SeqCst)
    }

    /// A side-effect-free closure over [`read`](Self::read), for the waiters.
    pub fn predicate(&self) -> impl Fn() -> bool + '_ {
        move || self.read()
    }

    /// The scheduler flips are handed to.
    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
