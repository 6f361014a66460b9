//! # async-expectations
//!
//! > Waiting on asynchronous state changes in tests
//!
//! **async-expectations** pairs a minimal asynchronous state change, the
//! [`DelayedToggle`](toggle::DelayedToggle), with two ways of waiting for
//! it: a slow fixed-tick [`PredicateExpectation`](assertions::PredicateExpectation)
//! and a fine-grained [`expect(..).to_eventually(..)`](assertions::expect).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use async_expectations::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::test]
//! async fn flag_flips() {
//!     let sut = DelayedToggle::on_current_runtime().unwrap();
//!     sut.schedule_toggle(Duration::from_millis(100));
//!
//!     expect(|| sut.read()).to_eventually(be_true()).await.unwrap();
//! }
//! ```
//!
//! ## Timing
//!
//! Schedulers only promise a lower bound: a toggle scheduled for 100ms
//! never flips earlier, but may flip arbitrarily later. Waits whose timeout
//! is close to the delay, or shorter than the waiter's poll interval, can
//! legitimately fail.
//!
//! ## Features
//!
//! - **Delayed toggle** - a flag flipped once through a weak back-reference
//! - **Schedulers** - Tokio or a virtual [`MockClock`](clock::MockClock)
//! - **Polling waiters** - predicate expectations and eventually-matchers
//! - **Expected failures** - strict and non-strict

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assertions;
pub mod clock;
pub mod error;
pub mod runtime;
pub mod toggle;

/// Prelude for convenient imports
///
/// ```rust
/// use async_expectations::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assertions::matcher::{be_false, be_true, equal, not, satisfies, Matcher};
    pub use crate::assertions::{expect, ExpectFailure, PollConfig, PredicateExpectation};
    pub use crate::clock::MockClock;
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{Scheduler, TimeSource, TokioScheduler, TokioTime};
    pub use crate::toggle::{AsyncWorkPerformer, DelayedToggle};
}

// Re-exports
pub use error::{Error, Result};
