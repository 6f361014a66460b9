//! Waiting for asynchronous state changes.
//!
//! Two polling styles are provided:
//!
//! - [`PredicateExpectation`] - evaluates a `Fn() -> bool` on a coarse,
//!   fixed schedule (every second by default)
//! - [`expect`] - evaluates any value source every 10ms and checks it
//!   against a [`matcher::Matcher`]
//!
//! plus [`ExpectFailure`] for waits that are supposed to fail.
//!
//! # Example
//!
//! ```rust
//! use async_expectations::assertions::{expect, matcher::be_true, PredicateExpectation};
//! use async_expectations::clock::MockClock;
//! use async_expectations::toggle::DelayedToggle;
//! use std::time::Duration;
//!
//! let clock = MockClock::auto_advancing();
//! let sut = DelayedToggle::new(clock.clone());
//! sut.schedule_toggle(Duration::from_millis(100));
//!
//! futures::executor::block_on(async {
//!     expect(|| sut.read())
//!         .with_time_source(clock.clone())
//!         .to_eventually(be_true())
//!         .await
//!         .unwrap();
//!
//!     PredicateExpectation::new(sut.predicate())
//!         .with_time_source(clock.clone())
//!         .wait(Duration::ZERO)
//!         .await
//!         .unwrap();
//! });
//! ```

mod config;
mod eventually;
mod expect_failure;
pub mod matcher;
mod predicate;

pub use config::{
    PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL,
    PREDICATE_POLL_INTERVAL,
};
pub use eventually::{expect, Expectation};
pub use expect_failure::{ExpectFailure, Strictness};
pub use predicate::PredicateExpectation;
