//! Turning an expected wait failure into a passing check.
//!
//! Timing-sensitive waits sometimes fail on purpose. [`ExpectFailure`]
//! states that up front: a strict expectation requires the wait to fail, a
//! non-strict one tolerates either outcome, which suits thresholds that sit
//! right on a poll tick.
//!
//! ```rust
//! use async_expectations::assertions::ExpectFailure;
//! use async_expectations::Error;
//! use std::time::Duration;
//!
//! let timed_out: async_expectations::Result<()> =
//!     Err(Error::timeout("flag is set", Duration::from_millis(200), 1));
//! assert!(ExpectFailure::strict().check(timed_out).is_ok());
//!
//! assert!(ExpectFailure::strict().check(Ok(())).is_err());
//! assert!(ExpectFailure::non_strict().check(Ok(())).is_ok());
//! ```

use tracing::debug;

use crate::error::{Error, Result};

/// Whether a passing wait counts as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// The wait must fail.
    Strict,
    /// The wait may fail.
    NonStrict,
}

/// Declares that the next wait is expected to fail.
#[derive(Debug, Clone)]
pub struct ExpectFailure {
    strictness: Strictness,
    reason: Option<String>,
}

impl ExpectFailure {
    /// The wait must fail; passing is reported as [`Error::UnexpectedSuccess`].
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            reason: None,
        }
    }

    /// The wait may fail or pass.
    #[must_use]
    pub fn non_strict() -> Self {
        Self {
            strictness: Strictness::NonStrict,
            reason: None,
        }
    }

    /// Attach an explanation, used in the error and the log.
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The configured strictness.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Judge the outcome of a wait.
    ///
    /// Returns the wait's own error when it failed as expected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedSuccess`] when a strict expectation's wait
    /// passed.
    pub fn check<T>(&self, outcome: Result<T>) -> Result<Option<Error>> {
        let reason = self.reason.as_deref().unwrap_or("failure expected");
        match (outcome, self.strictness) {
            (Err(err), _) => {
                debug!(%err, reason, "wait failed as expected");
                Ok(Some(err))
            }
            (Ok(_), Strictness::NonStrict) => {
                debug!(reason, "wait passed; tolerated by non-strict expectation");
                Ok(None)
            }
            (Ok(_), Strictness::Strict) => Err(Error::unexpected_success(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timed_out() -> Result<()> {
        Err(Error::timeout("flag", Duration::from_millis(400), 1))
    }

    #[test]
    fn test_strict_accepts_failure() {
        let err = ExpectFailure::strict().check(timed_out()).unwrap().unwrap();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_strict_rejects_success() {
        let err = ExpectFailure::strict()
            .reason("interval longer than timeout")
            .check(Ok(()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected success: interval longer than timeout"
        );
    }

    #[test]
    fn test_non_strict_accepts_both() {
        let expectation = ExpectFailure::non_strict();
        assert_eq!(expectation.strictness(), Strictness::NonStrict);
        assert!(expectation.check(timed_out()).unwrap().is_some());
        assert!(expectation.check(Ok(5)).unwrap().is_none());
    }
}
