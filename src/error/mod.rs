//! Error definitions
//!
//! This module provides error types for async-expectations. The toggle itself
//! never fails; every variant here belongs to a waiter or a scheduler setup.

use std::time::Duration;

use thiserror::Error;

/// Main error type for async-expectations
#[derive(Error, Debug)]
pub enum Error {
    /// A polling expectation was not fulfilled before its timeout.
    #[error("Expectation \"{description}\" not fulfilled within {timeout:?} ({evaluations} evaluations)")]
    Timeout {
        /// Human readable name of the expectation.
        description: String,
        /// The timeout the caller asked for.
        timeout: Duration,
        /// How many times the predicate was evaluated.
        evaluations: usize,
    },

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// A wait that was expected to fail passed instead.
    #[error("Unexpected success: {0}")]
    UnexpectedSuccess(String),

    /// No async runtime was available to schedule work on.
    #[error("No runtime available: {0}")]
    NoRuntime(String),

    /// Tokio failed to build a runtime.
    #[error("Failed to build runtime: {0}")]
    RuntimeBuild(#[from] std::io::Error),
}

impl Error {
    /// Create a timeout error.
    #[must_use]
    pub fn timeout(description: impl Into<String>, timeout: Duration, evaluations: usize) -> Self {
        Self::Timeout {
            description: description.into(),
            timeout,
            evaluations,
        }
    }

    /// Create an assertion failure.
    #[must_use]
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }

    /// Create an unexpected success error.
    #[must_use]
    pub fn unexpected_success(message: impl Into<String>) -> Self {
        Self::UnexpectedSuccess(message.into())
    }

    /// Returns `true` if this error came from a wait running out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
