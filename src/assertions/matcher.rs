// Returning a matcher without using it is the normal way to set up an expectation
#![allow(clippy::must_use_candidate)]

//! Matchers for the value-based expectations.
//!
//! - [`Matcher`] trait for custom matchers
//! - Built-in matchers: [`be_true`], [`be_false`], [`equal`], [`satisfies`]
//! - Negation: [`not`]
//!
//! # Example
//!
//! ```rust
//! use async_expectations::assertions::matcher::{be_true, equal, not, Matcher};
//!
//! assert!(be_true().matches(&true));
//! assert!(equal(42).matches(&42));
//! assert!(not(equal(0)).matches(&1));
//! ```

use std::fmt::Debug;

/// A matcher for testing values.
///
/// # Implementing Custom Matchers
///
/// ```rust
/// use async_expectations::assertions::matcher::Matcher;
///
/// struct IsEven;
///
/// impl Matcher<i32> for IsEven {
///     fn matches(&self, value: &i32) -> bool {
///         value % 2 == 0
///     }
///
///     fn describe(&self) -> String {
///         "be even".to_string()
///     }
///
///     fn describe_mismatch(&self, value: &i32) -> String {
///         format!("{} is not even", value)
///     }
/// }
///
/// assert!(IsEven.matches(&4));
/// assert!(!IsEven.matches(&3));
/// ```
pub trait Matcher<T: ?Sized> {
    /// Check if the value matches.
    fn matches(&self, value: &T) -> bool;

    /// Describe what this matcher expects, phrased to follow "to".
    fn describe(&self) -> String;

    /// Describe why a value didn't match.
    fn describe_mismatch(&self, value: &T) -> String;
}

/// Assert that a value matches a matcher.
///
/// # Panics
///
/// Panics with a descriptive message if the value doesn't match.
///
/// # Example
///
/// ```rust
/// use async_expectations::{assert_that, assertions::matcher::be_false};
///
/// assert_that!(false, be_false());
/// ```
#[macro_export]
macro_rules! assert_that {
    ($value:expr, $matcher:expr) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::assertions::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected to: {}\n  got: {:?}",
                $crate::assertions::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::assertions::matcher::Matcher::describe(matcher),
                value
            );
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::assertions::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected to: {}\n  got: {:?}\n  message: {}",
                $crate::assertions::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::assertions::matcher::Matcher::describe(matcher),
                value,
                format_args!($($arg)+)
            );
        }
    }};
}

/// Match `true`.
pub fn be_true() -> BoolMatcher {
    BoolMatcher { expected: true }
}

/// Match `false`.
pub fn be_false() -> BoolMatcher {
    BoolMatcher { expected: false }
}

/// Matcher for a specific boolean.
#[derive(Debug, Clone, Copy)]
pub struct BoolMatcher {
    expected: bool,
}

impl Matcher<bool> for BoolMatcher {
    fn matches(&self, value: &bool) -> bool {
        *value == self.expected
    }

    fn describe(&self) -> String {
        format!("be {}", self.expected)
    }

    fn describe_mismatch(&self, value: &bool) -> String {
        format!("{value} is not {}", self.expected)
    }
}

/// Create an equality matcher.
///
/// ```rust
/// use async_expectations::assertions::matcher::{equal, Matcher};
///
/// let m = equal("ready");
/// assert!(m.matches(&"ready"));
/// assert!(!m.matches(&"idle"));
/// ```
pub fn equal<T: PartialEq + Debug>(expected: T) -> EqualMatcher<T> {
    EqualMatcher { expected }
}

/// Matcher for equality.
#[derive(Debug, Clone)]
pub struct EqualMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqualMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value == &self.expected
    }

    fn describe(&self) -> String {
        format!("equal {:?}", self.expected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not equal {:?}", value, self.expected)
    }
}

/// Create a matcher from a predicate function.
///
/// ```rust
/// use async_expectations::assertions::matcher::{satisfies, Matcher};
///
/// let m = satisfies(|n: &u32| *n >= 3, "reach 3");
/// assert!(m.matches(&3));
/// assert!(!m.matches(&2));
/// ```
pub fn satisfies<T, F>(predicate: F, description: &str) -> PredicateMatcher<F>
where
    F: Fn(&T) -> bool,
{
    PredicateMatcher {
        predicate,
        description: description.to_string(),
    }
}

/// Matcher backed by a closure.
pub struct PredicateMatcher<F> {
    predicate: F,
    description: String,
}

impl<T: Debug, F: Fn(&T) -> bool> Matcher<T> for PredicateMatcher<F> {
    fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not {}", value, self.description)
    }
}

/// Negate a matcher.
pub fn not<M>(matcher: M) -> NotMatcher<M> {
    NotMatcher { inner: matcher }
}

/// Matcher that inverts another.
#[derive(Debug, Clone)]
pub struct NotMatcher<M> {
    inner: M,
}

impl<T: Debug + ?Sized, M: Matcher<T>> Matcher<T> for NotMatcher<M> {
    fn matches(&self, value: &T) -> bool {
        !self.inner.matches(value)
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{value:?} should not {}", self.inner.describe())
    }
}

impl<T: ?Sized> Matcher<T> for Box<dyn Matcher<T>> {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        (**self).describe_mismatch(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_matchers() {
        assert!(be_true().matches(&true));
        assert!(!be_true().matches(&false));
        assert!(be_false().matches(&false));
        assert!(!be_false().matches(&true));
    }

    #[test]
    fn test_equal_matcher() {
        let m = equal(42);
        assert!(m.matches(&42));
        assert!(!m.matches(&0));
    }

    #[test]
    fn test_satisfies_matcher() {
        let m = satisfies(|x: &i32| *x % 2 == 0, "be even");
        assert!(m.matches(&4));
        assert!(!m.matches(&3));
    }

    #[test]
    fn test_not_combinator() {
        let m = not(be_true());
        assert!(m.matches(&false));
        assert!(!m.matches(&true));
    }

    #[test]
    fn test_boxed_matcher() {
        let m: Box<dyn Matcher<bool>> = Box::new(be_true());
        assert!(m.matches(&true));
        assert_eq!(m.describe(), "be true");
    }

    #[test]
    fn test_assert_that_macro() {
        assert_that!(true, be_true());
        assert_that!(7, equal(7), "lucky number");
        assert_that!("hello", satisfies(|s: &&str| s.contains("ell"), "contain 'ell'"));
    }

    #[test]
    #[should_panic(expected = "false is not true")]
    fn test_assert_that_fails() {
        assert_that!(false, be_true());
    }

    #[test]
    fn test_matcher_describe() {
        assert_eq!(be_true().describe(), "be true");
        assert_eq!(be_false().describe(), "be false");
        assert_eq!(equal(42).describe(), "equal 42");
        assert_eq!(not(equal(0)).describe(), "not equal 0");
    }

    #[test]
    fn test_matcher_describe_mismatch() {
        assert_eq!(be_true().describe_mismatch(&false), "false is not true");
        assert!(equal(42).describe_mismatch(&0).contains("does not equal"));
        assert_eq!(not(be_true()).describe_mismatch(&true), "true should not be true");
    }
}
