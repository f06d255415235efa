//! Reusable validation functions for [`Rule::validate`](ruletree_core::Rule::validate).
//!
//! Each constructor returns a plain function, so validators compose with
//! `Outcome::and_then` and fuse like any other transform:
//!
//! ```rust,ignore
//! let name = Rule::leaf(TextField::default())
//!     .validate(non_empty())
//!     .validate(max_length(40))
//!     .named("name");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Display;

use ruletree_core::Outcome;

use crate::error::FieldError;

lazy_static! {
    /// Email address pattern (RFC 5322 simplified, anchored)
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

/// Rejects strings that are empty after trimming.
pub fn non_empty<E>() -> impl Fn(String) -> Outcome<E, String> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
{
    |value: String| {
        if value.trim().is_empty() {
            Outcome::Failure(FieldError::Required.into())
        } else {
            Outcome::Success(value)
        }
    }
}

/// Rejects strings with fewer than `min` characters.
pub fn min_length<E>(min: usize) -> impl Fn(String) -> Outcome<E, String> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
{
    move |value: String| {
        if value.chars().count() < min {
            Outcome::Failure(FieldError::TooShort { min }.into())
        } else {
            Outcome::Success(value)
        }
    }
}

/// Rejects strings with more than `max` characters.
pub fn max_length<E>(max: usize) -> impl Fn(String) -> Outcome<E, String> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
{
    move |value: String| {
        if value.chars().count() > max {
            Outcome::Failure(FieldError::TooLong { max }.into())
        } else {
            Outcome::Success(value)
        }
    }
}

/// Rejects values outside `min..=max`.
pub fn in_range<E, T>(min: T, max: T) -> impl Fn(T) -> Outcome<E, T> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
    T: PartialOrd + Display + Clone + Send + Sync + 'static,
{
    move |value: T| {
        if value < min || value > max {
            Outcome::Failure(
                FieldError::OutOfRange {
                    min: min.to_string(),
                    max: max.to_string(),
                }
                .into(),
            )
        } else {
            Outcome::Success(value)
        }
    }
}

/// Rejects strings the pattern does not match.
pub fn matches<E>(pattern: Regex) -> impl Fn(String) -> Outcome<E, String> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
{
    move |value: String| {
        if pattern.is_match(&value) {
            Outcome::Success(value)
        } else {
            Outcome::Failure(FieldError::PatternMismatch { input: value }.into())
        }
    }
}

pub fn email<E>() -> impl Fn(String) -> Outcome<E, String> + Clone + Send + Sync + 'static
where
    E: From<FieldError>,
{
    matches(EMAIL_PATTERN.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    type Out = Outcome<FieldError, String>;

    #[test]
    fn test_non_empty() {
        let check = non_empty::<FieldError>();
        assert_eq!(check("  ".to_string()), Outcome::Failure(FieldError::Required));
        assert_eq!(check("x".to_string()), Out::Success("x".to_string()));
    }

    #[test]
    fn test_lengths_count_characters() {
        assert!(min_length::<FieldError>(3)("héé".to_string()).is_success());
        assert_eq!(
            min_length::<FieldError>(4)("héé".to_string()),
            Outcome::Failure(FieldError::TooShort { min: 4 })
        );
        assert_eq!(
            max_length::<FieldError>(2)("abc".to_string()),
            Outcome::Failure(FieldError::TooLong { max: 2 })
        );
    }

    #[test]
    fn test_in_range() {
        let age = in_range::<FieldError, u32>(18, 120);
        assert_eq!(age(18), Outcome::Success(18));
        assert_eq!(
            age(17),
            Outcome::Failure(FieldError::OutOfRange {
                min: "18".to_string(),
                max: "120".to_string(),
            })
        );
    }

    #[test]
    fn test_matches() {
        let code = matches::<FieldError>(Regex::new(r"^[A-Z]{3}$").unwrap());
        assert!(code("ABC".to_string()).is_success());
        assert_eq!(
            code("abc".to_string()),
            Outcome::Failure(FieldError::PatternMismatch { input: "abc".to_string() })
        );
    }

    #[test]
    fn test_email() {
        let check = email::<String>();
        assert!(check("ada@example.com".to_string()).is_success());
        assert_eq!(
            check("ada at example".to_string()),
            Outcome::Failure("'ada at example' does not match the expected format".to_string())
        );
        assert!(check("x ada@example.com".to_string()).is_failure());
    }

    #[test]
    fn test_validators_chain() {
        let short = min_length::<FieldError>(2);
        let long = max_length::<FieldError>(4);
        let both = |s: String| short(s).and_then(&long);
        assert!(both("abc".to_string()).is_success());
        assert!(both("a".to_string()).is_failure());
        assert!(both("abcde".to_string()).is_failure());
    }
}
