//! Failure-accumulating outcomes.
//!
//! `Outcome` is the applicative result type the whole engine is built on.
//! Unlike `Result`, combining two outcomes with [`Outcome::zip_with`] keeps
//! the errors of *both* sides when both fail, so sibling rules always report
//! together.

use serde::{Deserialize, Serialize};

/// Types whose values can be appended.
///
/// The error side of an [`Outcome`] must be a semigroup for applicative
/// combination. Appending must be associative; the left operand's content
/// comes first.
pub trait Semigroup {
    /// Append `other` after `self`.
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

/// Either a value or an accumulated error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<E, A> {
    /// The rule produced a value.
    Success(A),

    /// The rule failed.
    Failure(E),
}

impl<E, A> Outcome<E, A> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Transform the success value.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Outcome<E, B> {
        match self {
            Outcome::Success(a) => Outcome::Success(f(a)),
            Outcome::Failure(e) => Outcome::Failure(e),
        }
    }

    /// Transform the error, leaving success untouched.
    pub fn map_err<E2>(self, f: impl FnOnce(E) -> E2) -> Outcome<E2, A> {
        match self {
            Outcome::Success(a) => Outcome::Success(a),
            Outcome::Failure(e) => Outcome::Failure(f(e)),
        }
    }

    /// Sequence a dependent step. Short-circuits on failure: `f` never runs
    /// when `self` already failed.
    pub fn and_then<B>(self, f: impl FnOnce(A) -> Outcome<E, B>) -> Outcome<E, B> {
        match self {
            Outcome::Success(a) => f(a),
            Outcome::Failure(e) => Outcome::Failure(e),
        }
    }

    /// Combine two independent outcomes.
    ///
    /// If both succeed, `f` is applied to both values. Otherwise the result
    /// fails with every error present, `self`'s before `other`'s.
    pub fn zip_with<B, C>(self, other: Outcome<E, B>, f: impl FnOnce(A, B) -> C) -> Outcome<E, C>
    where
        E: Semigroup,
    {
        match (self, other) {
            (Outcome::Success(a), Outcome::Success(b)) => Outcome::Success(f(a, b)),
            (Outcome::Failure(left), Outcome::Failure(right)) => {
                Outcome::Failure(left.combine(right))
            }
            (Outcome::Failure(e), Outcome::Success(_)) | (Outcome::Success(_), Outcome::Failure(e)) => {
                Outcome::Failure(e)
            }
        }
    }

    pub fn success(self) -> Option<A> {
        match self {
            Outcome::Success(a) => Some(a),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(self) -> Option<E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<A, E> {
        self.into()
    }
}

impl<E, A> From<Result<A, E>> for Outcome<E, A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(a) => Outcome::Success(a),
            Err(e) => Outcome::Failure(e),
        }
    }
}

impl<E, A> From<Outcome<E, A>> for Result<A, E> {
    fn from(outcome: Outcome<E, A>) -> Self {
        match outcome {
            Outcome::Success(a) => Ok(a),
            Outcome::Failure(e) => Err(e),
        }
    }
}
