//! Leaf fields: the contract between a rule tree and its leaf validators.
//!
//! The core never interprets raw input itself. Each leaf wraps a [`Field`]
//! that turns the raw values found at its path into an [`Outcome`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::outcome::Outcome;
use crate::tree::Value;

/// Why a tree is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Nothing was submitted; fields report their defaults.
    Read,

    /// Raw inputs were submitted and must be validated.
    Submit,
}

/// One raw input value found in an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Input {
    Text(String),
    File(PathBuf),
}

impl Input {
    pub fn text(value: impl Into<String>) -> Self {
        Input::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::File(_) => None,
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Text(text) => f.write_str(text),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Introspection data a field exposes about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDescriptor {
    /// Always yields the same value; reads no input.
    Constant,

    Text { default: String },

    Choice { options: Vec<ChoiceOption>, default: Option<usize> },

    Bool { default: bool },

    File,

    /// A field that does not describe itself.
    Opaque,
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Key submitted as raw input to select this option
    pub key: String,

    /// Human-readable label
    pub label: String,
}

/// A leaf validator.
///
/// `evaluate` must be deterministic given its inputs. `inputs` holds every raw
/// value the environment produced at the leaf's path, possibly none.
pub trait Field<E>: Send + Sync + 'static {
    /// The value a successful evaluation produces.
    type Value: Send + 'static;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, Self::Value>;

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Opaque
    }

    /// Whether the field consumes raw input at its path. Fields answering
    /// `false` are never looked up and contribute nothing to the echo.
    fn reads_input(&self) -> bool {
        true
    }
}

/// A field that always yields the same value.
///
/// This is what [`Rule::pure`](crate::Rule::pure) builds on.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant<T> {
    value: T,
}

impl<T> Constant<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<E, T> Field<E> for Constant<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn evaluate(&self, _method: Method, _inputs: &[Input]) -> Outcome<E, T> {
        Outcome::Success(self.value.clone())
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Constant
    }

    fn reads_input(&self) -> bool {
        false
    }
}

/// Value-erased field as stored in a tree.
pub(crate) trait ErasedField<E>: Send + Sync {
    fn descriptor(&self) -> FieldDescriptor;

    fn reads_input(&self) -> bool;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, Value>;
}

pub(crate) struct Erase<F>(pub(crate) F);

impl<E, F> ErasedField<E> for Erase<F>
where
    F: Field<E>,
{
    fn descriptor(&self) -> FieldDescriptor {
        self.0.describe()
    }

    fn reads_input(&self) -> bool {
        self.0.reads_input()
    }

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, Value> {
        self.0
            .evaluate(method, inputs)
            .map(|value| Box::new(value) as Value)
    }
}

/// A field whose failures are post-processed into another error type.
pub(crate) struct MappedField<E, E2> {
    pub(crate) inner: Arc<dyn ErasedField<E>>,
    pub(crate) f: Arc<dyn Fn(E) -> E2 + Send + Sync>,
}

impl<E, E2> ErasedField<E2> for MappedField<E, E2> {
    fn descriptor(&self) -> FieldDescriptor {
        self.inner.descriptor()
    }

    fn reads_input(&self) -> bool {
        self.inner.reads_input()
    }

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E2, Value> {
        self.inner.evaluate(method, inputs).map_err(|e| (self.f)(e))
    }
}

/// A field located in a tree, with its value type erased.
///
/// Returned by [`to_field`](crate::Rule::to_field) and handed to
/// [`query_field`](crate::Rule::query_field) continuations.
pub struct FieldHandle<E> {
    field: Arc<dyn ErasedField<E>>,
}

impl<E> FieldHandle<E> {
    pub(crate) fn new(field: Arc<dyn ErasedField<E>>) -> Self {
        Self { field }
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        self.field.descriptor()
    }

    /// Run the field on `inputs`, keeping only the error.
    pub fn check(&self, method: Method, inputs: &[Input]) -> Outcome<E, ()> {
        self.field.evaluate(method, inputs).map(|_| ())
    }
}

impl<E> Clone for FieldHandle<E> {
    fn clone(&self) -> Self {
        Self {
            field: Arc::clone(&self.field),
        }
    }
}

impl<E> fmt::Debug for FieldHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandle")
            .field("descriptor", &self.descriptor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Digits;

    impl Field<String> for Digits {
        type Value = u32;

        fn evaluate(&self, _method: Method, inputs: &[Input]) -> Outcome<String, u32> {
            match inputs.first().and_then(Input::as_text) {
                Some(text) => text.parse::<u32>().map_err(|_| format!("bad digits: {}", text)).into(),
                None => Outcome::Failure("missing".to_string()),
            }
        }
    }

    #[test]
    fn test_handle_check_discards_value() {
        let handle: FieldHandle<String> = FieldHandle::new(Arc::new(Erase(Digits)));
        assert_eq!(
            handle.check(Method::Submit, &[Input::text("12")]),
            Outcome::Success(())
        );
        assert_eq!(
            handle.check(Method::Submit, &[Input::text("x")]),
            Outcome::Failure("bad digits: x".to_string())
        );
    }

    #[test]
    fn test_default_descriptor_is_opaque() {
        let handle: FieldHandle<String> = FieldHandle::new(Arc::new(Erase(Digits)));
        assert_eq!(handle.descriptor(), FieldDescriptor::Opaque);
    }

    #[test]
    fn test_mapped_field_rewrites_errors() {
        let mapped: MappedField<String, usize> = MappedField {
            inner: Arc::new(Erase(Digits)),
            f: Arc::new(|e: String| e.len()),
        };
        let outcome = mapped.evaluate(Method::Submit, &[]);
        assert_eq!(outcome.failure(), Some(7));
    }

    #[test]
    fn test_input_serialization() {
        let json = serde_json::to_string(&Input::text("bob")).unwrap();
        assert_eq!(json, r#"{"kind":"text","value":"bob"}"#);
    }
}
