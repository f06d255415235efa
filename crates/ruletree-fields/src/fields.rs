//! Reference leaf fields.
//!
//! | Field | Read | Submit |
//! |-------|------|--------|
//! | [`TextField`] | default | first text, or `""` |
//! | [`ParsedField`] | default, or `Required` | parse first text |
//! | [`BoolField`] | default | `"on"`/`"true"` → true, absent → false |
//! | [`ChoiceField`] | default option | option keyed by first text |
//! | [`MultiChoiceField`] | default options | one option per input |
//! | [`FileField`] | `None` | first file input |

use std::any::type_name;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use ruletree_core::{ChoiceOption, Field, FieldDescriptor, Input, Method, Outcome};

use crate::error::FieldError;

fn first_text(inputs: &[Input]) -> Option<&str> {
    inputs.iter().find_map(Input::as_text)
}

/// Free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    default: String,
}

impl TextField {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
        }
    }
}

impl<E> Field<E> for TextField {
    type Value = String;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, String> {
        match method {
            Method::Read => Outcome::Success(self.default.clone()),
            Method::Submit => Outcome::Success(first_text(inputs).unwrap_or_default().to_string()),
        }
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Text {
            default: self.default.clone(),
        }
    }
}

/// Text parsed into any `FromStr` type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedField<T> {
    default: Option<T>,
}

impl<T> ParsedField<T> {
    pub fn new() -> Self {
        Self { default: None }
    }

    pub fn with_default(default: T) -> Self {
        Self {
            default: Some(default),
        }
    }
}

impl<T> Default for ParsedField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> Field<E> for ParsedField<T>
where
    E: From<FieldError>,
    T: FromStr + Display + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, T> {
        if method == Method::Read {
            return match &self.default {
                Some(value) => Outcome::Success(value.clone()),
                None => Outcome::Failure(FieldError::Required.into()),
            };
        }

        let input = first_text(inputs).map(str::trim).unwrap_or_default();
        if input.is_empty() {
            return Outcome::Failure(FieldError::Required.into());
        }

        match input.parse::<T>() {
            Ok(value) => Outcome::Success(value),
            Err(_) => Outcome::Failure(
                FieldError::Unparseable {
                    input: input.to_string(),
                    expected: short_type_name::<T>().to_string(),
                }
                .into(),
            ),
        }
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Text {
            default: self
                .default
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// `"alloc::string::String"` -> `"String"`.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolField {
    default: bool,
}

impl BoolField {
    pub fn new(default: bool) -> Self {
        Self { default }
    }
}

impl<E> Field<E> for BoolField {
    type Value = bool;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, bool> {
        match method {
            Method::Read => Outcome::Success(self.default),
            Method::Submit => Outcome::Success(matches!(first_text(inputs), Some("on") | Some("true"))),
        }
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Bool {
            default: self.default,
        }
    }
}

/// Keyed options shared by the choice fields.
#[derive(Debug, Clone)]
struct Options<T> {
    entries: Vec<(ChoiceOption, T)>,
}

impl<T: Clone> Options<T> {
    fn push(&mut self, key: String, label: String, value: T) {
        self.entries.push((ChoiceOption { key, label }, value));
    }

    fn by_key(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(option, _)| option.key == key)
            .map(|(_, value)| value)
    }

    fn by_index(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, value)| value)
    }

    fn descriptors(&self) -> Vec<ChoiceOption> {
        self.entries.iter().map(|(option, _)| option.clone()).collect()
    }
}

/// Exactly one of a fixed set of options.
#[derive(Debug, Clone)]
pub struct ChoiceField<T> {
    options: Options<T>,
    default: Option<usize>,
}

impl<T: Clone> ChoiceField<T> {
    pub fn new() -> Self {
        Self {
            options: Options { entries: Vec::new() },
            default: None,
        }
    }

    /// Add an option selected by submitting `key`.
    pub fn option(mut self, key: impl Into<String>, label: impl Into<String>, value: T) -> Self {
        self.options.push(key.into(), label.into(), value);
        self
    }

    /// Select the option at `index` when nothing is submitted.
    pub fn default_index(mut self, index: usize) -> Self {
        self.default = Some(index);
        self
    }

    fn default_value(&self) -> Option<&T> {
        self.default.and_then(|index| self.options.by_index(index))
    }
}

impl<T: Clone> Default for ChoiceField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> Field<E> for ChoiceField<T>
where
    E: From<FieldError>,
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, T> {
        let selected = match (method, first_text(inputs)) {
            (Method::Submit, Some(key)) => match self.options.by_key(key) {
                Some(value) => Some(value),
                None => {
                    return Outcome::Failure(
                        FieldError::InvalidChoice {
                            key: key.to_string(),
                        }
                        .into(),
                    )
                }
            },
            _ => self.default_value(),
        };

        match selected {
            Some(value) => Outcome::Success(value.clone()),
            None => Outcome::Failure(FieldError::Required.into()),
        }
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Choice {
            options: self.options.descriptors(),
            default: self.default,
        }
    }
}

/// Any number of options from a fixed set, e.g. a multi-select.
#[derive(Debug, Clone)]
pub struct MultiChoiceField<T> {
    options: Options<T>,
    defaults: Vec<usize>,
}

impl<T: Clone> MultiChoiceField<T> {
    pub fn new() -> Self {
        Self {
            options: Options { entries: Vec::new() },
            defaults: Vec::new(),
        }
    }

    pub fn option(mut self, key: impl Into<String>, label: impl Into<String>, value: T) -> Self {
        self.options.push(key.into(), label.into(), value);
        self
    }

    pub fn default_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.defaults = indices.into_iter().collect();
        self
    }
}

impl<T: Clone> Default for MultiChoiceField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> Field<E> for MultiChoiceField<T>
where
    E: From<FieldError>,
    T: Clone + Send + Sync + 'static,
{
    type Value = Vec<T>;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, Vec<T>> {
        if method == Method::Read {
            return Outcome::Success(
                self.defaults
                    .iter()
                    .filter_map(|index| self.options.by_index(*index).cloned())
                    .collect(),
            );
        }

        let mut selected = Vec::new();
        for key in inputs.iter().filter_map(Input::as_text) {
            match self.options.by_key(key) {
                Some(value) => selected.push(value.clone()),
                None => {
                    return Outcome::Failure(
                        FieldError::InvalidChoice {
                            key: key.to_string(),
                        }
                        .into(),
                    )
                }
            }
        }
        Outcome::Success(selected)
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::Choice {
            options: self.options.descriptors(),
            default: self.defaults.first().copied(),
        }
    }
}

/// An uploaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileField;

impl<E> Field<E> for FileField {
    type Value = Option<PathBuf>;

    fn evaluate(&self, method: Method, inputs: &[Input]) -> Outcome<E, Option<PathBuf>> {
        if method == Method::Read {
            return Outcome::Success(None);
        }
        Outcome::Success(inputs.iter().find_map(|input| match input {
            Input::File(path) => Some(path.clone()),
            Input::Text(_) => None,
        }))
    }

    fn describe(&self) -> FieldDescriptor {
        FieldDescriptor::File
    }
}
