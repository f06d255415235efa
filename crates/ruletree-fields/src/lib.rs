//! # ruletree-fields
//!
//! Ready-made collaborators for [`ruletree_core`] rule trees:
//!
//! - **Fields**: text, parsed values, checkboxes, single and multiple
//!   choices, file uploads
//! - **Environments**: an in-memory [`MapEnv`] and a [`DocumentEnv`] read
//!   from JSON or YAML
//! - **Validators**: length, range and pattern checks for use with
//!   [`Rule::validate`](ruletree_core::Rule::validate)
//!
//! Every field and validator reports [`FieldError`]s through any error type
//! implementing `From<FieldError>`, including plain `String`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ruletree_core::{Method, Rule};
//! use ruletree_fields::{validators, DocumentEnv, FieldError, ParsedField, TextField};
//!
//! let signup: Rule<FieldError, (String, u32)> = Rule::leaf(TextField::default())
//!     .validate(validators::email())
//!     .named("email")
//!     .zip(Rule::leaf(ParsedField::new()).validate(validators::in_range(18, 120)).named("age"));
//!
//! let env = DocumentEnv::from_json(r#"{"email": "ada@example.com", "age": 36}"#)?;
//! let (email, age) = signup.run(Method::Submit, &env).await?;
//! ```

pub mod env;
pub mod error;
pub mod fields;
pub mod validators;

// Re-export main types at crate root
pub use env::{DocumentEnv, MapEnv};
pub use error::FieldError;
pub use fields::{BoolField, ChoiceField, FileField, MultiChoiceField, ParsedField, TextField};
