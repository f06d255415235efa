//! # ruletree-core
//!
//! Composable rule trees for data extraction and validation.
//!
//! This crate lets you declare a tree of rules as an ordinary value, then
//! evaluate it against any key-value input source, answering:
//! - Did the input satisfy every rule?
//! - If so, what typed value does it describe?
//! - If not, which rules failed, and at which path?
//!
//! ## Key Guarantees
//!
//! 1. **Accumulating**: sibling rules always report together; one failure
//!    never hides another
//! 2. **Traceable**: every error is tagged with the path where it arose
//! 3. **Two-phase**: effectful construction ([`Draft`]) is resolved once
//!    into a static [`Rule`]; only static rules can be evaluated
//! 4. **Shareable**: rules are immutable and may be evaluated concurrently
//!
//! ## Example
//!
//! ```rust,ignore
//! use ruletree_core::{Method, Rule};
//! use ruletree_fields::{MapEnv, ParsedField, TextField};
//!
//! let user = Rule::leaf(TextField::new("")).named("name")
//!     .zip(Rule::leaf(ParsedField::<u32>::new()).named("age"));
//!
//! let env = MapEnv::new().text("name", "ada").text("age", "36");
//! match user.run(Method::Submit, &env).await {
//!     Ok((name, age)) => println!("{} is {}", name, age),
//!     Err(errors) => for e in errors { println!("{}", e) },
//! }
//! ```

pub mod config;
pub mod env;
mod eval;
pub mod field;
pub mod outcome;
pub mod path;
pub mod tree;
mod view;

// Re-export main types at crate root
pub use config::{ConfigError, DuplicatePolicy, QueryPolicy};
pub use env::{env_fn, Environment, FnEnv, NoInput};
pub use field::{ChoiceOption, Constant, Field, FieldDescriptor, FieldHandle, Input, Method};
pub use outcome::{Outcome, Semigroup};
pub use path::{Echo, Errors, Path, PathError, Ref};
pub use tree::{combine, named, BuildError, Draft, NodeKind, QueryError, Rule, SomeRule};
