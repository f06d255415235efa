//! Input environments.
//!
//! An environment answers one question: which raw values were supplied at a
//! given path? Lookups are async so environments may be backed by anything
//! from an in-memory map to a request body that is still streaming.

use async_trait::async_trait;

use crate::field::Input;
use crate::path::Path;

/// A source of raw input values keyed by path.
///
/// Returning several values supports multi-valued inputs such as a
/// multi-select. Returning none means nothing was supplied.
#[async_trait]
pub trait Environment: Send + Sync {
    async fn lookup(&self, path: &Path) -> Vec<Input>;
}

/// An environment that never supplies anything.
///
/// Useful with [`Method::Read`](crate::Method::Read) to obtain a tree's
/// defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

#[async_trait]
impl Environment for NoInput {
    async fn lookup(&self, _path: &Path) -> Vec<Input> {
        Vec::new()
    }
}

/// Adapts a synchronous lookup function into an [`Environment`].
#[derive(Debug, Clone)]
pub struct FnEnv<F>(F);

/// Build an environment from a closure.
pub fn env_fn<F>(lookup: F) -> FnEnv<F>
where
    F: Fn(&Path) -> Vec<Input> + Send + Sync,
{
    FnEnv(lookup)
}

#[async_trait]
impl<F> Environment for FnEnv<F>
where
    F: Fn(&Path) -> Vec<Input> + Send + Sync,
{
    async fn lookup(&self, path: &Path) -> Vec<Input> {
        (self.0)(path)
    }
}
