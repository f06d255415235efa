//! Unresolved trees.
//!
//! A [`Draft`] may contain deferred sub-trees: futures that will produce more
//! tree once they complete (a choice list fetched from a database, a section
//! that depends on the current user). [`Draft::resolve`] drives every such
//! future and splices its result in, yielding a static [`Rule`].

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{applier, async_fn, compose, leaf_node, sync_fn, ApplyFn, Node, Rule, TransformFn};
use crate::field::{Constant, Field};
use crate::outcome::Outcome;
use crate::path::{Path, Ref};

/// Errors raised while resolving a draft.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Deferred rule failed: {0}")]
    Message(String),

    #[error("Deferred rule failed: {0}")]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BuildError {
    pub fn message(message: impl Into<String>) -> Self {
        BuildError::Message(message.into())
    }

    pub fn from_source(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        BuildError::Source(Box::new(error))
    }
}

type Deferred<E> = BoxFuture<'static, Result<DraftNode<E>, BuildError>>;

pub(crate) enum DraftNode<E> {
    Leaf(Node<E>),
    Combine {
        fun: Box<DraftNode<E>>,
        arg: Box<DraftNode<E>>,
        apply: ApplyFn,
    },
    Transform {
        inner: Box<DraftNode<E>>,
        f: TransformFn<E>,
    },
    Named {
        name: Ref,
        inner: Box<DraftNode<E>>,
    },
    Deferred(Deferred<E>),
    /// An already resolved sub-tree.
    Static(Arc<Node<E>>),
}

impl<E: Send + 'static> DraftNode<E> {
    fn transform(inner: DraftNode<E>, f: TransformFn<E>) -> DraftNode<E> {
        match inner {
            DraftNode::Transform { inner, f: first } => DraftNode::Transform {
                inner,
                f: compose(first, f),
            },
            DraftNode::Static(node) => DraftNode::Static(Arc::new(Node::transform(node, f))),
            other => DraftNode::Transform {
                inner: Box::new(other),
                f,
            },
        }
    }
}

/// A rule tree that may still contain deferred sub-trees.
pub struct Draft<E, A> {
    node: DraftNode<E>,
    _value: PhantomData<fn() -> A>,
}

impl<E, A> Draft<E, A> {
    fn from_node(node: DraftNode<E>) -> Self {
        Self {
            node,
            _value: PhantomData,
        }
    }
}

impl<E, A> From<Rule<E, A>> for Draft<E, A> {
    fn from(rule: Rule<E, A>) -> Self {
        Self::from_node(DraftNode::Static(rule.node))
    }
}

impl<E, A> Draft<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    pub fn leaf<F>(field: F) -> Self
    where
        F: Field<E, Value = A>,
    {
        Self::from_node(DraftNode::Leaf(leaf_node(field)))
    }

    pub fn pure(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::leaf(Constant::new(value))
    }

    /// A sub-tree produced by a future.
    pub fn defer(future: impl Future<Output = Draft<E, A>> + Send + 'static) -> Self {
        Self::from_node(DraftNode::Deferred(
            async move { Ok(future.await.node) }.boxed(),
        ))
    }

    /// A sub-tree produced by a future that may fail. The failure aborts
    /// [`resolve`](Draft::resolve).
    pub fn try_defer(future: impl Future<Output = Result<Draft<E, A>, BuildError>> + Send + 'static) -> Self {
        Self::from_node(DraftNode::Deferred(
            async move { future.await.map(|draft| draft.node) }.boxed(),
        ))
    }

    pub fn named(self, name: impl Into<Ref>) -> Self {
        Self::from_node(DraftNode::Named {
            name: name.into(),
            inner: Box::new(self.node),
        })
    }

    pub fn transform<B, Fut>(self, f: impl Fn(A) -> Fut + Send + Sync + 'static) -> Draft<E, B>
    where
        B: Send + 'static,
        Fut: Future<Output = Outcome<E, B>> + Send + 'static,
    {
        Draft::from_node(DraftNode::transform(self.node, async_fn(f)))
    }

    pub fn validate<B>(self, f: impl Fn(A) -> Outcome<E, B> + Send + Sync + 'static) -> Draft<E, B>
    where
        B: Send + 'static,
    {
        Draft::from_node(DraftNode::transform(self.node, sync_fn(f)))
    }

    pub fn map<B>(self, g: impl Fn(A) -> B + Send + Sync + 'static) -> Draft<E, B>
    where
        B: Send + 'static,
    {
        self.validate(move |a| Outcome::Success(g(a)))
    }

    pub fn check(self, error: E, predicate: impl Fn(&A) -> bool + Send + Sync + 'static) -> Self
    where
        E: Clone + Sync,
    {
        self.validate(move |a| {
            if predicate(&a) {
                Outcome::Success(a)
            } else {
                Outcome::Failure(error.clone())
            }
        })
    }

    pub fn zip<B>(self, other: Draft<E, B>) -> Draft<E, (A, B)>
    where
        B: Send + 'static,
    {
        self.map(|a: A| move |b: B| (a, b)).apply(other)
    }

    pub fn map2<B, C>(self, other: Draft<E, B>, g: impl Fn(A, B) -> C + Send + Sync + 'static) -> Draft<E, C>
    where
        B: Send + 'static,
        C: Send + 'static,
    {
        self.zip(other).map(move |(a, b)| g(a, b))
    }

    /// Drive every deferred sub-tree to completion and splice in its result.
    ///
    /// Deferred futures run in tree order, left before right. The first one
    /// that fails aborts resolution with its error.
    pub async fn resolve(self) -> Result<Rule<E, A>, BuildError> {
        let node = resolve_node(self.node, Path::root()).await?;
        Ok(Rule::from_node(node))
    }
}

impl<E, A> Draft<E, Option<A>>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// Validate only present values; `None` passes through.
    pub fn validate_optional<B>(self, f: impl Fn(A) -> Outcome<E, B> + Send + Sync + 'static) -> Draft<E, Option<B>>
    where
        B: Send + 'static,
    {
        self.validate(move |value| match value {
            Some(a) => f(a).map(Some),
            None => Outcome::Success(None),
        })
    }
}

impl<E, F> Draft<E, F>
where
    E: Send + 'static,
    F: Send + 'static,
{
    pub fn apply<B, A>(self, arg: Draft<E, B>) -> Draft<E, A>
    where
        F: FnOnce(B) -> A,
        B: Send + 'static,
        A: Send + 'static,
    {
        Draft::from_node(DraftNode::Combine {
            fun: Box::new(self.node),
            arg: Box::new(arg.node),
            apply: applier::<F, B, A>(),
        })
    }
}

fn resolve_node<E: Send + 'static>(
    node: DraftNode<E>,
    path: Path,
) -> BoxFuture<'static, Result<Arc<Node<E>>, BuildError>> {
    async move {
        let resolved = match node {
            DraftNode::Leaf(leaf) => Arc::new(leaf),
            DraftNode::Static(node) => node,
            DraftNode::Combine { fun, arg, apply } => {
                let fun = resolve_node(*fun, path.clone()).await?;
                let arg = resolve_node(*arg, path).await?;
                Arc::new(Node::Combine { fun, arg, apply })
            }
            DraftNode::Transform { inner, f } => {
                // The inner tree may resolve to a transform; fuse again.
                let inner = resolve_node(*inner, path).await?;
                Arc::new(Node::transform(inner, f))
            }
            DraftNode::Named { name, inner } => {
                let inner = resolve_node(*inner, path.child(name.clone())).await?;
                Arc::new(Node::Named { name, inner })
            }
            DraftNode::Deferred(future) => {
                debug!(path = %path, "Resolving deferred rule");
                let next = future.await?;
                resolve_node(next, path).await?
            }
        };
        Ok(resolved)
    }
    .boxed()
}
