//! The rule tree.
//!
//! A [`Rule<E, A>`] is an immutable tree that, once evaluated, yields a value
//! of type `A` or a list of path-tagged errors of type `E`. Trees are built
//! from four kinds of node:
//!
//! | Node | Meaning |
//! |------|---------|
//! | **Leaf** | a [`Field`] reading raw input at the current path |
//! | **Combine** | applies the function produced by one sub-tree to the value of another |
//! | **Transform** | maps a sub-tree's value through a fallible, possibly async function |
//! | **Named** | extends the current path with one [`Ref`] |
//!
//! Trees that still need effects to finish building are [`Draft`]s; only a
//! resolved `Rule` can be traversed or evaluated.
//!
//! Value types are erased inside the tree so that sub-trees of different
//! types can sit side by side; the typed constructors guarantee every erased
//! value is recovered at the type it was stored with.

mod draft;
mod traverse;

pub use draft::{BuildError, Draft};
pub use traverse::{NodeKind, QueryError, SomeRule};

use futures::future::{self, BoxFuture, FutureExt};
use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::field::{Constant, Erase, ErasedField, Field};
use crate::outcome::Outcome;
use crate::path::Ref;

/// A value flowing through a tree, type-erased.
pub(crate) type Value = Box<dyn Any + Send>;

/// A transform's function over erased values.
pub(crate) type TransformFn<E> =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Outcome<E, Value>> + Send + Sync>;

/// Applies an erased function value to an erased argument.
pub(crate) type ApplyFn = Arc<dyn Fn(Value, Value) -> Value + Send + Sync>;

/// Recover a value at the type it was stored with.
pub(crate) fn take<T: 'static>(value: Value) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        // The typed constructors pair every node with its value type.
        Err(_) => unreachable!("rule value is not a {}", type_name::<T>()),
    }
}

pub(crate) fn erase<T: Send + 'static>(value: T) -> Value {
    Box::new(value)
}

pub(crate) enum Node<E> {
    Leaf(Arc<dyn ErasedField<E>>),
    Combine {
        fun: Arc<Node<E>>,
        arg: Arc<Node<E>>,
        apply: ApplyFn,
    },
    Transform {
        inner: Arc<Node<E>>,
        f: TransformFn<E>,
    },
    Named {
        name: Ref,
        inner: Arc<Node<E>>,
    },
}

impl<E: Send + 'static> Node<E> {
    /// Wrap `inner` in a transform, fusing with an existing one.
    ///
    /// A transform never directly contains another transform.
    pub(crate) fn transform(inner: Arc<Node<E>>, f: TransformFn<E>) -> Node<E> {
        if let Node::Transform { inner: source, f: first } = &*inner {
            return Node::Transform {
                inner: Arc::clone(source),
                f: compose(Arc::clone(first), f),
            };
        }
        Node::Transform { inner, f }
    }
}

impl<E> fmt::Debug for Node<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(field) => f.debug_tuple("Leaf").field(&field.descriptor()).finish(),
            Node::Combine { fun, arg, .. } => {
                f.debug_tuple("Combine").field(fun).field(arg).finish()
            }
            Node::Transform { inner, .. } => f.debug_tuple("Transform").field(inner).finish(),
            Node::Named { name, inner } => f
                .debug_tuple("Named")
                .field(&name.as_str())
                .field(inner)
                .finish(),
        }
    }
}

/// Run `first`, then `then` on its value. `then` is skipped on failure.
pub(crate) fn compose<E: Send + 'static>(first: TransformFn<E>, then: TransformFn<E>) -> TransformFn<E> {
    Arc::new(move |value: Value| {
        let step = first(value);
        let then = Arc::clone(&then);
        async move {
            match step.await {
                Outcome::Success(value) => then(value).await,
                Outcome::Failure(error) => Outcome::Failure(error),
            }
        }
        .boxed()
    })
}

pub(crate) fn leaf_node<E, F>(field: F) -> Node<E>
where
    F: Field<E>,
{
    Node::Leaf(Arc::new(Erase(field)))
}

pub(crate) fn async_fn<E, A, B, Fut>(f: impl Fn(A) -> Fut + Send + Sync + 'static) -> TransformFn<E>
where
    E: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    Fut: Future<Output = Outcome<E, B>> + Send + 'static,
{
    Arc::new(move |value: Value| {
        let step = f(take::<A>(value));
        async move { step.await.map(erase) }.boxed()
    })
}

pub(crate) fn sync_fn<E, A, B>(f: impl Fn(A) -> Outcome<E, B> + Send + Sync + 'static) -> TransformFn<E>
where
    E: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    Arc::new(move |value: Value| future::ready(f(take::<A>(value)).map(erase)).boxed())
}

pub(crate) fn applier<F, B, A>() -> ApplyFn
where
    F: FnOnce(B) -> A + Send + 'static,
    B: Send + 'static,
    A: Send + 'static,
{
    Arc::new(|fun: Value, arg: Value| {
        let fun = take::<F>(fun);
        erase(fun(take::<B>(arg)))
    })
}

/// A resolved rule tree producing values of type `A` and errors of type `E`.
///
/// Cloning is cheap: sub-trees are shared. A rule holds no mutable state and
/// may be evaluated any number of times, concurrently.
pub struct Rule<E, A> {
    pub(crate) node: Arc<Node<E>>,
    _value: PhantomData<fn() -> A>,
}

impl<E, A> Rule<E, A> {
    pub(crate) fn from_node(node: Arc<Node<E>>) -> Self {
        Self {
            node,
            _value: PhantomData,
        }
    }

    /// Forget the value type, keeping only the traversal capability.
    pub fn erase(&self) -> SomeRule<E> {
        SomeRule::new(Arc::clone(&self.node))
    }
}

impl<E, A> Clone for Rule<E, A> {
    fn clone(&self) -> Self {
        Self::from_node(Arc::clone(&self.node))
    }
}

impl<E, A> fmt::Debug for Rule<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("value", &type_name::<A>())
            .field("tree", &self.node)
            .finish()
    }
}

impl<E, A> Rule<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// A leaf reading raw input through `field`.
    pub fn leaf<F>(field: F) -> Self
    where
        F: Field<E, Value = A>,
    {
        Self::from_node(Arc::new(leaf_node(field)))
    }

    /// A leaf that always yields `value` and reads no input.
    pub fn pure(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::leaf(Constant::new(value))
    }

    /// Attach a name, extending the path of everything below.
    pub fn named(self, name: impl Into<Ref>) -> Self {
        Self::from_node(Arc::new(Node::Named {
            name: name.into(),
            inner: self.node,
        }))
    }

    /// Map the value through an async, fallible function.
    ///
    /// The function only runs when this rule succeeded; its failure is
    /// tagged with the path active at this node. Chained transforms fuse into
    /// a single node.
    pub fn transform<B, Fut>(self, f: impl Fn(A) -> Fut + Send + Sync + 'static) -> Rule<E, B>
    where
        B: Send + 'static,
        Fut: Future<Output = Outcome<E, B>> + Send + 'static,
    {
        Rule::from_node(Arc::new(Node::transform(self.node, async_fn(f))))
    }

    /// Map the value through a synchronous, fallible function.
    pub fn validate<B>(self, f: impl Fn(A) -> Outcome<E, B> + Send + Sync + 'static) -> Rule<E, B>
    where
        B: Send + 'static,
    {
        Rule::from_node(Arc::new(Node::transform(self.node, sync_fn(f))))
    }

    /// Map the value. Never fails.
    pub fn map<B>(self, g: impl Fn(A) -> B + Send + Sync + 'static) -> Rule<E, B>
    where
        B: Send + 'static,
    {
        self.validate(move |a| Outcome::Success(g(a)))
    }

    /// Keep the value when `predicate` holds, fail with `error` otherwise.
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

    /// Pair this rule's value with `other`'s.
    pub fn zip<B>(self, other: Rule<E, B>) -> Rule<E, (A, B)>
    where
        B: Send + 'static,
    {
        self.map(|a: A| move |b: B| (a, b)).apply(other)
    }

    /// Combine this rule's value with `other`'s through `g`.
    pub fn map2<B, C>(self, other: Rule<E, B>, g: impl Fn(A, B) -> C + Send + Sync + 'static) -> Rule<E, C>
    where
        B: Send + 'static,
        C: Send + 'static,
    {
        self.zip(other).map(move |(a, b)| g(a, b))
    }
}

impl<E, A> Rule<E, Option<A>>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// Validate only present values; `None` passes through.
    pub fn validate_optional<B>(self, f: impl Fn(A) -> Outcome<E, B> + Send + Sync + 'static) -> Rule<E, Option<B>>
    where
        B: Send + 'static,
    {
        self.validate(move |value| match value {
            Some(a) => f(a).map(Some),
            None => Outcome::Success(None),
        })
    }
}

impl<E, F> Rule<E, F>
where
    E: Send + 'static,
    F: Send + 'static,
{
    /// Applicative apply: feed `arg`'s value to the function this rule yields.
    ///
    /// Both sides are always evaluated; when both fail, this rule's errors come
    /// before `arg`'s.
    pub fn apply<B, A>(self, arg: Rule<E, B>) -> Rule<E, A>
    where
        F: FnOnce(B) -> A,
        B: Send + 'static,
        A: Send + 'static,
    {
        Rule::from_node(Arc::new(Node::Combine {
            fun: self.node,
            arg: arg.node,
            apply: applier::<F, B, A>(),
        }))
    }
}

/// Attach `name` to `rule`.
pub fn named<E, A>(name: impl Into<Ref>, rule: Rule<E, A>) -> Rule<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    rule.named(name)
}

/// Applicative combination of a function rule and an argument rule.
pub fn combine<E, F, B, A>(fun: Rule<E, F>, arg: Rule<E, B>) -> Rule<E, A>
where
    E: Send + 'static,
    F: FnOnce(B) -> A + Send + 'static,
    B: Send + 'static,
    A: Send + 'static,
{
    fun.apply(arg)
}
