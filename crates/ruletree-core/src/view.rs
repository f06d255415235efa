//! Error-type mapping over whole trees.

use futures::future::FutureExt;
use std::sync::Arc;

use crate::field::MappedField;
use crate::tree::{Node, Rule, TransformFn, Value};

impl<E, A> Rule<E, A>
where
    E: Send + 'static,
{
    /// Convert every error this tree can produce with `f`.
    ///
    /// Leaves and transform functions have their failures post-processed;
    /// values, names and shape are untouched. Evaluating the mapped tree is
    /// equivalent to evaluating this one and mapping each error afterwards.
    pub fn map_errors<E2>(&self, f: impl Fn(E) -> E2 + Send + Sync + 'static) -> Rule<E2, A>
    where
        E2: Send + 'static,
    {
        let f: Arc<dyn Fn(E) -> E2 + Send + Sync> = Arc::new(f);
        Rule::from_node(Arc::new(map_node(&self.node, &f)))
    }
}

fn map_node<E, E2>(node: &Node<E>, f: &Arc<dyn Fn(E) -> E2 + Send + Sync>) -> Node<E2>
where
    E: Send + 'static,
    E2: Send + 'static,
{
    match node {
        Node::Leaf(field) => Node::Leaf(Arc::new(MappedField {
            inner: Arc::clone(field),
            f: Arc::clone(f),
        })),
        Node::Combine { fun, arg, apply } => Node::Combine {
            fun: Arc::new(map_node(fun, f)),
            arg: Arc::new(map_node(arg, f)),
            apply: Arc::clone(apply),
        },
        Node::Transform { inner, f: g } => {
            let g = Arc::clone(g);
            let post = Arc::clone(f);
            let mapped: TransformFn<E2> = Arc::new(move |value: Value| {
                let post = Arc::clone(&post);
                g(value).map(move |outcome| outcome.map_err(|e| post(e))).boxed()
            });
            Node::Transform {
                inner: Arc::new(map_node(inner, f)),
                f: mapped,
            }
        }
        Node::Named { name, inner } => Node::Named {
            name: name.clone(),
            inner: Arc::new(map_node(inner, f)),
        },
    }
}
