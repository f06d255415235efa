//! Naming, lookup and extraction over resolved trees.
//!
//! Names are read one at a time: [`Rule::pop_name`] strips the outermost
//! name, looking through transforms, so a transform attached above a name
//! never disturbs addressing. [`Rule::lookup`] matches a path by popping
//! names while descending.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use super::{Node, Rule};
use crate::config::{DuplicatePolicy, QueryPolicy};
use crate::field::FieldHandle;
use crate::path::{Path, Ref};

/// Programmer errors: a query that does not agree with the tree it targets.
///
/// These are never produced by evaluation and never accumulated. They mean
/// the tree was built or addressed incorrectly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No rule at path '{path}'")]
    NotFound { path: Path },

    #[error("Rule at path '{path}' is not a field")]
    NotALeaf { path: Path },

    #[error("Path '{path}' is ambiguous: {matches} rules match")]
    Ambiguous { path: Path, matches: usize },
}

/// The kind of a tree's outermost node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Leaf,
    Combine,
    Transform,
    Named,
}

/// A resolved sub-tree whose value type has been forgotten.
///
/// Children of a combine produce different value types, so traversal hands
/// them out in this form. Only type-independent operations are available.
pub struct SomeRule<E> {
    node: Arc<Node<E>>,
}

impl<E> SomeRule<E> {
    pub(crate) fn new(node: Arc<Node<E>>) -> Self {
        Self { node }
    }

    pub fn kind(&self) -> NodeKind {
        match &*self.node {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Combine { .. } => NodeKind::Combine,
            Node::Transform { .. } => NodeKind::Transform,
            Node::Named { .. } => NodeKind::Named,
        }
    }

    /// The immediate sub-trees, looking through transforms and names.
    ///
    /// Empty for a leaf, the two operands for a combine.
    pub fn children(&self) -> Vec<SomeRule<E>> {
        children(&self.node).into_iter().map(SomeRule::new).collect()
    }

    /// The field of this sub-tree, if it is a leaf under any number of
    /// transforms and names.
    pub fn to_field(&self) -> Option<FieldHandle<E>> {
        to_field(&self.node)
    }

    /// The path of every leaf, relative to this sub-tree, in tree order.
    ///
    /// Duplicates are kept: a path listed twice cannot be queried
    /// unambiguously.
    pub fn paths(&self) -> Vec<Path> {
        leaf_paths(&self.node)
    }
}

impl<E: Send + 'static> SomeRule<E> {
    pub fn pop_name(&self) -> (Option<Ref>, SomeRule<E>) {
        let (name, node) = pop_name(&self.node);
        (name, SomeRule::new(node))
    }

    pub fn get_ref(&self) -> Option<Ref> {
        self.pop_name().0
    }

    /// Every sub-tree addressed by `path`, in tree order.
    pub fn lookup(&self, path: &Path) -> Vec<SomeRule<E>> {
        let mut found = Vec::new();
        lookup_into(path.refs(), &self.node, &mut found);
        found.into_iter().map(SomeRule::new).collect()
    }
}

impl<E> Clone for SomeRule<E> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.node))
    }
}

impl<E> fmt::Debug for SomeRule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SomeRule").field(&self.node).finish()
    }
}

impl<E, A> Rule<E, A>
where
    E: Send + 'static,
{
    /// Strip the outermost name.
    ///
    /// Transforms are transparent: a transform above a name is kept and the
    /// name removed from beneath it. Without a name the tree is returned
    /// unchanged.
    pub fn pop_name(&self) -> (Option<Ref>, Rule<E, A>) {
        let (name, node) = pop_name(&self.node);
        (name, Rule::from_node(node))
    }

    pub fn get_ref(&self) -> Option<Ref> {
        self.pop_name().0
    }

    pub fn children(&self) -> Vec<SomeRule<E>> {
        self.erase().children()
    }

    /// Every sub-tree addressed by `path`.
    ///
    /// The empty path addresses the whole tree. A chain of directly nested
    /// names addresses a single node, reachable only through the full chain.
    /// Duplicate names yield several matches.
    pub fn lookup(&self, path: &Path) -> Vec<SomeRule<E>> {
        self.erase().lookup(path)
    }

    pub fn to_field(&self) -> Option<FieldHandle<E>> {
        to_field(&self.node)
    }

    /// The path of every leaf in tree order.
    pub fn paths(&self) -> Vec<Path> {
        leaf_paths(&self.node)
    }

    /// Leaf paths that occur more than once, sorted.
    pub fn duplicate_paths(&self) -> Vec<Path> {
        let mut counts: BTreeMap<Path, usize> = BTreeMap::new();
        for path in self.paths() {
            *counts.entry(path).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(path, _)| path)
            .collect()
    }

    /// Locate the field at `path` and hand it to `k`, rejecting ambiguity.
    pub fn query_field<R>(&self, path: &Path, k: impl FnOnce(&FieldHandle<E>) -> R) -> Result<R, QueryError> {
        self.query_field_with(&QueryPolicy::default(), path, k)
    }

    /// Locate the field at `path` and hand it to `k`.
    ///
    /// Fails when nothing matches, when the match is not a leaf, or when
    /// several rules match and `policy` rejects duplicates.
    pub fn query_field_with<R>(
        &self,
        policy: &QueryPolicy,
        path: &Path,
        k: impl FnOnce(&FieldHandle<E>) -> R,
    ) -> Result<R, QueryError> {
        let matches = self.lookup(path);
        let found = match (matches.len(), policy.duplicates) {
            (0, _) => return Err(defect(QueryError::NotFound { path: path.clone() })),
            (1, _) | (_, DuplicatePolicy::First) => &matches[0],
            (count, DuplicatePolicy::Reject) => {
                return Err(defect(QueryError::Ambiguous {
                    path: path.clone(),
                    matches: count,
                }))
            }
        };

        let field = found
            .to_field()
            .ok_or_else(|| defect(QueryError::NotALeaf { path: path.clone() }))?;
        Ok(k(&field))
    }
}

fn defect(error: QueryError) -> QueryError {
    warn!(error = %error, "Rule query does not match the tree");
    error
}

fn pop_name<E: Send + 'static>(node: &Arc<Node<E>>) -> (Option<Ref>, Arc<Node<E>>) {
    match &**node {
        Node::Named { name, inner } => (Some(name.clone()), Arc::clone(inner)),
        Node::Transform { inner, f } => match pop_name(inner) {
            (Some(name), popped) => (
                Some(name),
                Arc::new(Node::transform(popped, Arc::clone(f))),
            ),
            (None, _) => (None, Arc::clone(node)),
        },
        _ => (None, Arc::clone(node)),
    }
}

fn children<E>(node: &Arc<Node<E>>) -> Vec<Arc<Node<E>>> {
    match &**node {
        Node::Leaf(_) => Vec::new(),
        Node::Combine { fun, arg, .. } => vec![Arc::clone(fun), Arc::clone(arg)],
        Node::Transform { inner, .. } | Node::Named { inner, .. } => children(inner),
    }
}

fn lookup_into<E: Send + 'static>(path: &[Ref], node: &Arc<Node<E>>, found: &mut Vec<Arc<Node<E>>>) {
    let Some((head, rest)) = path.split_first() else {
        found.push(Arc::clone(node));
        return;
    };

    match pop_name(node) {
        (Some(name), popped) if name == *head => {
            if !rest.is_empty() {
                lookup_into(rest, &popped, found);
            } else if pop_name(&popped).0.is_none() {
                found.push(popped);
            }
        }
        (Some(_), _) => {}
        (None, _) => {
            for child in children(node) {
                lookup_into(path, &child, found);
            }
        }
    }
}

fn to_field<E>(node: &Node<E>) -> Option<FieldHandle<E>> {
    match node {
        Node::Leaf(field) => Some(FieldHandle::new(Arc::clone(field))),
        Node::Transform { inner, .. } | Node::Named { inner, .. } => to_field(inner),
        Node::Combine { .. } => None,
    }
}

fn leaf_paths<E>(node: &Node<E>) -> Vec<Path> {
    match node {
        Node::Leaf(_) => vec![Path::root()],
        Node::Combine { fun, arg, .. } => {
            let mut paths = leaf_paths(fun);
            paths.extend(leaf_paths(arg));
            paths
        }
        Node::Transform { inner, .. } => leaf_paths(inner),
        Node::Named { name, inner } => leaf_paths(inner)
            .into_iter()
            .map(|path| path.under(name))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    fn leaf(value: i32) -> Rule<String, i32> {
        Rule::pure(value)
    }

    /// `first` and `last` under `person`, `age` at the root.
    fn person() -> Rule<String, ((i32, i32), i32)> {
        leaf(1)
            .named("first")
            .zip(leaf(2).named("last"))
            .named("person")
            .zip(leaf(3).named("age"))
    }

    #[test]
    fn test_pop_name_strips_outermost() {
        let rule = leaf(1).named("a");
        let (name, rest) = rule.pop_name();
        assert_eq!(name, Some(Ref::new("a")));
        assert_eq!(rest.get_ref(), None);
    }

    #[test]
    fn test_pop_name_without_name_is_identity() {
        let rule = leaf(1).map(|x| x + 1);
        let (name, rest) = rule.pop_name();
        assert_eq!(name, None);
        assert!(Arc::ptr_eq(&rest.node, &rule.node));
    }

    #[test]
    fn test_pop_name_sees_through_transform() {
        let rule = leaf(1).named("a").map(|x| x * 2);
        let (name, rest) = rule.pop_name();
        assert_eq!(name, Some(Ref::new("a")));
        assert_eq!(rest.erase().kind(), NodeKind::Transform);
        assert_eq!(rest.get_ref(), None);
    }

    #[test]
    fn test_children_of_combine() {
        let rule = person();
        let children = rule.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].get_ref(), Some(Ref::new("age")));
        assert!(leaf(1).children().is_empty());
    }

    #[test]
    fn test_lookup_nested_path() {
        let rule = person();
        let found = rule.lookup(&Path::parse("person.last"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), NodeKind::Leaf);

        let section = rule.lookup(&Path::parse("person"));
        assert_eq!(section.len(), 1);
        assert_eq!(section[0].children().len(), 2);
        assert!(section[0].to_field().is_none());
        assert_eq!(
            section[0].paths(),
            vec![Path::parse("first"), Path::parse("last")]
        );
    }

    #[test]
    fn test_lookup_empty_path_returns_whole_tree() {
        let rule = person();
        let found = rule.lookup(&Path::root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].paths(), rule.paths());
    }

    #[test]
    fn test_lookup_name_chain() {
        let rule = leaf(1).named("b").named("a");
        let exact = rule.lookup(&Path::parse("a.b"));
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].kind(), NodeKind::Leaf);
        assert!(rule.lookup(&Path::parse("a")).is_empty());
        assert!(rule.lookup(&Path::parse("a.b.c")).is_empty());
    }

    #[test]
    fn test_lookup_mismatch_is_empty() {
        assert!(person().lookup(&Path::parse("nobody")).is_empty());
        assert!(person().lookup(&Path::parse("age.first")).is_empty());
    }

    #[test]
    fn test_lookup_returns_duplicates() {
        let rule = leaf(1).named("x").zip(leaf(2).named("x"));
        assert_eq!(rule.lookup(&Path::parse("x")).len(), 2);
        assert_eq!(rule.duplicate_paths(), vec![Path::parse("x")]);
    }

    #[test]
    fn test_transform_does_not_change_addressing() {
        let plain = leaf(1).named("a");
        let wrapped = plain.clone().map(|x| x + 1);
        assert_eq!(plain.get_ref(), wrapped.get_ref());
        assert_eq!(
            plain.lookup(&Path::parse("a")).len(),
            wrapped.lookup(&Path::parse("a")).len()
        );
    }

    #[test]
    fn test_to_field() {
        let rule = leaf(4).named("n").map(|x| x - 1);
        let field = rule.to_field().expect("leaf under transform and name");
        assert_eq!(field.descriptor(), FieldDescriptor::Constant);
        assert!(person().to_field().is_none());
    }

    #[test]
    fn test_paths_in_tree_order() {
        assert_eq!(
            person().paths(),
            vec![
                Path::parse("person.first"),
                Path::parse("person.last"),
                Path::parse("age"),
            ]
        );
    }

    #[test]
    fn test_query_field_found() {
        let descriptor = person()
            .query_field(&Path::parse("person.first"), |field| field.descriptor())
            .unwrap();
        assert_eq!(descriptor, FieldDescriptor::Constant);
    }

    #[test]
    fn test_query_field_missing_is_defect() {
        let err = person()
            .query_field(&Path::parse("missing"), |_| ())
            .unwrap_err();
        assert_eq!(err, QueryError::NotFound { path: Path::parse("missing") });
    }

    #[test]
    fn test_query_field_non_leaf_is_defect() {
        let err = person()
            .query_field(&Path::parse("person"), |_| ())
            .unwrap_err();
        assert!(matches!(err, QueryError::NotALeaf { .. }));
    }

    #[test]
    fn test_query_field_duplicates_follow_policy() {
        let rule = leaf(1).named("x").zip(leaf(2).named("x"));
        let err = rule.query_field(&Path::parse("x"), |_| ()).unwrap_err();
        assert_eq!(
            err,
            QueryError::Ambiguous {
                path: Path::parse("x"),
                matches: 2
            }
        );

        let policy = QueryPolicy {
            duplicates: DuplicatePolicy::First,
        };
        assert!(rule.query_field_with(&policy, &Path::parse("x"), |_| ()).is_ok());
    }
}
