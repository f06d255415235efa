//! Names and paths.
//!
//! A [`Ref`] is a single name attached to a sub-tree. A [`Path`] is the
//! sequence of names met while descending from the root, written dotted
//! (`"user.address.city"`).

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::field::Input;

/// A single hierarchical name. Equal by exact text.
///
/// Any text is accepted, including `.`. A ref containing a dot still
/// addresses exactly one level, but its path's dotted form is ambiguous:
/// [`Path::parse`] would split it. Use the serde form, a sequence of refs,
/// when such paths must survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(String);

impl Ref {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ref {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Ref {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An ordered sequence of refs locating a node from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Ref>);

impl Path {
    /// The empty path (the root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. The empty string is the root.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self(dotted.split('.').map(Ref::new).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn refs(&self) -> &[Ref] {
        &self.0
    }

    pub fn push(&mut self, name: impl Into<Ref>) {
        self.0.push(name.into());
    }

    /// A new path with `name` appended.
    pub fn child(&self, name: impl Into<Ref>) -> Self {
        let mut path = self.clone();
        path.push(name);
        path
    }

    /// Split into the first ref and the remaining path.
    pub fn split_first(&self) -> Option<(&Ref, Path)> {
        self.0
            .split_first()
            .map(|(head, rest)| (head, Path(rest.to_vec())))
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Prepend `name` to this path.
    pub(crate) fn under(mut self, name: &Ref) -> Self {
        self.0.insert(0, name.clone());
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(name.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Path {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl<R: Into<Ref>> FromIterator<R> for Path {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<R: Into<Ref>, const N: usize> From<[R; N]> for Path {
    fn from(refs: [R; N]) -> Self {
        refs.into_iter().collect()
    }
}

/// An error paired with the path where it was introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathError<E> {
    pub path: Path,
    pub error: E,
}

impl<E> PathError<E> {
    pub fn new(path: Path, error: E) -> Self {
        Self { path, error }
    }
}

impl<E: fmt::Display> fmt::Display for PathError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.path, self.error)
        }
    }
}

/// All path-tagged errors of one evaluation, in tree order.
pub type Errors<E> = Vec<PathError<E>>;

/// Every raw input seen during evaluation, paired with its path.
pub type Echo = Vec<(Path, Input)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let path = Path::parse("user.address.city");
        assert_eq!(path.len(), 3);
        assert_eq!(path.refs()[1], Ref::new("address"));
        assert_eq!(path.to_string(), "user.address.city");
    }

    #[test]
    fn test_empty_string_is_root() {
        assert!(Path::parse("").is_empty());
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn test_child_and_under() {
        let path = Path::from(["a"]).child("b");
        assert_eq!(path, Path::parse("a.b"));
        assert_eq!(Path::parse("b").under(&Ref::new("a")), path);
    }

    #[test]
    fn test_split_first() {
        let path = Path::parse("a.b.c");
        let (head, rest) = path.split_first().unwrap();
        assert_eq!(head.as_str(), "a");
        assert_eq!(rest, Path::parse("b.c"));
        assert!(Path::root().split_first().is_none());
    }

    #[test]
    fn test_dotted_ref_keeps_one_level() {
        let path = Path::from(["a.b", "c"]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!(Path::parse(&path.to_string()).len(), 3);

        let json = serde_json::to_string(&path).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_path_serializes_as_sequence() {
        let json = serde_json::to_string(&Path::parse("a.b")).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }

    #[test]
    fn test_path_error_display() {
        let error = PathError::new(Path::parse("age"), "not a number");
        assert_eq!(error.to_string(), "age: not a number");
        let root = PathError::new(Path::root(), "missing");
        assert_eq!(root.to_string(), "missing");
    }
}
