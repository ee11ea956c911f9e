//! Rule tree node types and leaf-preserving traversal

use super::path::FieldPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a rule tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Terminal node holding one value
    Leaf,
    /// Internal node holding named children
    Branch,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => f.write_str("leaf"),
            NodeKind::Branch => f.write_str("branch"),
        }
    }
}

/// Recursive permission declaration: one value per field path
///
/// Branch children keep declaration order. A root `Leaf` applies to every
/// path beneath it, the same way a type-level leaf applies to every field of
/// that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleTree<T> {
    /// Terminal node
    Leaf(T),
    /// Internal node
    Branch(IndexMap<String, RuleTree<T>>),
}

impl<T> Default for RuleTree<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> RuleTree<T> {
    /// Create a leaf
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    /// Create a branch from `(name, child)` pairs
    pub fn branch<K: Into<String>>(children: impl IntoIterator<Item = (K, RuleTree<T>)>) -> Self {
        Self::Branch(
            children
                .into_iter()
                .map(|(name, child)| (name.into(), child))
                .collect(),
        )
    }

    /// Branch without children
    pub fn empty() -> Self {
        Self::Branch(IndexMap::new())
    }

    /// Whether this node is a leaf or a branch
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf(_) => NodeKind::Leaf,
            Self::Branch(_) => NodeKind::Branch,
        }
    }

    /// Whether this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Leaf value, if this node is a leaf
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    /// Children of a branch, in declaration order
    pub fn children(&self) -> Option<&IndexMap<String, RuleTree<T>>> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(children) => Some(children),
        }
    }

    /// Node at exactly `path`
    pub fn get(&self, path: &FieldPath) -> Option<&RuleTree<T>> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match node {
                Self::Branch(children) => children.get(segment),
                Self::Leaf(_) => None,
            })
    }

    /// Value governing `path`: the leaf at `path` or the nearest leaf above it
    ///
    /// Returns `None` when the path is absent or ends on a branch.
    pub fn resolve(&self, path: &FieldPath) -> Option<&T> {
        let mut node = self;
        for segment in path.segments() {
            match node {
                Self::Leaf(value) => return Some(value),
                Self::Branch(children) => node = children.get(segment)?,
            }
        }
        node.as_leaf()
    }

    /// Value governing `type_name.field`
    pub fn lookup(&self, type_name: &str, field: &str) -> Option<&T> {
        self.resolve(&FieldPath::new([type_name, field]))
    }

    /// All leaves with their paths, in declaration order
    pub fn leaves(&self) -> Vec<(FieldPath, &T)> {
        fn walk<'a, T>(node: &'a RuleTree<T>, path: &FieldPath, out: &mut Vec<(FieldPath, &'a T)>) {
            match node {
                RuleTree::Leaf(value) => out.push((path.clone(), value)),
                RuleTree::Branch(children) => {
                    for (name, child) in children {
                        walk(child, &path.child(name.as_str()), out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &FieldPath::root(), &mut out);
        out
    }

    /// Number of leaves below this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(children) => children.values().map(RuleTree::leaf_count).sum(),
        }
    }

    /// Transform every leaf by reference, keeping branch structure
    pub fn map_leaves<U>(&self, mut f: impl FnMut(&T) -> U) -> RuleTree<U> {
        fn rec<T, U>(node: &RuleTree<T>, f: &mut impl FnMut(&T) -> U) -> RuleTree<U> {
            match node {
                RuleTree::Leaf(value) => RuleTree::Leaf(f(value)),
                RuleTree::Branch(children) => RuleTree::Branch(
                    children
                        .iter()
                        .map(|(name, child)| (name.clone(), rec(child, f)))
                        .collect(),
                ),
            }
        }
        rec(self, &mut f)
    }

    /// Transform every leaf by value, keeping branch structure
    pub fn into_map_leaves<U>(self, mut f: impl FnMut(T) -> U) -> RuleTree<U> {
        fn rec<T, U>(node: RuleTree<T>, f: &mut impl FnMut(T) -> U) -> RuleTree<U> {
            match node {
                RuleTree::Leaf(value) => RuleTree::Leaf(f(value)),
                RuleTree::Branch(children) => RuleTree::Branch(
                    children
                        .into_iter()
                        .map(|(name, child)| (name, rec(child, f)))
                        .collect(),
                ),
            }
        }
        rec(self, &mut f)
    }

    /// Fallible leaf transform; stops at the first error
    pub fn try_map_leaves<U, E>(
        self,
        mut f: impl FnMut(&FieldPath, T) -> Result<U, E>,
    ) -> Result<RuleTree<U>, E> {
        fn rec<T, U, E>(
            node: RuleTree<T>,
            path: &FieldPath,
            f: &mut impl FnMut(&FieldPath, T) -> Result<U, E>,
        ) -> Result<RuleTree<U>, E> {
            match node {
                RuleTree::Leaf(value) => f(path, value).map(RuleTree::Leaf),
                RuleTree::Branch(children) => {
                    let mut mapped = IndexMap::with_capacity(children.len());
                    for (name, child) in children {
                        let child_path = path.child(name.as_str());
                        mapped.insert(name, rec(child, &child_path, f)?);
                    }
                    Ok(RuleTree::Branch(mapped))
                }
            }
        }
        rec(self, &FieldPath::root(), &mut f)
    }
}

impl<T: fmt::Display> fmt::Display for RuleTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn rec<T: fmt::Display>(
            node: &RuleTree<T>,
            depth: usize,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            let RuleTree::Branch(children) = node else {
                return Ok(());
            };
            for (name, child) in children {
                let indent = "  ".repeat(depth);
                match child {
                    RuleTree::Leaf(value) => writeln!(f, "{indent}{name}: {value}")?,
                    RuleTree::Branch(_) => {
                        writeln!(f, "{indent}{name}")?;
                        rec(child, depth + 1, f)?;
                    }
                }
            }
            Ok(())
        }

        match self {
            RuleTree::Leaf(value) => writeln!(f, "{value}"),
            RuleTree::Branch(_) => rec(self, 0, f),
        }
    }
}
