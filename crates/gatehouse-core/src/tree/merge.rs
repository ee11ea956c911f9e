//! Shape-compatible zip-merge
//!
//! Merges trees whose leaves are ordered sequences. At every path present in
//! both operands the node kinds must agree:
//!
//! ```text
//! Leaf(l)   + Leaf(r)    → Leaf(l ++ r)
//! Branch(l) + Branch(r)  → Branch(union of keys, shared keys merged recursively)
//! Leaf      + Branch     → ShapeMismatch (fatal)
//! ```
//!
//! A key present on one side only is copied unchanged. Absent paths
//! contribute nothing; they are not empty sequences.

use super::path::FieldPath;
use super::types::RuleTree;
use crate::errors::{GatehouseError, Result};
use tracing::{debug, warn};

/// Wrap every leaf into a one-element sequence
pub fn listify<T>(tree: RuleTree<T>) -> RuleTree<Vec<T>> {
    tree.into_map_leaves(|leaf| vec![leaf])
}

/// Merge two sequence trees, left operand's elements first
pub fn zip_merge<T>(left: RuleTree<Vec<T>>, right: RuleTree<Vec<T>>) -> Result<RuleTree<Vec<T>>> {
    zip_at(&FieldPath::root(), left, right)
}

fn zip_at<T>(
    path: &FieldPath,
    left: RuleTree<Vec<T>>,
    right: RuleTree<Vec<T>>,
) -> Result<RuleTree<Vec<T>>> {
    match (left, right) {
        (RuleTree::Leaf(mut left), RuleTree::Leaf(right)) => {
            left.extend(right);
            Ok(RuleTree::Leaf(left))
        }
        (RuleTree::Branch(mut left), RuleTree::Branch(right)) => {
            for (name, right_child) in right {
                match left.get_mut(&name) {
                    Some(slot) => {
                        let left_child = std::mem::take(slot);
                        *slot = zip_at(&path.child(name.as_str()), left_child, right_child)?;
                    }
                    None => {
                        left.insert(name, right_child);
                    }
                }
            }
            Ok(RuleTree::Branch(left))
        }
        (left, right) => {
            warn!(
                path = %path,
                left = %left.kind(),
                right = %right.kind(),
                "Policy fragments disagree on node kind"
            );
            Err(GatehouseError::shape_mismatch(
                path.clone(),
                left.kind(),
                right.kind(),
            ))
        }
    }
}

/// Left fold of [`zip_merge`] over all inputs; `None` when there are none
pub fn zip_merge_all<T>(
    trees: impl IntoIterator<Item = RuleTree<Vec<T>>>,
) -> Result<Option<RuleTree<Vec<T>>>> {
    let mut trees = trees.into_iter();
    let Some(first) = trees.next() else {
        return Ok(None);
    };
    trees.try_fold(first, zip_merge).map(Some)
}

/// Listify, zip-merge and fold every gathered sequence into one leaf
///
/// `combinator` names the operation in errors and logs. Requires at least
/// one input tree, and re-validates shapes even for a single input.
pub fn merge_with<T, U>(
    combinator: &str,
    trees: impl IntoIterator<Item = RuleTree<T>>,
    combine: impl FnMut(Vec<T>) -> U,
) -> Result<RuleTree<U>> {
    let trees: Vec<RuleTree<Vec<T>>> = trees.into_iter().map(listify).collect();
    let arity = trees.len();

    let merged = zip_merge_all(trees)?
        .ok_or_else(|| GatehouseError::empty_composition(combinator))?;
    let combined = merged.into_map_leaves(combine);

    debug!(
        combinator,
        arity,
        leaves = combined.leaf_count(),
        "Composed rule trees"
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    #[test]
    fn test_leaf_sequences_concatenate_in_input_order() {
        let a: RuleTree<&str> = rule_tree! { Query: { users: "a" } };
        let b: RuleTree<&str> = rule_tree! { Query: { users: "b" } };
        let c: RuleTree<&str> = rule_tree! { Query: { users: "c" } };

        let merged = zip_merge_all([a, b, c].map(listify)).unwrap().unwrap();
        assert_eq!(merged.lookup("Query", "users"), Some(&vec!["a", "b", "c"]));
    }

    #[test]
    fn test_absent_paths_copied_unchanged() {
        let a: RuleTree<u8> = rule_tree! { User: { name: 1 } };
        let b: RuleTree<u8> = rule_tree! { User: { role: 2 }, Query: { events: 3 } };

        let merged = zip_merge(listify(a), listify(b)).unwrap();
        assert_eq!(merged.lookup("User", "name"), Some(&vec![1]));
        assert_eq!(merged.lookup("User", "role"), Some(&vec![2]));
        assert_eq!(merged.lookup("Query", "events"), Some(&vec![3]));

        let order: Vec<String> = merged.leaves().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(order, ["User.name", "User.role", "Query.events"]);
    }

    #[test]
    fn test_shape_mismatch_is_fatal_both_ways() {
        let leaf: RuleTree<u8> = rule_tree! { Mutation: { review: 1 } };
        let branch: RuleTree<u8> = rule_tree! { Mutation: { review: { flagged: 2 } } };

        let err = zip_merge(listify(leaf.clone()), listify(branch.clone())).unwrap_err();
        assert_eq!(
            err,
            GatehouseError::shape_mismatch(
                FieldPath::parse("Mutation.review"),
                NodeKind::Leaf,
                NodeKind::Branch
            )
        );

        let err = zip_merge(listify(branch), listify(leaf)).unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::ShapeMismatch { left: NodeKind::Branch, right: NodeKind::Leaf, .. }
        ));
    }

    #[test]
    fn test_merge_with_requires_input() {
        let err = merge_with("or", Vec::<RuleTree<u8>>::new(), |v| v.len()).unwrap_err();
        assert_eq!(err, GatehouseError::empty_composition("or"));
    }

    #[test]
    fn test_merge_with_single_input_is_identity() {
        let tree: RuleTree<u8> = rule_tree! { Query: { users: 4, events: 5 } };
        let merged = merge_with("or", [tree.clone()], |mut v| v.remove(0)).unwrap();
        assert_eq!(merged, tree);
    }
}
