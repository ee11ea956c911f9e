//! Tree combinators: OR, AND, REPLACE
//!
//! One zip-then-fold traversal parameterised by how co-located rules are
//! reduced:
//!
//! ```text
//! trees ─listify─▶ [rule] trees ─zip_merge*─▶ [rule, rule, ..] tree ─reduce─▶ rule tree
//! ```
//!
//! All three need at least one tree and reject Leaf/Branch disagreements.
//! A single-tree OR or AND returns a tree equal in shape and rules to its
//! input.

use crate::errors::Result;
use crate::rule::{and, or, Rule, RuleContext};
use gatehouse_core::{merge_with, RuleTree};

/// Rule tree whose leaves are rules over request context `C`
pub type PolicyTree<C> = RuleTree<Rule<C>>;

/// Merge trees, reducing the rules gathered at each path with `reduce`
pub fn merge_rules<C: RuleContext>(
    combinator: &str,
    trees: impl IntoIterator<Item = PolicyTree<C>>,
    reduce: impl FnMut(Vec<Rule<C>>) -> Rule<C>,
) -> Result<PolicyTree<C>> {
    merge_with(combinator, trees, reduce)
}

/// Path-wise disjunction of all trees
pub fn or_trees<C: RuleContext>(trees: impl IntoIterator<Item = PolicyTree<C>>) -> Result<PolicyTree<C>> {
    merge_rules("OR", trees, |rules| or(rules))
}

/// Path-wise conjunction of all trees
pub fn and_trees<C: RuleContext>(trees: impl IntoIterator<Item = PolicyTree<C>>) -> Result<PolicyTree<C>> {
    merge_rules("AND", trees, |rules| and(rules))
}

/// Merged shape of all trees with `rule` stamped at every leaf
pub fn replace_trees<C: RuleContext>(
    trees: impl IntoIterator<Item = PolicyTree<C>>,
    rule: Rule<C>,
) -> Result<PolicyTree<C>> {
    merge_rules("REPLACE", trees, |_| rule.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{allow, deny};
    use gatehouse_core::{rule_tree, GatehouseError};

    fn names(tree: &PolicyTree<()>) -> Vec<(String, String)> {
        tree.leaves()
            .into_iter()
            .map(|(path, rule)| (path.to_string(), rule.name().to_string()))
            .collect()
    }

    #[test]
    fn test_or_gathers_in_declaration_order() {
        let a: PolicyTree<()> = rule_tree! { Query: { users: allow() } };
        let b: PolicyTree<()> = rule_tree! { Query: { users: deny(), events: allow() } };

        let merged = or_trees([a, b]).unwrap();
        assert_eq!(
            names(&merged),
            [
                ("Query.users".to_string(), "or(allow, deny)".to_string()),
                ("Query.events".to_string(), "allow".to_string()),
            ]
        );
    }

    #[test]
    fn test_and_single_tree_is_identity() {
        let tree: PolicyTree<()> = rule_tree! { User: { name: allow(), role: deny() } };
        let merged = and_trees([tree.clone()]).unwrap();
        assert_eq!(names(&merged), names(&tree));
        let before = tree.lookup("User", "role").unwrap();
        assert!(merged.lookup("User", "role").unwrap().ptr_eq(before));
    }

    #[test]
    fn test_replace_stamps_one_rule() {
        let a: PolicyTree<()> = rule_tree! { Query: { users: allow() }, Post: { locked: deny() } };
        let gate = deny();

        let stamped = replace_trees([a.clone()], gate.clone()).unwrap();
        assert_eq!(stamped.map_leaves(|_| ()), a.map_leaves(|_| ()));
        for (_, rule) in stamped.leaves() {
            assert!(rule.ptr_eq(&gate));
        }
    }

    #[test]
    fn test_combinators_reject_mismatched_shapes() {
        let leaf: PolicyTree<()> = rule_tree! { Event: allow() };
        let branch: PolicyTree<()> = rule_tree! { Event: { title: allow() } };

        for result in [
            or_trees([leaf.clone(), branch.clone()]),
            and_trees([branch.clone(), leaf.clone()]),
            replace_trees([leaf.clone(), branch.clone()], allow()),
        ] {
            assert!(matches!(result, Err(GatehouseError::ShapeMismatch { .. })));
        }
    }

    #[test]
    fn test_combinators_need_input() {
        let err = or_trees(Vec::<PolicyTree<()>>::new()).unwrap_err();
        assert_eq!(err, GatehouseError::empty_composition("OR"));
    }
}
