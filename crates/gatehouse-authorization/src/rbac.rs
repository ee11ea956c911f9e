//! Role composition builder
//!
//! Turns `{role → tree}` plus an optional default tree into one tree where
//! every leaf reads
//!
//! ```text
//! Default(path) ∨ ⋁_R ( Leaf_R(path) ∧ caller_has_role(R) )
//! ```
//!
//! over the roles that define `path`. Each role's own rule still runs; the
//! gate only adds the membership check. There is no implicit role
//! hierarchy: a broader role is handed in already composed from narrower
//! ones, e.g. `or_trees([free, premium])`.

use crate::combinators::{and_trees, or_trees, replace_trees, PolicyTree};
use crate::errors::{GatehouseError, Result};
use crate::role::{caller_has_role, CallerRole, Role};
use crate::rule::RuleContext;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Gate every leaf of `tree` on the caller holding `role`
pub fn gate_role<R, C>(role: &R, tree: PolicyTree<C>) -> Result<PolicyTree<C>>
where
    R: Role,
    C: RuleContext + CallerRole<R>,
{
    let gate = replace_trees([tree.clone()], caller_has_role(role.clone()))?;
    and_trees([tree, gate])
}

/// Compose per-role trees and a default tree into one authorization tree
///
/// Roles are gated and unioned in iteration order. Fails when a role tree
/// and another fragment disagree on a path's shape, or when there is
/// nothing to compose.
pub fn rbac<R, C>(
    roles: impl IntoIterator<Item = (R, PolicyTree<C>)>,
    default: Option<PolicyTree<C>>,
) -> Result<PolicyTree<C>>
where
    R: Role,
    C: RuleContext + CallerRole<R>,
{
    let gated = roles
        .into_iter()
        .map(|(role, tree)| {
            debug!(%role, leaves = tree.leaf_count(), "Gating role policy");
            gate_role(&role, tree)
        })
        .collect::<Result<Vec<_>>>()?;

    let fragments: Vec<PolicyTree<C>> = default.into_iter().chain(gated).collect();
    if fragments.is_empty() {
        return Err(GatehouseError::empty_composition("rbac"));
    }
    or_trees(fragments)
}

/// Per-role policies plus the role-less default, built into one tree
pub struct RoleRuleSet<R, C> {
    roles: IndexMap<R, PolicyTree<C>>,
    default: Option<PolicyTree<C>>,
}

impl<R, C> Default for RoleRuleSet<R, C> {
    fn default() -> Self {
        Self {
            roles: IndexMap::new(),
            default: None,
        }
    }
}

impl<R, C> RoleRuleSet<R, C>
where
    R: Role,
    C: RuleContext + CallerRole<R>,
{
    /// Empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy of `role`; a later call for the same role replaces it
    pub fn with_role(mut self, role: R, tree: PolicyTree<C>) -> Self {
        if self.roles.insert(role.clone(), tree).is_some() {
            warn!(%role, "Role policy declared twice; keeping the last one");
        }
        self
    }

    /// Set the tree applied regardless of role
    pub fn with_default(mut self, tree: PolicyTree<C>) -> Self {
        self.default = Some(tree);
        self
    }

    /// Declared policy of `role`
    pub fn role(&self, role: &R) -> Option<&PolicyTree<C>> {
        self.roles.get(role)
    }

    /// Declared roles, in declaration order
    pub fn roles(&self) -> impl Iterator<Item = &R> {
        self.roles.keys()
    }

    /// Tree applied regardless of role, if any
    pub fn default_tree(&self) -> Option<&PolicyTree<C>> {
        self.default.as_ref()
    }

    /// Compose the gated tree with [`rbac`]
    pub fn build(self) -> Result<PolicyTree<C>> {
        rbac(self.roles, self.default)
    }
}
