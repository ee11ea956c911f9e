//! Field-level evaluation of an authorization tree
//!
//! The shield resolves the rule for `Type.field`, applies the configured
//! fallback when the tree has none, and turns the outcome into an
//! [`AccessError`] for denied or undecidable accesses. The active tree sits
//! behind a lock so that a rebuilt tree can be swapped in while checks are
//! running; in-flight checks finish against the tree they started with.

use crate::access::{FieldAccess, FieldInfo};
use crate::combinators::PolicyTree;
use crate::config::ShieldConfig;
use crate::decision::Decision;
use crate::errors::{AccessError, GatehouseError, Result, RuleError};
use crate::rule::{allow, deny, Rule, RuleContext};
use gatehouse_core::FieldPath;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Field-level authorization over a swappable policy tree
pub struct Shield<C> {
    tree: RwLock<Arc<PolicyTree<C>>>,
    config: ShieldConfig,
    fallback: Rule<C>,
}

impl<C: RuleContext> Shield<C> {
    /// Shield over `tree`; a root leaf needs `allow_root_leaf`
    pub fn new(tree: PolicyTree<C>, config: ShieldConfig) -> Result<Self> {
        config.validate()?;
        Self::check_root(&tree, &config)?;

        let fallback = match config.fallback_rule.decision() {
            Decision::Allow => allow(),
            Decision::Deny => deny(),
        };
        info!(
            leaves = tree.leaf_count(),
            fallback = %fallback,
            debug = config.debug,
            "Shield ready"
        );
        Ok(Self {
            tree: RwLock::new(Arc::new(tree)),
            config,
            fallback,
        })
    }

    fn check_root(tree: &PolicyTree<C>, config: &ShieldConfig) -> Result<()> {
        if tree.is_leaf() && !config.allow_root_leaf {
            return Err(GatehouseError::invalid(
                "authorization tree root must be a branch keyed by type name",
            ));
        }
        Ok(())
    }

    /// Snapshot of the active tree
    pub fn tree(&self) -> Arc<PolicyTree<C>> {
        Arc::clone(&self.tree.read())
    }

    /// Active configuration
    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    /// Install a rebuilt tree, returning the previous one
    pub fn swap_tree(&self, tree: PolicyTree<C>) -> Result<Arc<PolicyTree<C>>> {
        Self::check_root(&tree, &self.config)?;
        let leaves = tree.leaf_count();
        let previous = std::mem::replace(&mut *self.tree.write(), Arc::new(tree));
        info!(
            previous_leaves = previous.leaf_count(),
            leaves, "Authorization tree swapped"
        );
        Ok(previous)
    }

    /// Rule guarding `type_name.field`, or the fallback rule
    pub fn rule_for(&self, type_name: &str, field: &str) -> Rule<C> {
        let tree = self.tree();
        match tree.lookup(type_name, field) {
            Some(rule) => rule.clone(),
            None => {
                debug!(type_name, field, fallback = %self.fallback, "No rule, using fallback");
                self.fallback.clone()
            }
        }
    }

    /// Decide one field access
    pub async fn check(&self, access: &FieldAccess<'_>, ctx: &C) -> std::result::Result<(), AccessError> {
        let info = access.info;
        let rule = self.rule_for(&info.parent_type, &info.field_name);
        let path = info.path();

        match rule.evaluate(access, ctx).await {
            Ok(Decision::Allow) => {
                debug!(%path, rule = %rule, "Access allowed");
                Ok(())
            }
            Ok(Decision::Deny) => {
                debug!(%path, rule = %rule, "Access denied");
                Err(AccessError::Denied { path })
            }
            Err(source) => {
                warn!(%path, rule = %rule, error = %source, "Rule evaluation failed");
                Err(AccessError::Rule {
                    path,
                    source: self.report(source),
                })
            }
        }
    }

    /// Decide an access given as `Type.field` with raw parent and arguments
    pub async fn check_path(
        &self,
        field: &str,
        parent: &Value,
        args: &Value,
        ctx: &C,
    ) -> std::result::Result<(), AccessError> {
        let Some(info) = FieldInfo::parse(field) else {
            return Err(AccessError::Denied {
                path: FieldPath::parse(field),
            });
        };
        self.check(&FieldAccess::new(parent, args, &info), ctx).await
    }

    fn report(&self, source: RuleError) -> RuleError {
        if self.config.debug {
            source
        } else {
            RuleError::new(source.rule, self.config.fallback_error.clone())
        }
    }
}
