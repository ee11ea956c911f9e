#![deny(clippy::await_holding_lock)]
//! # Gatehouse Authorization - Layer 2: Role-Gated Rule Trees
//!
//! Builds one authorization tree per schema from per-role policy fragments
//! and evaluates it per field access.
//!
//! ```text
//! per-role trees ─REPLACE+AND─▶ gated trees ─OR(default, ..)─▶ final tree ─▶ Shield
//! ```
//!
//! - `rule`: leaf predicate contract and rule logic (`allow`, `deny`, `and`, `or`, `not`, `chain`)
//! - `combinators`: tree-level OR / AND / REPLACE over the zip-merge engine
//! - `rbac`: role gating and union with the default tree
//! - `shield`: field lookup, fallback decision and error reporting
//!
//! Trees are immutable once built. Live reconfiguration builds a new tree and
//! swaps it into the [`Shield`].

pub mod access;
pub mod combinators;
pub mod config;
pub mod decision;
pub mod errors;
pub mod rbac;
pub mod role;
pub mod rule;
pub mod shield;

pub use access::{FieldAccess, FieldInfo};
pub use combinators::{and_trees, merge_rules, or_trees, replace_trees, PolicyTree};
pub use config::{FallbackRule, ShieldConfig};
pub use decision::{Decision, Outcome};
pub use errors::{AccessError, GatehouseError, Result, RuleError};
pub use rbac::{gate_role, rbac, RoleRuleSet};
pub use role::{caller_has_role, CallerRole, Role};
pub use rule::{allow, and, chain, deny, not, or, Predicate, Rule, RuleContext};
pub use shield::Shield;

pub use gatehouse_core::{rule_tree, FieldPath, RuleTree};
