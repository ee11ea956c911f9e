//! Gatehouse Core - Rule Tree Foundation
//!
//! This crate provides the pure data model that every other Gatehouse crate
//! builds on. It contains no predicate logic and no request-time state.
//!
//! # Key Types
//!
//! - `FieldPath`: ordered field names locating a node (`Event.title`)
//! - `RuleTree<T>`: recursive `Leaf(T) | Branch(name → RuleTree<T>)`
//! - `GatehouseError`: unified construction-time error
//!
//! # Merge Engine
//!
//! Trees are merged by wrapping every leaf into a one-element sequence
//! (`listify`), zipping trees path by path (`zip_merge`), and folding each
//! gathered sequence back into a single leaf (`merge_with`). Two trees that
//! disagree on Leaf vs Branch at a shared path never merge:
//!
//! ```rust
//! use gatehouse_core::{merge_with, rule_tree, RuleTree};
//!
//! let free: RuleTree<&str> = rule_tree! { Query: { events: "allow" } };
//! let premium: RuleTree<&str> = rule_tree! { Query: { events: "paid" } };
//!
//! let merged = merge_with("join", [free, premium], |leaves| leaves.join("|")).unwrap();
//! assert_eq!(merged.lookup("Query", "events").map(String::as_str), Some("allow|paid"));
//! ```

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Rule trees, field paths and the zip-merge engine
pub mod tree;

pub use errors::{GatehouseError, Result};
pub use tree::{
    listify, merge_with, zip_merge, zip_merge_all, FieldPath, IndexMap, NodeKind, RuleTree,
};
