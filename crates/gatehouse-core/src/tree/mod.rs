//! Layer 1: Rule Tree Core Types
//!
//! Per-field permission declarations as typed trees. All types are pure
//! structures; trees are built once and then shared read-only.
//!
//! **Key Types**:
//! - **FieldPath**: ordered field names identifying a node
//! - **RuleTree**: `Leaf(T)` or `Branch(name → RuleTree<T>)`
//! - **NodeKind**: Leaf vs Branch, the unit of the shape invariant
//!
//! **Design Principles**:
//! - Shape-checked: merging never resolves a Leaf/Branch conflict by guessing
//! - Order-preserving: branch keys and gathered leaf sequences keep declaration order
//! - Pure: every transform returns a new tree

#[macro_use]
mod macros;
pub mod merge;
pub mod path;
pub mod types;

pub use indexmap::IndexMap;
pub use merge::{listify, merge_with, zip_merge, zip_merge_all};
pub use path::FieldPath;
pub use types::{NodeKind, RuleTree};
