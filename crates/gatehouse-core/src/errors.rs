//! Unified error system for Gatehouse core
//!
//! A single error type for construction-time failures. Evaluation-time
//! failures are values inside rule outcomes and live in
//! `gatehouse-authorization`.

use crate::tree::{FieldPath, NodeKind};
use serde::{Deserialize, Serialize};

/// Unified error type for tree construction and configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GatehouseError {
    /// Two merged trees disagree on whether a shared path is terminal
    #[error("Shape mismatch at `{path}`: {left} on the left, {right} on the right")]
    ShapeMismatch {
        /// Path where the shapes diverged
        path: FieldPath,
        /// Node kind in the left operand
        left: NodeKind,
        /// Node kind in the right operand
        right: NodeKind,
    },

    /// A combinator was called without any input tree
    #[error("Empty composition: {combinator} needs at least one tree")]
    EmptyComposition {
        /// Name of the combinator that received no input
        combinator: String,
    },

    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl GatehouseError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(path: FieldPath, left: NodeKind, right: NodeKind) -> Self {
        Self::ShapeMismatch { path, left, right }
    }

    /// Create an empty composition error
    pub fn empty_composition(combinator: impl Into<String>) -> Self {
        Self::EmptyComposition {
            combinator: combinator.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error comes from incompatible policy fragments
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

/// Standard Result type for Gatehouse operations
pub type Result<T> = std::result::Result<T, GatehouseError>;
