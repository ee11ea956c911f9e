//! Authorization error handling
//!
//! Construction-time failures reuse the unified `GatehouseError` from
//! gatehouse-core. Evaluation-time failures are `RuleError` values carried
//! inside rule outcomes, and `AccessError` is what a field check reports.

pub use gatehouse_core::{GatehouseError, Result};

use gatehouse_core::FieldPath;

/// A leaf predicate could not reach a decision
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule `{rule}` failed: {message}")]
pub struct RuleError {
    /// Name of the failing rule
    pub rule: String,
    /// What went wrong
    pub message: String,
}

impl RuleError {
    /// Failure of the rule `rule`
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Result of a denied or undecidable field check
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The rule for this field denied access
    #[error("Not authorised to access `{path}`")]
    Denied {
        /// Field that was denied
        path: FieldPath,
    },

    /// The rule for this field could not be evaluated
    #[error("Could not authorise `{path}`: {source}")]
    Rule {
        /// Field being checked
        path: FieldPath,
        /// Underlying rule failure
        source: RuleError,
    },
}

impl AccessError {
    /// Whether access was cleanly denied rather than undetermined
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Field the error refers to
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Denied { path } | Self::Rule { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_display() {
        let denied = AccessError::Denied {
            path: FieldPath::parse("Mutation.setRole"),
        };
        assert!(denied.is_denied());
        assert_eq!(denied.to_string(), "Not authorised to access `Mutation.setRole`");

        let failed = AccessError::Rule {
            path: FieldPath::parse("Event.title"),
            source: RuleError::new("caller_attends_parent", "event store unavailable"),
        };
        assert!(!failed.is_denied());
        assert_eq!(failed.path().to_string(), "Event.title");
        assert!(failed.to_string().contains("event store unavailable"));
    }
}
