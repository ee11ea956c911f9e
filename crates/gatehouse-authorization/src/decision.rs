//! Decisions reached by rules

use crate::errors::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clean result of evaluating a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Access is allowed
    Allow,
    /// Access is denied
    Deny,
}

impl Decision {
    /// Whether this is `Allow`
    pub fn is_allow(self) -> bool {
        self == Decision::Allow
    }

    /// Swap Allow and Deny
    pub fn invert(self) -> Self {
        match self {
            Decision::Allow => Decision::Deny,
            Decision::Deny => Decision::Allow,
        }
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Deny => f.write_str("deny"),
        }
    }
}

/// Allow, Deny, or an evaluation error
pub type Outcome = Result<Decision, RuleError>;
