//! Account tiers of the event platform

use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege tier held by a user account
///
/// Tiers do not imply one another; the policy composes broader tiers from
/// the narrower tiers' trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Every logged-in account
    Free,
    /// Paying account
    Premium,
    /// Moderates categories
    Moderator,
    /// Platform operator
    Administrator,
}

impl Role {
    /// Every tier, narrowest first
    pub const ALL: [Role; 4] = [
        Role::Free,
        Role::Premium,
        Role::Moderator,
        Role::Administrator,
    ];

    /// Name as stored and shown, e.g. `PREMIUM`
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Free => "FREE",
            Role::Premium => "PREMIUM",
            Role::Moderator => "MODERATOR",
            Role::Administrator => "ADMINISTRATOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| StoreError::UnknownRole(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!("premium".parse::<Role>().unwrap(), Role::Premium);
        assert_eq!(Role::Administrator.to_string(), "ADMINISTRATOR");
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"MODERATOR\"");
    }
}
