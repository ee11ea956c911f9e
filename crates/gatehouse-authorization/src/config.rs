//! Shield configuration
//!
//! Loaded from TOML, overridable from `GATEHOUSE_*` environment variables,
//! validated before a [`Shield`](crate::Shield) accepts it.
//!
//! ```toml
//! fallback_rule = "deny"
//! debug = false
//! fallback_error = "Not Authorised!"
//! allow_root_leaf = false
//! ```

use crate::decision::Decision;
use crate::errors::{GatehouseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "GATEHOUSE_";

/// Option names accepted by [`ShieldConfig::set_from_string`]
pub const OPTION_KEYS: [&str; 4] = ["fallback_rule", "debug", "fallback_error", "allow_root_leaf"];

/// Decision applied when the tree has no rule for a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackRule {
    /// Allow fields without a rule
    Allow,
    /// Deny fields without a rule
    #[default]
    Deny,
}

impl FallbackRule {
    /// Decision this fallback stands for
    pub fn decision(self) -> Decision {
        match self {
            FallbackRule::Allow => Decision::Allow,
            FallbackRule::Deny => Decision::Deny,
        }
    }
}

impl FromStr for FallbackRule {
    type Err = GatehouseError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(FallbackRule::Allow),
            "deny" => Ok(FallbackRule::Deny),
            other => Err(GatehouseError::config(format!(
                "fallback_rule must be `allow` or `deny`, got `{other}`"
            ))),
        }
    }
}

/// Evaluation layer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Decision for fields without a rule
    pub fallback_rule: FallbackRule,
    /// Propagate rule error details verbatim instead of `fallback_error`
    pub debug: bool,
    /// Message reported for rule errors when `debug` is off
    pub fallback_error: String,
    /// Accept a tree whose root is a single leaf
    pub allow_root_leaf: bool,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            fallback_rule: FallbackRule::Deny,
            debug: false,
            fallback_error: "Not Authorised!".to_string(),
            allow_root_leaf: false,
        }
    }
}

impl ShieldConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No shield config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            GatehouseError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| GatehouseError::config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| GatehouseError::config(format!("Failed to serialize config: {e}")))
    }

    /// Apply `GATEHOUSE_FALLBACK_RULE`, `GATEHOUSE_DEBUG`, `GATEHOUSE_FALLBACK_ERROR`
    /// and `GATEHOUSE_ALLOW_ROOT_LEAF`
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `GATEHOUSE_*` overrides from an explicit variable list
    ///
    /// Variables that name no shield option are skipped with a warning.
    pub fn merge_with_vars(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let config_key = config_key.to_lowercase();
            if !OPTION_KEYS.contains(&config_key.as_str()) {
                warn!(variable = %key, "Ignoring unknown shield override");
                continue;
            }
            self.set_from_string(&config_key, &value)?;
        }
        self.validate()
    }

    /// Set one option from its string form
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "fallback_rule" => self.fallback_rule = value.parse()?,
            "debug" => self.debug = parse_bool(key, value)?,
            "fallback_error" => self.fallback_error = value.to_string(),
            "allow_root_leaf" => self.allow_root_leaf = parse_bool(key, value)?,
            other => {
                return Err(GatehouseError::config(format!("Unknown shield option `{other}`")))
            }
        }
        Ok(())
    }

    /// Reject an empty `fallback_error`
    pub fn validate(&self) -> Result<()> {
        if self.fallback_error.trim().is_empty() {
            return Err(GatehouseError::config("fallback_error must not be empty"));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GatehouseError::config(format!(
            "{key} must be a boolean, got `{value}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_deny() {
        let config = ShieldConfig::default();
        assert_eq!(config.fallback_rule.decision(), Decision::Deny);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ShieldConfig::from_toml_str("debug = true\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.fallback_rule, FallbackRule::Deny);
        assert_eq!(config.fallback_error, "Not Authorised!");
    }

    #[test]
    fn test_invalid_toml() {
        let err = ShieldConfig::from_toml_str("fallback_rule = \"maybe\"").unwrap_err();
        assert!(matches!(err, GatehouseError::Config { .. }));

        let err = ShieldConfig::from_toml_str("fallback_error = \"  \"").unwrap_err();
        assert!(err.to_string().contains("fallback_error"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ShieldConfig::default();
        config
            .merge_with_vars([
                ("GATEHOUSE_FALLBACK_RULE".to_string(), "Allow".to_string()),
                ("GATEHOUSE_DEBUG".to_string(), "1".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ])
            .unwrap();
        assert_eq!(config.fallback_rule, FallbackRule::Allow);
        assert!(config.debug);

        let err = config
            .merge_with_vars([("GATEHOUSE_DEBUG".to_string(), "sometimes".to_string())])
            .unwrap_err();
        assert!(err.to_string().contains("debug"));
    }

    #[test]
    fn test_unknown_env_overrides_are_skipped() {
        let mut config = ShieldConfig::default();
        config
            .merge_with_vars([
                ("GATEHOUSE_LOG".to_string(), "debug".to_string()),
                ("GATEHOUSE_FALLBACK_ERROR".to_string(), "Forbidden".to_string()),
            ])
            .unwrap();
        assert_eq!(config.fallback_error, "Forbidden");
        assert!(!config.debug);

        let err = config.set_from_string("log", "debug").unwrap_err();
        assert!(err.to_string().contains("log"));
    }

    #[test]
    fn test_load_from_file() {
        let missing = ShieldConfig::load_from_file(Path::new("/nonexistent/gatehouse.toml")).unwrap();
        assert_eq!(missing, ShieldConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fallback_rule = \"allow\"\nfallback_error = \"nope\"").unwrap();
        let loaded = ShieldConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.fallback_rule, FallbackRule::Allow);
        assert_eq!(loaded.fallback_error, "nope");

        let round_trip = ShieldConfig::from_toml_str(&loaded.to_toml_string().unwrap()).unwrap();
        assert_eq!(round_trip, loaded);
    }
}
