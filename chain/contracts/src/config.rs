//! Organization configuration
//!
//! Loaded once at organization initialization; only the invite-only flag
//! is mutable afterwards, and only through `set_invite_only`.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Initial settings of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Display name of the organization.
    pub name: String,
    /// Whether self-service `join` is closed at creation.
    pub invite_only: bool,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: "DAO".to_string(),
            invite_only: false,
        }
    }
}

impl OrganizationConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrganizationConfig::default();
        assert_eq!(config.name, "DAO");
        assert!(!config.invite_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = OrganizationConfig::from_json(r#"{"invite_only": true}"#).unwrap();
        assert!(config.invite_only);
        assert_eq!(config.name, "DAO");
    }

    #[test]
    fn test_from_json_full() {
        let config =
            OrganizationConfig::from_json(r#"{"name": "Commons", "invite_only": false}"#).unwrap();
        assert_eq!(config.name, "Commons");
    }

    #[test]
    fn test_from_json_malformed() {
        let result = OrganizationConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = OrganizationConfig::from_json(r#"{"name": "   "}"#);
        assert_eq!(result, Err(ConfigError::EmptyName));
    }
}
