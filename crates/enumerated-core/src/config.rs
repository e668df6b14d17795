//! Reflection configuration.
//!
//! The host engine's generation decides how some parts of the reflection
//! contract behave. That choice is made once, when reflections are built, by
//! picking a [`ContractProfile`]; nothing inspects the environment per call.
//!
//! # Environment Variables
//!
//! - `ENUMERATED_CONTRACT_PROFILE=legacy|current` - contract profile
//! - `ENUMERATED_COLLISIONS=prefer|reject` - same-name collision policy

use crate::error::{ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the contract profile.
pub const PROFILE_ENV: &str = "ENUMERATED_CONTRACT_PROFILE";

/// Environment variable selecting the collision policy.
pub const COLLISIONS_ENV: &str = "ENUMERATED_COLLISIONS";

/// Shape of the reflection contract expected by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractProfile {
    /// Older engines: eager loading an instance-dependent scope only warns.
    Legacy,
    /// Current engines: eager loading an instance-dependent scope is an error.
    #[default]
    Current,
}

impl ContractProfile {
    /// Whether instance-dependent scopes are rejected when preloading.
    pub const fn rejects_instance_scopes(self) -> bool {
        matches!(self, ContractProfile::Current)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ContractProfile::Legacy => "legacy",
            ContractProfile::Current => "current",
        }
    }
}

impl fmt::Display for ContractProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(ContractProfile::Legacy),
            "current" => Ok(ContractProfile::Current),
            other => Err(invalid_value(PROFILE_ENV, other, "legacy, current")),
        }
    }
}

/// What happens when an enumeration and an ordinary association share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The enumeration silently shadows the ordinary association.
    #[default]
    Prefer,
    /// The collision is a declaration error.
    Reject,
}

impl CollisionPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            CollisionPolicy::Prefer => "prefer",
            CollisionPolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "prefer" => Ok(CollisionPolicy::Prefer),
            "reject" => Ok(CollisionPolicy::Reject),
            other => Err(invalid_value(COLLISIONS_ENV, other, "prefer, reject")),
        }
    }
}

fn invalid_value(key: &str, value: &str, expected: &str) -> Error {
    Error::Config(ConfigError {
        message: format!("invalid {key} value '{value}' (expected one of: {expected})"),
        source: None,
    })
}

/// Settings applied to every reflection built under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Contract profile.
    pub profile: ContractProfile,
    /// Same-name collision policy.
    pub collisions: CollisionPolicy,
}

impl ReflectionConfig {
    /// Create a configuration with all defaults.
    pub const fn new() -> Self {
        Self {
            profile: ContractProfile::Current,
            collisions: CollisionPolicy::Prefer,
        }
    }

    /// Set the contract profile.
    #[must_use]
    pub const fn profile(mut self, profile: ContractProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the collision policy.
    #[must_use]
    pub const fn collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    /// Load from `ENUMERATED_*` environment variables; unset ones keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(value) = lookup(PROFILE_ENV) {
            config.profile = value.parse()?;
        }
        if let Some(value) = lookup(COLLISIONS_ENV) {
            config.collisions = value.parse()?;
        }
        tracing::debug!(
            profile = %config.profile,
            collisions = %config.collisions,
            "Loaded reflection config"
        );
        Ok(config)
    }

    /// Parse from a JSON document such as `{"profile": "legacy"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                message: format!("invalid reflection config: {e}"),
                source: Some(Box::new(e)),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ReflectionConfig::default();
        assert_eq!(config, ReflectionConfig::new());
        assert_eq!(config.profile, ContractProfile::Current);
        assert_eq!(config.collisions, CollisionPolicy::Prefer);
        assert!(config.profile.rejects_instance_scopes());
        assert!(!ContractProfile::Legacy.rejects_instance_scopes());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(PROFILE_ENV, "Legacy"), (COLLISIONS_ENV, " reject ")]);
        let config =
            ReflectionConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.profile, ContractProfile::Legacy);
        assert_eq!(config.collisions, CollisionPolicy::Reject);
    }

    #[test]
    fn test_from_lookup_unset_keeps_defaults() {
        let config = ReflectionConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ReflectionConfig::new());
    }

    #[test]
    fn test_from_lookup_rejects_unknown_value() {
        let err = ReflectionConfig::from_lookup(|key| {
            (key == PROFILE_ENV).then(|| "rails9".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("rails9"));
    }

    #[test]
    fn test_from_json() {
        let config = ReflectionConfig::from_json(r#"{"collisions": "reject"}"#).unwrap();
        assert_eq!(config.profile, ContractProfile::Current);
        assert_eq!(config.collisions, CollisionPolicy::Reject);

        assert!(ReflectionConfig::from_json(r#"{"profile": 3}"#).is_err());
    }
}
