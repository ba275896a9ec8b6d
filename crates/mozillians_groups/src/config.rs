//! Membership configuration.

use derive_getters::Getters;
use mozillians_core::Group;
use mozillians_error::{ConfigError, MozilliansResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings injected into [`crate::GroupManager`] at construction.
///
/// # Examples
///
/// ```
/// use mozillians_groups::MembershipConfig;
///
/// let config: MembershipConfig = toml::from_str(r#"
///     nda_group = "NDA"
///     nda_newsletters = ["mozilla-nda"]
/// "#).unwrap();
/// assert_eq!(config.nda_group(), "nda");
/// assert_eq!(*config.days_before_invalidation(), 14);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct MembershipConfig {
    /// Name of the group whose members get the NDA newsletter
    #[serde(default = "default_nda_group", deserialize_with = "lowercase")]
    nda_group: String,
    /// Newsletter list ids for NDA members
    #[serde(default = "default_nda_newsletters")]
    nda_newsletters: Vec<String>,
    /// How many days before invalidation members are warned
    #[serde(default = "default_days_before_invalidation")]
    days_before_invalidation: u32,
    /// Delivery retry policy for the notification worker
    #[serde(default)]
    retry: RetryConfig,
}

impl MembershipConfig {
    /// Returns a builder for constructing a MembershipConfig.
    pub fn builder() -> MembershipConfigBuilder {
        MembershipConfigBuilder::default()
    }

    /// Load configuration from a TOML file.
    #[tracing::instrument(skip(path))]
    pub fn from_file(path: impl AsRef<Path>) -> MozilliansResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        tracing::debug!(nda_group = %config.nda_group, "Loaded membership configuration");
        Ok(config)
    }

    /// Whether `group` is the NDA group.
    pub fn is_nda_group(&self, group: &Group) -> bool {
        group.name.eq_ignore_ascii_case(&self.nda_group)
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            nda_group: default_nda_group(),
            nda_newsletters: default_nda_newsletters(),
            days_before_invalidation: default_days_before_invalidation(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_nda_group() -> String {
    "nda".to_string()
}

fn default_nda_newsletters() -> Vec<String> {
    vec!["mozilla-nda".to_string()]
}

fn default_days_before_invalidation() -> u32 {
    14
}

fn lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_lowercase())
}

/// Retry policy for notification delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of delivery attempts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Backoff before the second attempt, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Backoff to wait after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(millis.min(self.max_backoff_ms as f64) as u64)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}
