use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables of the reconciler. Every field has a default matching the names and
/// sizes used by existing installations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub ownership: OwnershipConfig,
    #[serde(default)]
    pub hub: HubDefaults,
    #[serde(default)]
    pub delivery: DeliveryDefaults,
    #[serde(default)]
    pub default_resource_group: DefaultResourceGroup,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[source] ::config::ConfigError),

    #[error("config deserialize error: {0}")]
    Deserialize(#[source] ::config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

// Longest prefixes that still leave room for a 10-digit checksum within the
// remote API's name length limits (128, 64 and 50 characters).
const MAX_TOPIC_PREFIX_LEN: usize = 118;
const MAX_SUBSCRIPTION_PREFIX_LEN: usize = 54;
const MAX_HUB_PREFIX_LEN: usize = 40;

impl ReconcilerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request.timeout_ms == 0 {
            return Err(ConfigError::invalid("request.timeout_ms must be > 0"));
        }
        if self.hub.partition_count == 0 {
            return Err(ConfigError::invalid("hub.partition_count must be > 0"));
        }
        if self.hub.retention_days == 0 {
            return Err(ConfigError::invalid("hub.retention_days must be > 0"));
        }
        if self.delivery.max_attempts == 0 {
            return Err(ConfigError::invalid("delivery.max_attempts must be > 0"));
        }
        if self.delivery.event_ttl_minutes == 0 {
            return Err(ConfigError::invalid("delivery.event_ttl_minutes must be > 0"));
        }

        check_prefix(
            "naming.topic_prefix",
            &self.naming.topic_prefix,
            MAX_TOPIC_PREFIX_LEN,
            |c| c.is_ascii_alphanumeric() || c == '-',
        )?;
        check_prefix(
            "naming.subscription_prefix",
            &self.naming.subscription_prefix,
            MAX_SUBSCRIPTION_PREFIX_LEN,
            |c| c.is_ascii_alphanumeric() || c == '-',
        )?;
        check_prefix(
            "naming.hub_prefix",
            &self.naming.hub_prefix,
            MAX_HUB_PREFIX_LEN,
            |c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'),
        )?;
        if !self
            .naming
            .hub_prefix
            .starts_with(|c: char| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::invalid(
                "naming.hub_prefix must start with a letter or digit",
            ));
        }

        if self.ownership.kind.is_empty() {
            return Err(ConfigError::invalid("ownership.kind must not be empty"));
        }
        if self.default_resource_group.name.is_empty()
            || self.default_resource_group.region.is_empty()
        {
            return Err(ConfigError::invalid(
                "default_resource_group.name and default_resource_group.region must not be empty",
            ));
        }

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request.timeout_ms)
    }
}

fn check_prefix(
    field: &str,
    prefix: &str,
    max_len: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if prefix.len() > max_len {
        return Err(ConfigError::Invalid(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    if let Some(c) = prefix.chars().find(|c| !allowed(*c)) {
        return Err(ConfigError::Invalid(format!(
            "{field} contains invalid character {c:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Deadline of each individual remote call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}
fn default_timeout_ms() -> u64 {
    15_000
}
impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    #[serde(default = "default_subscription_prefix")]
    pub subscription_prefix: String,
    #[serde(default = "default_hub_prefix")]
    pub hub_prefix: String,
}
fn default_topic_prefix() -> String {
    "io-triggermesh-azureeventgridsources-".into()
}
fn default_subscription_prefix() -> String {
    "io-triggermesh-azureeventgridsources-".into()
}
fn default_hub_prefix() -> String {
    "io.triggermesh.azureeventgridsources-".into()
}
impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            topic_prefix: default_topic_prefix(),
            subscription_prefix: default_subscription_prefix(),
            hub_prefix: default_hub_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipConfig {
    /// Value of the owner kind tag written on adopted and created topics.
    #[serde(default = "default_owner_kind")]
    pub kind: String,
}
fn default_owner_kind() -> String {
    "azureeventgridsources.sources.triggermesh.io".into()
}
impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            kind: default_owner_kind(),
        }
    }
}

/// Sizing of created hubs. The defaults fit the lowest service tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubDefaults {
    #[serde(default = "default_partition_count")]
    pub partition_count: u32,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}
fn default_partition_count() -> u32 {
    4
}
fn default_retention_days() -> u32 {
    1
}
impl Default for HubDefaults {
    fn default() -> Self {
        Self {
            partition_count: default_partition_count(),
            retention_days: default_retention_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDefaults {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_event_ttl_minutes")]
    pub event_ttl_minutes: u32,
}
fn default_max_attempts() -> u32 {
    30
}
fn default_event_ttl_minutes() -> u32 {
    1440
}
impl Default for DeliveryDefaults {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            event_ttl_minutes: default_event_ttl_minutes(),
        }
    }
}

/// Resource group hosting topics of account-wide scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultResourceGroup {
    #[serde(default = "default_group_name")]
    pub name: String,
    #[serde(default = "default_group_region")]
    pub region: String,
}
fn default_group_name() -> String {
    "DEFAULT-EVENTGRID".into()
}
fn default_group_region() -> String {
    "westus2".into()
}
impl Default for DefaultResourceGroup {
    fn default() -> Self {
        Self {
            name: default_group_name(),
            region: default_group_region(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{ConfigError, ReconcilerConfig};
    use ::config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "gridsync.toml";

    pub fn load_config(path: Option<&str>) -> Result<ReconcilerConfig, ConfigError> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        // Environment variable overrides, e.g., GRIDSYNC__REQUEST__TIMEOUT_MS=5000
        builder = builder.add_source(
            Environment::with_prefix("GRIDSYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder.build().map_err(ConfigError::Build)?;
        let merged: ReconcilerConfig = cfg.try_deserialize().map_err(ConfigError::Deserialize)?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ReconcilerConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.hub.partition_count, 4);
        assert_eq!(cfg.delivery.event_ttl_minutes, 1440);
    }

    #[test]
    fn rejects_bad_prefixes() {
        let mut cfg = ReconcilerConfig::default();
        cfg.naming.topic_prefix = "topic.prefix-".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("naming.topic_prefix"));

        let mut cfg = ReconcilerConfig::default();
        cfg.naming.hub_prefix = "-hub".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ReconcilerConfig::default();
        cfg.naming.subscription_prefix = "s".repeat(MAX_SUBSCRIPTION_PREFIX_LEN + 1);
        assert!(cfg.validate().is_err());

        let mut cfg = ReconcilerConfig::default();
        cfg.naming.subscription_prefix.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_sizes() {
        let mut cfg = ReconcilerConfig::default();
        cfg.hub.partition_count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ReconcilerConfig::default();
        cfg.request.timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }
}
