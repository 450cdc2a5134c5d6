//! Configuration loading and typed config structures for Herald.
//!
//! The canonical configuration lives in `herald-config.yaml` next to the
//! binary. Every field has a default, so an empty file (or no sections at
//! all) yields a valid, though inactive, configuration: the webhook URL
//! defaults to a placeholder and the service stays idle until a real URL
//! is supplied.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Shortest accepted `limits.title_len`. Every fixed card title fits.
pub const MIN_TITLE_LEN: usize = 32;

/// Webhook URL shipped in the sample config. Treated as "not configured".
pub const PLACEHOLDER_WEBHOOK_URL: &str = "https://discord.com/api/webhooks/your-webhook-url-here";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot be used.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Why the notifier is switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inactive {
    /// `webhook.enabled` is false.
    Disabled,
    /// No webhook URL was given.
    MissingUrl,
    /// The sample placeholder URL was left in place.
    PlaceholderUrl,
}

impl core::fmt::Display for Inactive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disabled => write!(f, "webhook notifications are disabled"),
            Self::MissingUrl => write!(f, "webhook URL is empty"),
            Self::PlaceholderUrl => {
                write!(f, "webhook URL is still the placeholder; replace it with a real one")
            }
        }
    }
}

/// Top-level Herald configuration.
///
/// Mirrors the structure of `herald-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeraldConfig {
    /// Delivery endpoint settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Cycle timing and mode.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Report size settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Payload limits enforced by the assembler.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Where the entity export is read from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeraldConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `HERALD_WEBHOOK_URL` overrides `webhook.url`
    /// - `HERALD_WORLD_PATH` overrides `source.world_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the limits cannot be honored.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.limits.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from any key lookup. Split out so tests do not have
    /// to touch the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("HERALD_WEBHOOK_URL") {
            self.webhook.url = url;
        }
        if let Some(path) = lookup("HERALD_WORLD_PATH") {
            self.source.world_path = PathBuf::from(path);
        }
    }

    /// Why the notifier should stay idle, or `None` when it may run.
    pub fn inactive_reason(&self) -> Option<Inactive> {
        let url = self.webhook.url.trim();
        if !self.webhook.enabled {
            Some(Inactive::Disabled)
        } else if url.is_empty() {
            Some(Inactive::MissingUrl)
        } else if url == PLACEHOLDER_WEBHOOK_URL {
            Some(Inactive::PlaceholderUrl)
        } else {
            None
        }
    }

    /// Whether the notifier should run.
    pub fn is_active(&self) -> bool {
        self.inactive_reason().is_none()
    }
}

/// Delivery endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL.
    #[serde(default = "default_webhook_url")]
    pub url: String,

    /// Master switch.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Optional display name override for posted messages.
    #[serde(default)]
    pub username: Option<String>,

    /// HTTP timeout for one delivery, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            enabled: default_enabled(),
            username: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cycle timing and mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycles.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Report every entity each cycle instead of only changes.
    #[serde(default)]
    pub full_updates: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            full_updates: false,
        }
    }
}

/// Report size settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Most entities shown in one report.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
        }
    }
}

/// Payload limits. Defaults match the webhook endpoint's documented caps.
///
/// Text limits count characters; `payload_hard_cap` counts encoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Cards per message.
    #[serde(default = "default_max_cards")]
    pub max_cards: usize,
    /// Fields per card.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
    /// Detail fields placed per card before a new one is opened.
    #[serde(default = "default_fields_per_card")]
    pub fields_per_card: usize,
    /// Card title length.
    #[serde(default = "default_title_len")]
    pub title_len: usize,
    /// Card description length.
    #[serde(default = "default_description_len")]
    pub description_len: usize,
    /// Field name length.
    #[serde(default = "default_field_name_len")]
    pub field_name_len: usize,
    /// Field value length.
    #[serde(default = "default_field_value_len")]
    pub field_value_len: usize,
    /// Footer text length.
    #[serde(default = "default_footer_len")]
    pub footer_len: usize,
    /// Total text across all cards in one message.
    #[serde(default = "default_total_text")]
    pub total_text: usize,
    /// Budget always left unused.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: usize,
    /// Remaining budget required to open another card.
    #[serde(default = "default_open_threshold")]
    pub open_threshold: usize,
    /// Maximum encoded payload size in bytes.
    #[serde(default = "default_payload_hard_cap")]
    pub payload_hard_cap: usize,
}

impl LimitsConfig {
    /// Reject limits under which no message can be assembled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };
        if self.max_cards == 0 {
            return invalid("limits.max_cards", "must be at least 1".to_owned());
        }
        if self.max_fields == 0 {
            return invalid("limits.max_fields", "must be at least 1".to_owned());
        }
        if self.fields_per_card == 0 {
            return invalid("limits.fields_per_card", "must be at least 1".to_owned());
        }
        if self.title_len < MIN_TITLE_LEN {
            return invalid(
                "limits.title_len",
                format!("{} is shorter than the minimum of {MIN_TITLE_LEN}", self.title_len),
            );
        }
        if self.safety_margin > self.total_text {
            return invalid(
                "limits.safety_margin",
                format!("{} exceeds total_text {}", self.safety_margin, self.total_text),
            );
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_cards: default_max_cards(),
            max_fields: default_max_fields(),
            fields_per_card: default_fields_per_card(),
            title_len: default_title_len(),
            description_len: default_description_len(),
            field_name_len: default_field_name_len(),
            field_value_len: default_field_value_len(),
            footer_len: default_footer_len(),
            total_text: default_total_text(),
            safety_margin: default_safety_margin(),
            open_threshold: default_open_threshold(),
            payload_hard_cap: default_payload_hard_cap(),
        }
    }
}

/// Where the entity export is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Path of the JSON world export written by the host.
    #[serde(default = "default_world_path")]
    pub world_path: PathBuf,

    /// Read host events as JSON lines from stdin.
    #[serde(default = "default_enabled")]
    pub stdin_events: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            world_path: default_world_path(),
            stdin_events: default_enabled(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_webhook_url() -> String {
    PLACEHOLDER_WEBHOOK_URL.to_owned()
}

const fn default_enabled() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_tick_interval_secs() -> u64 {
    60
}

const fn default_max_records() -> usize {
    25
}

const fn default_max_cards() -> usize {
    10
}

const fn default_max_fields() -> usize {
    25
}

const fn default_fields_per_card() -> usize {
    10
}

const fn default_title_len() -> usize {
    256
}

const fn default_description_len() -> usize {
    4096
}

const fn default_field_name_len() -> usize {
    256
}

const fn default_field_value_len() -> usize {
    1024
}

const fn default_footer_len() -> usize {
    2048
}

const fn default_total_text() -> usize {
    6000
}

const fn default_safety_margin() -> usize {
    200
}

const fn default_open_threshold() -> usize {
    500
}

const fn default_payload_hard_cap() -> usize {
    8000
}

fn default_world_path() -> PathBuf {
    PathBuf::from("world-export.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_inactive_placeholder() {
        let config = HeraldConfig::default();
        assert_eq!(config.schedule.tick_interval_secs, 60);
        assert!(!config.schedule.full_updates);
        assert_eq!(config.report.max_records, 25);
        assert_eq!(config.limits.max_cards, 10);
        assert_eq!(config.limits.payload_hard_cap, 8000);
        assert_eq!(config.inactive_reason(), Some(Inactive::PlaceholderUrl));
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        assert_eq!(HeraldConfig::parse("").unwrap(), HeraldConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
webhook:
  url: "https://discord.com/api/webhooks/123/abc"
  enabled: true
  username: "Town Crier"
  timeout_secs: 5

schedule:
  tick_interval_secs: 30
  full_updates: true

report:
  max_records: 12

limits:
  max_cards: 5
  total_text: 4000

source:
  world_path: "/tmp/export.json"
  stdin_events: false

logging:
  level: "debug"
  json: true
"#;
        let config = HeraldConfig::parse(yaml).unwrap();
        assert!(config.is_active());
        assert_eq!(config.webhook.username.as_deref(), Some("Town Crier"));
        assert_eq!(config.schedule.tick_interval_secs, 30);
        assert!(config.schedule.full_updates);
        assert_eq!(config.report.max_records, 12);
        assert_eq!(config.limits.max_cards, 5);
        assert_eq!(config.limits.total_text, 4000);
        // Unset limits keep their defaults.
        assert_eq!(config.limits.field_value_len, 1024);
        assert_eq!(config.source.world_path, PathBuf::from("/tmp/export.json"));
        assert!(!config.source.stdin_events);
        assert!(config.logging.json);
    }

    #[test]
    fn disabled_wins_over_url_checks() {
        let config = HeraldConfig::parse("webhook:\n  url: \"\"\n  enabled: false\n").unwrap();
        assert_eq!(config.inactive_reason(), Some(Inactive::Disabled));
    }

    #[test]
    fn empty_url_is_inactive() {
        let config = HeraldConfig::parse("webhook:\n  url: \"  \"\n").unwrap();
        assert_eq!(config.inactive_reason(), Some(Inactive::MissingUrl));
    }

    #[test]
    fn overrides_replace_url_and_path() {
        let mut config = HeraldConfig::default();
        config.apply_overrides(|key| match key {
            "HERALD_WEBHOOK_URL" => Some("https://example.test/hook".to_owned()),
            "HERALD_WORLD_PATH" => Some("/var/lib/herald/world.json".to_owned()),
            _ => None,
        });
        assert!(config.is_active());
        assert_eq!(config.webhook.url, "https://example.test/hook");
        assert_eq!(
            config.source.world_path,
            PathBuf::from("/var/lib/herald/world.json")
        );
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            HeraldConfig::parse("webhook: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn shipped_config_matches_defaults_except_username() {
        let shipped = HeraldConfig::parse(include_str!("../../../herald-config.yaml")).unwrap();
        assert_eq!(shipped.webhook.username.as_deref(), Some("Villager Herald"));
        assert_eq!(shipped.inactive_reason(), Some(Inactive::PlaceholderUrl));
        assert_eq!(shipped.limits, LimitsConfig::default());
        assert_eq!(shipped.schedule, ScheduleConfig::default());
        assert_eq!(shipped.source, SourceConfig::default());
    }

    #[test]
    fn default_limits_are_valid() {
        assert!(LimitsConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_cards_rejected() {
        assert!(matches!(
            HeraldConfig::parse("limits:\n  max_cards: 0\n"),
            Err(ConfigError::Invalid { field: "limits.max_cards", .. })
        ));
    }

    #[test]
    fn zero_fields_per_card_rejected() {
        assert!(matches!(
            HeraldConfig::parse("limits:\n  fields_per_card: 0\n"),
            Err(ConfigError::Invalid { field: "limits.fields_per_card", .. })
        ));
    }

    #[test]
    fn short_titles_rejected() {
        assert!(matches!(
            HeraldConfig::parse("limits:\n  title_len: 10\n"),
            Err(ConfigError::Invalid { field: "limits.title_len", .. })
        ));
    }

    #[test]
    fn margin_larger_than_budget_rejected() {
        let err = HeraldConfig::parse("limits:\n  total_text: 100\n  safety_margin: 200\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "limits.safety_margin", .. }));
        assert!(err.to_string().contains("exceeds total_text 100"));
    }
}
