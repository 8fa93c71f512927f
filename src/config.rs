//! Configuration file parser for ~/.config/manset/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde but logged as warnings, since they are
//! usually typos.
use crate::validation::CommentRules;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `api_token`.
pub const TOKEN_ENV_VAR: &str = "MANSET_API_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// Values parse but make no sense together.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be specified.
/// `Debug` masks `api_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API, e.g. `https://haber.example.com/api`.
    pub api_base_url: String,

    /// Items requested per page for news and comment lists.
    pub page_size: u32,

    /// Total attempts per page fetch when the error is transient.
    pub retry_attempts: u32,

    /// Quiet period before a search-as-you-type query is sent.
    pub search_debounce_ms: u64,

    /// Quiet period before a scroll position is checked for "load more".
    pub scroll_debounce_ms: u64,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Accepted comment length, in characters.
    pub comment_min_len: usize,
    pub comment_max_len: usize,

    /// Name shown on a comment while it is being submitted.
    pub display_name: Option<String>,

    /// Bearer token for authenticated endpoints. `MANSET_API_TOKEN` wins.
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            page_size: 12,
            retry_attempts: 3,
            search_debounce_ms: 300,
            scroll_debounce_ms: 150,
            request_timeout_secs: 20,
            comment_min_len: crate::validation::DEFAULT_MIN_LEN,
            comment_max_len: crate::validation::DEFAULT_MAX_LEN,
            display_name: None,
            api_token: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("page_size", &self.page_size)
            .field("retry_attempts", &self.retry_attempts)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("scroll_debounce_ms", &self.scroll_debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("comment_min_len", &self.comment_min_len)
            .field("comment_max_len", &self.comment_max_len)
            .field("display_name", &self.display_name)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "api_base_url",
        "page_size",
        "retry_attempts",
        "search_debounce_ms",
        "scroll_debounce_ms",
        "request_timeout_secs",
        "comment_min_len",
        "comment_max_len",
        "display_name",
        "api_token",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Inconsistent values → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(api_base_url = %config.api_base_url, page_size = config.page_size, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.comment_min_len > self.comment_max_len {
            return Err(ConfigError::Invalid(format!(
                "comment_min_len ({}) is greater than comment_max_len ({})",
                self.comment_min_len, self.comment_max_len
            )));
        }
        Ok(())
    }

    /// The API token, preferring the environment over the config file.
    pub fn api_token(&self) -> Option<SecretString> {
        Self::resolve_token(std::env::var(TOKEN_ENV_VAR).ok(), self.api_token.clone())
    }

    fn resolve_token(env: Option<String>, file: Option<String>) -> Option<SecretString> {
        env.filter(|t| !t.trim().is_empty())
            .or(file.filter(|t| !t.trim().is_empty()))
            .map(SecretString::from)
    }

    pub fn comment_rules(&self) -> CommentRules {
        CommentRules::new(self.comment_min_len, self.comment_max_len)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.comment_rules(), CommentRules::new(2, 1000));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/manset_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = Config::parse("   \n  \n  ").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("page_size = 20\n").unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.comment_max_len, 1000);
    }

    #[test]
    fn test_full_config_from_file() {
        let dir = std::env::temp_dir().join("manset_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
api_base_url = "https://haber.example.com/api"
page_size = 6
retry_attempts = 5
search_debounce_ms = 500
scroll_debounce_ms = 100
request_timeout_secs = 10
comment_min_len = 3
comment_max_len = 500
display_name = "Ayşe"
api_token = "file-token"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "https://haber.example.com/api");
        assert_eq!(config.page_size, 6);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.scroll_debounce(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.comment_rules(), CommentRules::new(3, 500));
        assert_eq!(config.display_name.as_deref(), Some("Ayşe"));
        assert_eq!(config.api_token.as_deref(), Some("file-token"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("page_size = \"many\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("page_size = 8\ntheme = \"dark\"\n").unwrap();
        assert_eq!(config.page_size, 8);
    }

    #[test]
    fn test_inconsistent_values_rejected() {
        assert!(matches!(
            Config::parse("page_size = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("comment_min_len = 10\ncomment_max_len = 5\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("manset_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_token_wins_over_file() {
        let token = Config::resolve_token(Some("env".into()), Some("file".into())).unwrap();
        assert_eq!(token.expose_secret(), "env");

        let token = Config::resolve_token(None, Some("file".into())).unwrap();
        assert_eq!(token.expose_secret(), "file");

        let token = Config::resolve_token(Some("  ".into()), Some("file".into())).unwrap();
        assert_eq!(token.expose_secret(), "file");

        assert!(Config::resolve_token(None, None).is_none());
    }

    #[test]
    fn test_debug_masks_api_token() {
        let config = Config {
            api_token: Some("super-secret-token".to_string()),
            ..Default::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
