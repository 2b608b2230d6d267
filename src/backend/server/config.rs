/**
 * Server Configuration
 *
 * Configuration is layered, later sources overriding earlier ones:
 *
 * 1. Built-in defaults
 * 2. A TOML file named by `WISHHUB_CONFIG` (optional)
 * 3. Environment variables, including those loaded from `.env`
 *
 * Optional collaborators degrade instead of failing startup: without
 * `DATABASE_URL` the server runs on the in-memory store, without media
 * settings uploads go to memory, and without SMTP or SMS settings
 * notifications are only logged.
 */

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Signing secret used when `JWT_SECRET` is not configured
pub const DEV_JWT_SECRET: &str = "wishhub-dev-secret-change-me";

/// Longest token lifetime accepted, in days
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("missing value: {0}")]
    MissingValue(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Object-storage settings for media uploads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub upload_url: Option<String>,
    pub public_url: Option<String>,
    pub api_key: Option<String>,
}

/// SMTP settings for email notifications
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-memory store
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    /// Interval of the story expiry sweeper
    pub story_sweep_secs: u64,
    pub media: MediaConfig,
    pub smtp: Option<SmtpConfig>,
    pub sms_webhook_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            story_sweep_secs: 300,
            media: MediaConfig::default(),
            smtp: None,
            sms_webhook_url: None,
        }
    }
}

/// Shape of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_days: Option<i64>,
    bcrypt_cost: Option<u32>,
    story_sweep_secs: Option<u64>,
    media: Option<MediaConfig>,
    smtp: Option<SmtpConfig>,
    sms_webhook_url: Option<String>,
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from `.env`, the optional TOML file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` for environment variables
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("WISHHUB_CONFIG") {
            config.apply_file(Path::new(&path))?;
        }

        if let Some(port) = lookup("SERVER_PORT") {
            config.port = parse_var("SERVER_PORT", port)?;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            config.database_url = Some(url);
        }
        match lookup("JWT_SECRET") {
            Some(secret) => config.jwt_secret = secret,
            None if config.jwt_secret == DEV_JWT_SECRET => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
            }
            None => {}
        }
        if let Some(days) = lookup("TOKEN_TTL_DAYS") {
            config.token_ttl_days = parse_var("TOKEN_TTL_DAYS", days)?;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            config.bcrypt_cost = parse_var("BCRYPT_COST", cost)?;
        }
        if let Some(secs) = lookup("STORY_SWEEP_SECS") {
            config.story_sweep_secs = parse_var("STORY_SWEEP_SECS", secs)?;
        }

        if let Some(url) = lookup("MEDIA_UPLOAD_URL") {
            config.media.upload_url = Some(url);
        }
        if let Some(url) = lookup("MEDIA_PUBLIC_URL") {
            config.media.public_url = Some(url);
        }
        if let Some(key) = lookup("MEDIA_API_KEY") {
            config.media.api_key = Some(key);
        }

        if let Some(host) = lookup("SMTP_HOST") {
            let from = lookup("SMTP_FROM")
                .or_else(|| config.smtp.as_ref().map(|s| s.from.clone()))
                .ok_or(ConfigError::MissingValue("SMTP_FROM"))?;
            config.smtp = Some(SmtpConfig {
                host,
                username: lookup("SMTP_USERNAME"),
                password: lookup("SMTP_PASSWORD"),
                from,
            });
        }
        if let Some(url) = lookup("SMS_WEBHOOK_URL") {
            config.sms_webhook_url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&contents)?;
        tracing::info!("Loaded configuration file {}", path.display());

        if let Some(port) = file.port {
            self.port = port;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = secret;
        }
        if let Some(days) = file.token_ttl_days {
            self.token_ttl_days = days;
        }
        if let Some(cost) = file.bcrypt_cost {
            self.bcrypt_cost = cost;
        }
        if let Some(secs) = file.story_sweep_secs {
            self.story_sweep_secs = secs;
        }
        if let Some(media) = file.media {
            self.media = media;
        }
        if file.smtp.is_some() {
            self.smtp = file.smtp;
        }
        if file.sms_webhook_url.is_some() {
            self.sms_webhook_url = file.sms_webhook_url;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.token_ttl_days) {
            return Err(ConfigError::InvalidValue {
                name: "TOKEN_TTL_DAYS",
                value: self.token_ttl_days.to_string(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        if self.story_sweep_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "STORY_SWEEP_SECS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn token_ttl_days(mut self, days: i64) -> Self {
        self.config.token_ttl_days = days;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    pub fn story_sweep_secs(mut self, secs: u64) -> Self {
        self.config.story_sweep_secs = secs;
        self
    }

    pub fn media(mut self, media: MediaConfig) -> Self {
        self.config.media = media;
        self
    }

    pub fn smtp(mut self, smtp: SmtpConfig) -> Self {
        self.config.smtp = Some(smtp);
        self
    }

    pub fn sms_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.sms_webhook_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_ttl_days, 30);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_from(lookup(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/wishhub"),
            ("JWT_SECRET", "s3cret"),
            ("BCRYPT_COST", "4"),
            ("STORY_SWEEP_SECS", "60"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_FROM", "WishHub <noreply@example.com>"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/wishhub"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.story_sweep_secs, 60);
        assert_eq!(config.smtp.unwrap().host, "smtp.example.com");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_matches!(
            AppConfig::load_from(lookup(&[("SERVER_PORT", "eighty")])),
            Err(ConfigError::InvalidValue { name: "SERVER_PORT", .. })
        );
        assert_matches!(
            AppConfig::load_from(lookup(&[("BCRYPT_COST", "2")])),
            Err(ConfigError::InvalidValue { name: "BCRYPT_COST", .. })
        );
        assert_matches!(
            AppConfig::load_from(lookup(&[("SMTP_HOST", "smtp.example.com")])),
            Err(ConfigError::MissingValue("SMTP_FROM"))
        );
    }

    #[test]
    fn test_builder_validates() {
        assert!(AppConfig::builder().bcrypt_cost(4).build().is_ok());
        assert!(AppConfig::builder().jwt_secret("").build().is_err());
        assert!(AppConfig::builder().story_sweep_secs(0).build().is_err());
    }

    #[test]
    fn test_token_ttl_bounded() {
        assert!(AppConfig::builder().bcrypt_cost(4).token_ttl_days(3650).build().is_ok());
        assert_matches!(
            AppConfig::builder().bcrypt_cost(4).token_ttl_days(100_000_000).build(),
            Err(ConfigError::InvalidValue { name: "TOKEN_TTL_DAYS", .. })
        );
        assert_matches!(
            AppConfig::load_from(lookup(&[("TOKEN_TTL_DAYS", "0")])),
            Err(ConfigError::InvalidValue { name: "TOKEN_TTL_DAYS", .. })
        );
    }

    #[test]
    #[serial]
    fn test_load_reads_toml_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 4000
token_ttl_days = 7

[media]
upload_url = "https://storage.example.com/bucket"
public_url = "https://cdn.example.com"
"#
        )
        .unwrap();

        std::env::set_var("WISHHUB_CONFIG", file.path());
        std::env::set_var("SERVER_PORT", "5000");
        let config = AppConfig::load();
        std::env::remove_var("WISHHUB_CONFIG");
        std::env::remove_var("SERVER_PORT");

        let config = config.unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.media.public_url.as_deref(), Some("https://cdn.example.com"));
    }
}
