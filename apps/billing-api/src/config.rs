//! Billing API configuration.
//!
//! Layered with the `config` crate, lowest priority first:
//! built-in defaults, an optional `billing.toml`, then `BILLING_*`
//! environment variables (`BILLING_PORT=9000`, `BILLING_DATABASE_PATH=...`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "billing.toml";

/// Billing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Where shared documents are copied and served from
    pub upload_dir: PathBuf,

    /// The only directory `POST /api/documents/share` may read from
    pub documents_dir: PathBuf,

    /// Base of the public URLs handed out for uploads
    pub public_base_url: String,

    /// Notification webhook; sharing still uploads when unset
    pub notify_webhook_url: Option<String>,

    /// Per-step deadline for upload and notification
    pub notify_timeout_secs: u64,

    /// Prepended to bare 10-digit phone numbers
    pub default_country_code: String,
}

impl ApiConfig {
    /// Loads `billing.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Like [`ApiConfig::load`] with an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: ApiConfig = Config::builder()
            .set_default("port", 8080)?
            .set_default("database_path", "./data/billing.db")?
            .set_default("upload_dir", "./uploads")?
            .set_default("documents_dir", "./documents")?
            .set_default("public_base_url", "http://localhost:8080")?
            .set_default("notify_timeout_secs", 30)?
            .set_default("default_country_code", "91")?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("BILLING").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.documents_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("documents_dir".to_string()));
        }
        if self.public_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("public_base_url".to_string()));
        }
        if self.notify_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("notify_timeout_secs".to_string()));
        }
        if self.default_country_code.is_empty()
            || !self.default_country_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::InvalidValue("default_country_code".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig::load_from(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("./data/billing.db"));
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.documents_dir, PathBuf::from("./documents"));
        assert_eq!(config.notify_timeout(), Duration::from_secs(30));
        assert_eq!(config.default_country_code, "91");
        assert!(config.notify_webhook_url.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billing.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "port = 9100").unwrap();
        writeln!(file, "notify_webhook_url = \"http://127.0.0.1:3001/send\"").unwrap();
        writeln!(file, "notify_timeout_secs = 5").unwrap();
        writeln!(file, "documents_dir = \"/srv/billing/pdf\"").unwrap();

        let config = ApiConfig::load_from(&path).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(
            config.notify_webhook_url.as_deref(),
            Some("http://127.0.0.1:3001/send")
        );
        assert_eq!(config.notify_timeout(), Duration::from_secs(5));
        assert_eq!(config.documents_dir, PathBuf::from("/srv/billing/pdf"));
        assert_eq!(config.public_base_url, "http://localhost:8080");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billing.toml");
        std::fs::write(&path, "notify_timeout_secs = 0\n").unwrap();

        let err = ApiConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "notify_timeout_secs"));
    }
}
