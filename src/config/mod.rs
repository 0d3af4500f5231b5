// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{Error, Result};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the binary.
    pub fn load() -> Result<Self> {
        Self::build(&Self::default_config_path(), false)
    }

    /// Same as [`AppConfig::load`] with an explicit config file path.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the file does not exist.
    pub fn load_from(path: &str) -> Result<Self> {
        Self::build(path, true)
    }

    fn build(path: &str, required: bool) -> Result<Self> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name(path).required(required))
            // Override with environment variables, e.g. CLOUDLINGO_RATE_LIMIT__CHARACTER_LIMIT
            .add_source(
                Environment::with_prefix("CLOUDLINGO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    /// Reject settings that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.character_limit == 0 {
            return Err(Error::Config(
                "rate_limit.character_limit must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.poll_interval_seconds == 0 {
            return Err(Error::Config(
                "rate_limit.poll_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.google.timeout_seconds == 0 {
            return Err(Error::Config(
                "google.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cloudlingo")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
