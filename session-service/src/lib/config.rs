use std::env;

use auth::CredentialCodec;
use auth::KindSettings;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    /// Keep the user directory in process memory instead of Postgres.
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

/// Bootstrap administrator created at startup when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__ACCESS_SECRET=... overrides jwt.access_secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}

impl JwtConfig {
    /// Reject secrets that would let one credential kind pass for the other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.len() < MIN_SECRET_BYTES
            || self.refresh_secret.len() < MIN_SECRET_BYTES
        {
            return Err(ConfigError::Message(format!(
                "jwt secrets must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        if self.access_ttl_minutes <= 0 || self.refresh_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "jwt expiry windows must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn codec(&self) -> CredentialCodec {
        CredentialCodec::new(
            KindSettings {
                secret: self.access_secret.as_bytes(),
                ttl: Duration::minutes(self.access_ttl_minutes),
            },
            KindSettings {
                secret: self.refresh_secret.as_bytes(),
                ttl: Duration::days(self.refresh_ttl_days),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-for-tests-at-least-32-bytes".to_string(),
            refresh_secret: "refresh-secret-for-tests-at-least-32-bytes".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn test_valid_jwt_config() {
        assert!(jwt().validate().is_ok());
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut config = jwt();
        config.refresh_secret = config.access_secret.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = jwt();
        config.access_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut config = jwt();
        config.access_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }
}
