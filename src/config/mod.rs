#[cfg(feature = "cli")]
pub mod cli;
pub mod file;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_PRESET_VAR: &str = "REGENERAPP_ENV";
pub const ENV_BASE_URL_VAR: &str = "REGENERAPP_BASE_URL";

/// Known backend deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Environment {
    /// Backend on the host machine, seen from the Android emulator.
    #[default]
    Local,
    /// Backend on the LAN, for a physical device.
    Device,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Local => "http://10.0.2.2:8000/api/",
            Environment::Device => "http://192.168.100.7:8000/api/",
            Environment::Production => "https://regenerapp-backend.azurewebsites.net/api/",
        }
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "emulator" => Ok(Environment::Local),
            "device" => Ok(Environment::Device),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::InvalidConfigValueError {
                field: "environment".to_string(),
                value: other.to_string(),
                reason: "Expected one of: local, device, production".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub output_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ClientConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_path: "./output".to_string(),
        }
    }

    /// Preset from `REGENERAPP_ENV`, base URL overridden by
    /// `REGENERAPP_BASE_URL` when set.
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var(ENV_PRESET_VAR) {
            Ok(name) if !name.trim().is_empty() => name.parse()?,
            _ => Environment::default(),
        };
        let config = Self::for_environment(environment);
        match std::env::var(ENV_BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => Ok(config.with_base_url(&url)),
            _ => Ok(config),
        }
    }

    /// Switches the backend; the URL always ends up with a trailing `/`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let trimmed = base_url.trim();
        self.base_url = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        self
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_positive_number("connect_timeout_secs", self.connect_timeout_secs, 1)?;
        validate_positive_number("request_timeout_secs", self.request_timeout_secs, 1)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_presets() {
        assert_eq!(
            ClientConfig::for_environment(Environment::Production).base_url,
            "https://regenerapp-backend.azurewebsites.net/api/"
        );
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://10.0.2.2:8000/api/");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_ok!(config.validate());
    }

    #[test]
    fn test_with_base_url_adds_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:8000/api");
        assert_eq!(config.base_url, "http://localhost:8000/api/");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("device".parse::<Environment>().unwrap(), Environment::Device);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_err!(config.validate());

        let config = ClientConfig::default().with_base_url("not a url");
        assert_err!(config.validate());
    }
}
