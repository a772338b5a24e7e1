use crate::config::{ClientConfig, Environment};
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `regenerapp.toml`. Every key is optional; set keys override the
/// environment preset.
///
/// ```toml
/// [server]
/// environment = "production"
/// base_url = "${REGENERAPP_URL}"
/// request_timeout_secs = 30
///
/// [export]
/// output_path = "./exports"
///
/// [logging]
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    pub environment: Option<Environment>,
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Layers the file over `base`. A preset named in the file replaces the
    /// base URL before `base_url` is applied.
    pub fn apply(&self, base: ClientConfig) -> ClientConfig {
        let mut config = match self.server.environment {
            Some(environment) => ClientConfig {
                base_url: environment.base_url().to_string(),
                ..base
            },
            None => base,
        };
        if let Some(base_url) = &self.server.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = self.server.connect_timeout_secs {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.server.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(path) = &self.export.output_path {
            config.output_path = path.clone();
        }
        config
    }
}

/// Replaces `${VAR}` with the variable's value; unset variables stay as is.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
