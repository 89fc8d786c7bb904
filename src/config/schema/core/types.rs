use super::super::{GatewayConfig, PreviewConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "preview.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.preview.max_html_bytes == 0 {
            return Err(ConfigError::Validation(
                "preview.max_html_bytes must be greater than zero".into(),
            ));
        }
        if self.gateway.host.trim().is_empty() {
            return Err(ConfigError::Validation("gateway.host must not be empty".into()));
        }
        Ok(())
    }
}
