use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use vcsnav_core::VcsSettings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

/// Server settings, loaded once at startup. The provider list is treated as
/// read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub vcs: Vec<VcsSettings>,
}

impl ServerSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}
