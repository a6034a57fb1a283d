use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use organizer::DEFAULT_EXTENSIONS;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsortConfig {
    pub extensions: Vec<String>,
    pub recursive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
}

impl Default for TagsortConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            recursive: true,
            log_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

/// `--config` wins, then `TAGSORT_CONFIG`.
pub fn config_path(cli_value: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_value {
        return Some(path.to_path_buf());
    }
    match env::var("TAGSORT_CONFIG") {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

/// Missing file means defaults; the file is never created.
pub fn load_config(path: Option<&Path>) -> Result<(TagsortConfig, bool), ConfigError> {
    let path = match path {
        Some(path) if path.exists() => path,
        _ => return Ok((TagsortConfig::default(), false)),
    };

    let contents = fs::read_to_string(path)?;
    let mut config: TagsortConfig = serde_yaml::from_str(&contents)?;
    config.extensions.retain(|ext| !ext.trim().is_empty());
    if config.extensions.is_empty() {
        config.extensions = TagsortConfig::default().extensions;
    }
    if let Some(log_path) = &config.log_path {
        if log_path.trim().is_empty() {
            config.log_path = None;
        }
    }
    Ok((config, true))
}
