use super::rendering::RenderConfig;
use super::window::WindowConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hello-triangle.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub window: WindowConfig,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the first config file found, or the defaults if there is none.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// The working directory wins over the platform config directory.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "hello-triangle")?;
    let user = proj_dirs.config_dir().join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}
