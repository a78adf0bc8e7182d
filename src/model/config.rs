use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::nav::NavOptions;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: NavOptions,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Table document to open when none is given on the command line.
    #[serde(default)]
    pub document_path: Option<String>,
    /// Rows moved by PageUp/PageDown.
    pub page_size: usize,
    pub reload_debounce_ms: u64,
}

impl AppConfig {
    pub fn defaults() -> Result<Self> {
        let defaults = include_str!("../../config/default.toml");
        Ok(toml::from_str(defaults)?)
    }

    /// Load configuration with layering: defaults → user config.
    ///
    /// An explicit path replaces the user config lookup and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::defaults()?;

        let user_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => directories::ProjectDirs::from("", "", "tablenav")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .filter(|path| path.exists()),
        };

        if let Some(path) = user_path {
            let user_str = fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            config = toml::from_str(&user_str)
                .with_context(|| format!("parsing config {}", path.display()))?;
            tracing::info!("loaded config from {}", path.display());
        }

        if let Some(raw) = config.general.document_path.as_mut()
            && raw.starts_with('~')
        {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            *raw = raw.replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn document_path(&self) -> Option<PathBuf> {
        self.general.document_path.as_ref().map(PathBuf::from)
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
