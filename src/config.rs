use anyhow::{Context, Result};
use daybook::range::WeekStart;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week_start: WeekStart,
    pub log_level: String,
    /// Overrides project/global store discovery when set.
    pub store_path: Option<PathBuf>,
    /// Text used by `seed`; empty means the built-in list.
    pub sample_notes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            week_start: WeekStart::Sunday,
            log_level: "info".into(),
            store_path: None,
            sample_notes: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the user config; a missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "daybook").context("locating data directory")
}
