use crate::config::{project_dirs, Config};
use anyhow::{Context, Result};
use daybook::store::YamlStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_DIR: &str = ".daybook";
const STORE_FILE: &str = "notes.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
    Configured,
}

impl StoreScope {
    pub fn label(&self) -> &'static str {
        match self {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
            StoreScope::Configured => "configured",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub path: PathBuf,
    pub scope: StoreScope,
}

pub fn init_project_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .daybook directory")?;
    let path = dir.join(STORE_FILE);
    if !path.exists() {
        fs::write(&path, "{}\n").with_context(|| format!("writing {:?}", path))?;
    }
    Ok(StoreLocation {
        path,
        scope: StoreScope::Project,
    })
}

pub fn locate_store(start: &Path, config: &Config) -> Result<StoreLocation> {
    if let Some(path) = &config.store_path {
        return Ok(StoreLocation {
            path: path.clone(),
            scope: StoreScope::Configured,
        });
    }
    if let Some(project_path) = find_project_store(start) {
        return Ok(StoreLocation {
            path: project_path,
            scope: StoreScope::Project,
        });
    }
    Ok(StoreLocation {
        path: global_store_path()?,
        scope: StoreScope::Global,
    })
}

pub fn open_store(location: &StoreLocation) -> Result<YamlStore> {
    YamlStore::open(&location.path).with_context(|| format!("opening {:?}", location.path))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("logs"))
}

fn find_project_store(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(STORE_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_store_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(STORE_FILE))
}
