use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::CatalogSource;
use crate::error::{CatalogError, Result};

const APP_DIR: &str = "openstream";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File path or http(s) URL of the catalog document.
    pub catalog: String,
    pub show_license: bool,
    pub cache_thumbnails: bool,
    pub window_width: i32,
    pub window_height: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: "data.json".to_string(),
            show_license: false,
            cache_thumbnails: true,
            window_width: 1000,
            window_height: 700,
        }
    }
}

impl AppConfig {
    /// Loads the per-user config file, falling back to defaults when it does
    /// not exist.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::parse(&self.catalog)
    }

    pub fn thumbnail_cache_dir(&self) -> Option<PathBuf> {
        if !self.cache_thumbnails {
            return None;
        }
        dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("thumbnails"))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
