use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::services::import::author::AuthorAlias;
use crate::services::import::normalizer::normalize_path_string;

pub const CONFIG_PATH_ENV: &str = "MODSHELF_CONFIG";
pub const LIBRARY_DIRS_ENV: &str = "MODSHELF_LIBRARY_DIRS";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Registered library roots, normalized and unique.
    pub library_dirs: Vec<String>,
    /// Extra author aliases layered over the built-in table.
    pub author_aliases: Vec<AuthorAlias>,
}

impl ClientConfig {
    /// Load `.env`, then the JSON file at `path` (or `$MODSHELF_CONFIG`).
    ///
    /// `$MODSHELF_LIBRARY_DIRS` replaces the file's roots when set. With no
    /// file at all the defaults are used.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv(); // Try to load .env, ignore if missing

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                log::debug!("No config file given, using defaults");
                Self::default()
            }
        };

        if let Some(dirs) = library_dirs_override() {
            config.library_dirs = dirs;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config JSON in {}", path.display()))?;
        config.library_dirs = normalize_library_dirs(&config.library_dirs);
        log::info!(
            "Loaded config from {}: {} library roots, {} author aliases",
            path.display(),
            config.library_dirs.len(),
            config.author_aliases.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

/// Library roots from `$MODSHELF_LIBRARY_DIRS`, if set.
pub fn library_dirs_override() -> Option<Vec<String>> {
    let raw = std::env::var_os(LIBRARY_DIRS_ENV)?;
    let dirs = normalize_library_dirs(&parse_library_dirs(&raw));
    log::info!(
        "{LIBRARY_DIRS_ENV} overrides library roots ({} entries)",
        dirs.len()
    );
    Some(dirs)
}

/// Split a platform path list (`:` on Unix, `;` on Windows).
pub fn parse_library_dirs(raw: &OsStr) -> Vec<String> {
    std::env::split_paths(raw)
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

pub(crate) fn normalize_library_dirs(dirs: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for dir in dirs {
        let next = normalize_path_string(dir);
        if next.is_empty() || normalized.contains(&next) {
            continue;
        }
        normalized.push(next);
    }

    normalized
}
