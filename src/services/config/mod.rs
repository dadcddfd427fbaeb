pub mod models;

pub use models::*;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::services::import::author::AuthorInference;
use crate::services::import::normalizer::normalize_path_string;
use crate::types::{CommandError, CommandResult};

/// In-memory client configuration, optionally backed by a JSON file.
///
/// The held config mirrors the file. An environment override of the library
/// roots only changes what `library_dirs` and `get_config` report; it is never
/// written back.
pub struct ConfigService {
    config: Mutex<ClientConfig>,
    library_override: Option<Vec<String>>,
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Memory-only service; changes are not written anywhere.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Mutex::new(config),
            library_override: None,
            path: None,
        }
    }

    /// Load from `path` and persist every change back to it.
    ///
    /// `$MODSHELF_LIBRARY_DIRS` applies to the runtime view only.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv(); // Try to load .env, ignore if missing

        let config = if path.exists() {
            ClientConfig::from_file(path)?
        } else {
            log::info!("Config file {} not found, starting empty", path.display());
            ClientConfig::default()
        };
        let service = Self {
            config: Mutex::new(config),
            library_override: None,
            path: Some(path.to_path_buf()),
        };
        Ok(match library_dirs_override() {
            Some(dirs) => service.with_library_override(dirs),
            None => service,
        })
    }

    /// Report `dirs` as the library roots without touching the stored ones.
    pub fn with_library_override(mut self, dirs: Vec<String>) -> Self {
        self.library_override = Some(normalize_library_dirs(&dirs));
        self
    }

    fn lock(&self) -> MutexGuard<'_, ClientConfig> {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Effective configuration, with any library override applied.
    pub fn get_config(&self) -> ClientConfig {
        let mut config = self.lock().clone();
        if let Some(dirs) = self.library_override.as_ref() {
            config.library_dirs = dirs.clone();
        }
        config
    }

    /// Roots as stored in the config file, ignoring any override.
    pub fn stored_library_dirs(&self) -> Vec<String> {
        self.lock().library_dirs.clone()
    }

    pub fn library_dirs(&self) -> Vec<String> {
        match self.library_override.as_ref() {
            Some(dirs) => dirs.clone(),
            None => self.stored_library_dirs(),
        }
    }

    /// Register a library root. Returns the stored (normalized) form.
    pub fn register_library_dir(&self, dir: &str) -> CommandResult<String> {
        let dir = normalize_path_string(dir);
        if dir.is_empty() {
            return Err(CommandError::InvalidInput(
                "Library folder path is empty".to_string(),
            ));
        }

        let mut config = self.lock();
        if config.library_dirs.contains(&dir) {
            return Err(CommandError::InvalidInput(format!(
                "Library folder already registered: {dir}"
            )));
        }
        let mut next = config.clone();
        next.library_dirs.push(dir.clone());
        self.persist(&next)?;
        *config = next;

        self.warn_if_overridden();
        log::info!("Registered library folder '{}'", dir);
        Ok(dir)
    }

    /// Returns `false` if `dir` was not registered.
    pub fn remove_library_dir(&self, dir: &str) -> CommandResult<bool> {
        let dir = normalize_path_string(dir);
        let mut config = self.lock();
        if !config.library_dirs.contains(&dir) {
            return Ok(false);
        }
        let mut next = config.clone();
        next.library_dirs.retain(|d| d != &dir);
        self.persist(&next)?;
        *config = next;

        self.warn_if_overridden();
        log::info!("Removed library folder '{}'", dir);
        Ok(true)
    }

    /// Author inference over the built-in table plus configured aliases.
    pub fn author_inference(&self) -> AuthorInference {
        AuthorInference::with_aliases(&self.lock().author_aliases)
    }

    fn warn_if_overridden(&self) {
        if self.library_override.is_some() {
            log::warn!("{LIBRARY_DIRS_ENV} is set; saved library roots are not in use");
        }
    }

    /// Write `config` to the backing file. Callers hold the config lock.
    fn persist(&self, config: &ClientConfig) -> CommandResult<()> {
        if let Some(path) = self.path.as_ref() {
            config
                .save(path)
                .map_err(|e| CommandError::Io(format!("{e:#}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
