//! Session-scoped cache of the character/costume catalog.

use crate::services::backend::CatalogBackend;
use crate::types::{CatalogCharacter, CatalogCostume, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    characters: Vec<CatalogCharacter>,
    costumes: Vec<CatalogCostume>,
    loaded: bool,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from the backend. On failure the previous data stays in place.
    pub async fn refresh<B: CatalogBackend>(&mut self, backend: &B) -> CommandResult<()> {
        match backend.list_catalog().await {
            Ok(response) => {
                log::info!(
                    "Catalog loaded: {} characters, {} costumes",
                    response.characters.len(),
                    response.costumes.len()
                );
                self.characters = response.characters;
                self.costumes = response.costumes;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                log::warn!("Catalog refresh failed, keeping previous data: {e}");
                Err(e)
            }
        }
    }

    /// Refresh only if nothing was ever loaded.
    pub async fn ensure_loaded<B: CatalogBackend>(&mut self, backend: &B) -> CommandResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.refresh(backend).await
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn characters(&self) -> &[CatalogCharacter] {
        &self.characters
    }

    pub fn character(&self, id: i64) -> Option<&CatalogCharacter> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Costumes owned by `character_id`; empty for `None`.
    pub fn costumes_for(&self, character_id: Option<i64>) -> Vec<&CatalogCostume> {
        let Some(character_id) = character_id else {
            return Vec::new();
        };
        self.costumes
            .iter()
            .filter(|c| c.character_id == character_id)
            .collect()
    }

    pub fn costume_belongs(&self, character_id: i64, costume_id: i64) -> bool {
        self.costumes
            .iter()
            .any(|c| c.id == costume_id && c.character_id == character_id)
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
