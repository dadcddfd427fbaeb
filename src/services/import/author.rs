//! Author name inference from folder names.

use serde::{Deserialize, Serialize};

use super::normalizer::{fold_leetspeak, normalize_key};

pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Built-in aliases: normalized key → canonical display form.
const DEFAULT_AUTHOR_ALIASES: &[(&str, &str)] = &[
    ("mrmiagi", "MrMiagi"),
    ("yukiishida", "Yuk11sh1d4"),
];

/// Configurable alias entry (`key` is normalized on insertion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAlias {
    pub key: String,
    pub canonical: String,
}

/// Flat ordered alias table with longest-substring lookup.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an alias. Blank keys are ignored.
    pub fn insert(&mut self, key: &str, canonical: &str) {
        let key = normalize_key(key);
        if key.is_empty() {
            log::warn!("Ignoring author alias with empty key for '{canonical}'");
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = canonical.to_string(),
            None => self.entries.push((key, canonical.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical name of the longest key contained in `normalized` or in
    /// its leetspeak-folded form.
    ///
    /// Equal-length matches keep the earlier table entry.
    pub fn best_match(&self, normalized: &str) -> Option<&str> {
        let folded = fold_leetspeak(normalized);
        let mut best: Option<&(String, String)> = None;
        for entry in &self.entries {
            let key = entry.0.as_str();
            if !normalized.contains(key) && !folded.contains(key) {
                continue;
            }
            match best {
                Some((prev, _)) if prev.len() >= key.len() => continue,
                _ => best = Some(entry),
            }
        }
        best.map(|(_, canonical)| canonical.as_str())
    }
}

/// Maps author folder names to canonical author identities.
#[derive(Debug, Clone)]
pub struct AuthorInference {
    aliases: AliasTable,
}

impl Default for AuthorInference {
    fn default() -> Self {
        Self::with_aliases(&[])
    }
}

impl AuthorInference {
    /// Built-in table extended (or overridden) by `extra`.
    pub fn with_aliases(extra: &[AuthorAlias]) -> Self {
        let mut aliases = AliasTable::new();
        for (key, canonical) in DEFAULT_AUTHOR_ALIASES.iter().copied() {
            aliases.insert(key, canonical);
        }
        for alias in extra {
            aliases.insert(&alias.key, &alias.canonical);
        }
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn infer(&self, folder_name: &str) -> String {
        let normalized = normalize_key(folder_name);
        if normalized.is_empty() {
            return UNKNOWN_AUTHOR.to_string();
        }
        match self.aliases.best_match(&normalized) {
            Some(canonical) => canonical.to_string(),
            None => UNKNOWN_AUTHOR.to_string(),
        }
    }
}

/// Infer with the built-in table only.
pub fn infer_author_name(folder_name: &str) -> String {
    AuthorInference::default().infer(folder_name)
}

#[cfg(test)]
#[path = "tests/author_tests.rs"]
mod tests;
