//! Draft records exchanged with the import backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    Idle,
    Cutscene,
    History,
    Date,
    Minigame,
    Swap,
    Battle,
    Ui,
    #[default]
    Other,
}

impl ModType {
    pub const ALL: [ModType; 9] = [
        ModType::Idle,
        ModType::Cutscene,
        ModType::History,
        ModType::Date,
        ModType::Minigame,
        ModType::Swap,
        ModType::Battle,
        ModType::Ui,
        ModType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModType::Idle => "idle",
            ModType::Cutscene => "cutscene",
            ModType::History => "history",
            ModType::Date => "date",
            ModType::Minigame => "minigame",
            ModType::Swap => "swap",
            ModType::Battle => "battle",
            ModType::Ui => "ui",
            ModType::Other => "other",
        }
    }

    /// Lenient parse; anything unrecognised is `Other`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(value))
            .unwrap_or(ModType::Other)
    }
}

impl fmt::Display for ModType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate mod pending commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMod {
    pub display_name: String,
    pub folder_path: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub mod_type: ModType,
    #[serde(default)]
    pub character_id: Option<i64>,
    #[serde(default)]
    pub costume_id: Option<i64>,
    #[serde(default)]
    pub infer_confidence: f32,
}

impl DraftMod {
    pub fn new(folder_path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            folder_path: folder_path.into(),
            author: None,
            download_url: None,
            mod_type: ModType::Other,
            character_id: None,
            costume_id: None,
            infer_confidence: 0.0,
        }
    }

    /// Apply a field-level patch.
    ///
    /// Changing the character always drops the costume, even when the patch
    /// also carries one.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(download_url) = patch.download_url {
            self.download_url = download_url;
        }
        if let Some(mod_type) = patch.mod_type {
            self.mod_type = mod_type;
        }
        match patch.character_id {
            Some(character_id) => {
                self.character_id = character_id;
                self.costume_id = None;
            }
            None => {
                if let Some(costume_id) = patch.costume_id {
                    self.costume_id = costume_id;
                }
            }
        }
    }
}

/// Field-level edit for one draft row. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<ModType>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub character_id: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub costume_id: Option<Option<i64>>,
}

impl DraftPatch {
    pub fn display_name(value: impl Into<String>) -> Self {
        Self {
            display_name: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn character(character_id: Option<i64>) -> Self {
        Self {
            character_id: Some(character_id),
            ..Self::default()
        }
    }

    pub fn costume(costume_id: Option<i64>) -> Self {
        Self {
            costume_id: Some(costume_id),
            ..Self::default()
        }
    }

    pub fn mod_type(mod_type: ModType) -> Self {
        Self {
            mod_type: Some(mod_type),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// `null` must stay distinguishable from an absent field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// One author folder found under a library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorFolder {
    pub folder_path: String,
    pub inferred_author: String,
}

/// Counts returned by a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub inserted: usize,
    pub updated: usize,
}

impl CommitReport {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}
