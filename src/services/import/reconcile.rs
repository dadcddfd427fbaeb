//! Turns raw scan output into the editable draft list.

use std::collections::HashMap;

use super::normalizer::{file_name_of, non_blank};
use crate::types::DraftMod;

/// One draft per distinct `folder_path`, last record wins.
///
/// Rows keep the position where their path first appeared. Every row is
/// passed through [`normalize_draft`].
pub fn reconcile_drafts(raw: Vec<DraftMod>) -> Vec<DraftMod> {
    let mut out: Vec<DraftMod> = Vec::with_capacity(raw.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    let mut replaced = 0usize;

    for draft in raw {
        let Some(draft) = normalize_draft(draft) else {
            continue;
        };
        match positions.get(&draft.folder_path) {
            Some(&idx) => {
                out[idx] = draft;
                replaced += 1;
            }
            None => {
                positions.insert(draft.folder_path.clone(), out.len());
                out.push(draft);
            }
        }
    }

    if replaced > 0 {
        log::debug!("Reconciled drafts: {} kept, {} duplicates replaced", out.len(), replaced);
    }
    out
}

/// Uniform representation of missing values. `None` if the record has no path.
pub fn normalize_draft(mut draft: DraftMod) -> Option<DraftMod> {
    let folder_path = draft.folder_path.trim();
    if folder_path.is_empty() {
        log::warn!("Dropping draft '{}' without folder path", draft.display_name);
        return None;
    }
    if folder_path.len() != draft.folder_path.len() {
        draft.folder_path = folder_path.to_string();
    }

    let display_name = draft.display_name.trim();
    draft.display_name = if display_name.is_empty() {
        file_name_of(&draft.folder_path).to_string()
    } else {
        display_name.to_string()
    };

    draft.author = non_blank(draft.author.as_deref());
    draft.download_url = non_blank(draft.download_url.as_deref());

    // The backend reports missing catalog rows as id 0
    draft.character_id = draft.character_id.filter(|id| *id > 0);
    draft.costume_id = draft.costume_id.filter(|id| *id > 0);
    if draft.character_id.is_none() {
        draft.costume_id = None;
    }

    draft.infer_confidence = if draft.infer_confidence.is_nan() {
        0.0
    } else {
        draft.infer_confidence.clamp(0.0, 1.0)
    };

    Some(draft)
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
