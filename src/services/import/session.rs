//! Scan → edit → commit lifecycle for one author folder.
//!
//! ```text
//! Idle ──start_scan──▶ Scanning ──ok──▶ Editing ──commit──▶ Committing ──ok──▶ Closed
//!   ▲                     │               │  ▲                   │
//!   └───────err───────────┘               │  └───────err─────────┘
//!                                         └──rescan──▶ Scanning
//! ```

use std::fmt;

use super::normalizer::non_blank;
use super::reconcile::reconcile_drafts;
use crate::services::backend::ImportBackend;
use crate::services::catalog::CatalogCache;
use crate::types::{CatalogCostume, CommitReport, DraftMod, DraftPatch, SessionError};

pub const NO_MODS_FOUND_MESSAGE: &str = "No mod folders found in this author folder.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
    Editing,
    Committing,
    Closed,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Scanning => "Scanning",
            SessionState::Editing => "Editing",
            SessionState::Committing => "Committing",
            SessionState::Closed => "Closed",
        }
    }

    /// Scanning and Committing own the session until the backend answers.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Scanning | SessionState::Committing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing to commit; the session closed without a backend call.
    Empty,
    Committed(CommitReport),
}

pub type ImportedCallback = Box<dyn FnMut(&CommitReport) + Send>;

pub struct ImportSession {
    id: String,
    state: SessionState,
    author_dir: String,
    default_author: Option<String>,
    default_download_url: Option<String>,
    drafts: Vec<DraftMod>,
    message: Option<String>,
    last_error: Option<String>,
    on_imported: Option<ImportedCallback>,
}

impl fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("author_dir", &self.author_dir)
            .field("default_author", &self.default_author)
            .field("drafts", &self.drafts.len())
            .finish()
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::Idle,
            author_dir: String::new(),
            default_author: None,
            default_download_url: None,
            drafts: Vec::new(),
            message: None,
            last_error: None,
            on_imported: None,
        }
    }

    /// Register the callback fired after a successful non-empty commit.
    pub fn on_imported(mut self, callback: impl FnMut(&CommitReport) + Send + 'static) -> Self {
        self.set_on_imported(callback);
        self
    }

    /// Replace the imported callback on a session already in use.
    pub fn set_on_imported(&mut self, callback: impl FnMut(&CommitReport) + Send + 'static) {
        self.on_imported = Some(Box::new(callback));
    }

    // ─── Accessors ─────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn author_dir(&self) -> &str {
        &self.author_dir
    }

    pub fn default_author(&self) -> Option<&str> {
        self.default_author.as_deref()
    }

    pub fn default_download_url(&self) -> Option<&str> {
        self.default_download_url.as_deref()
    }

    pub fn drafts(&self) -> &[DraftMod] {
        &self.drafts
    }

    /// User-visible status line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ─── Live form fields ──────────────────────────────────────────────

    pub fn set_author_dir(&mut self, author_dir: &str) -> Result<(), SessionError> {
        self.ensure_editable_fields("change author folder")?;
        self.author_dir = author_dir.trim().to_string();
        Ok(())
    }

    pub fn set_default_author(&mut self, author: Option<&str>) -> Result<(), SessionError> {
        self.ensure_editable_fields("change default author")?;
        self.default_author = non_blank(author);
        Ok(())
    }

    pub fn set_default_download_url(&mut self, url: Option<&str>) -> Result<(), SessionError> {
        self.ensure_editable_fields("change download URL")?;
        self.default_download_url = non_blank(url);
        Ok(())
    }

    fn ensure_editable_fields(&self, action: &'static str) -> Result<(), SessionError> {
        if self.state.is_busy() || self.state == SessionState::Closed {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    // ─── Scan ──────────────────────────────────────────────────────────

    /// Run the dry-run scan for `author_dir` and load the reconciled drafts.
    ///
    /// From Editing this discards the current drafts and any unsaved edits.
    /// On failure the session is back in Idle with no drafts.
    pub async fn start_scan<B: ImportBackend>(
        &mut self,
        backend: &B,
        author_dir: &str,
        default_author: Option<&str>,
        default_download_url: Option<&str>,
    ) -> Result<usize, SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Editing) {
            return Err(self.invalid("scan"));
        }
        let author_dir = author_dir.trim();
        if author_dir.is_empty() {
            return Err(SessionError::MissingAuthorDir);
        }

        self.author_dir = author_dir.to_string();
        self.default_author = non_blank(default_author);
        self.default_download_url = non_blank(default_download_url);
        self.drafts.clear();
        self.message = None;
        self.last_error = None;

        log::info!(
            "[import {}] scanning '{}' default_author={:?}",
            self.id,
            self.author_dir,
            self.default_author
        );

        let dir = self.author_dir.clone();
        let author = self.default_author.clone();
        let url = self.default_download_url.clone();

        self.state = SessionState::Scanning;
        let result = {
            let guard = StateGuard::new(&mut self.state, SessionState::Idle);
            let result = backend
                .scan_author_folder(&dir, author.as_deref(), url.as_deref())
                .await;
            guard.disarm();
            result
        };

        match result {
            Ok(raw) => {
                let raw_len = raw.len();
                self.drafts = reconcile_drafts(raw);
                self.state = SessionState::Editing;
                if self.drafts.is_empty() {
                    self.message = Some(NO_MODS_FOUND_MESSAGE.to_string());
                }
                log::info!(
                    "[import {}] scan found {} drafts ({} raw)",
                    self.id,
                    self.drafts.len(),
                    raw_len
                );
                Ok(self.drafts.len())
            }
            Err(e) => {
                log::warn!("[import {}] scan of '{}' failed: {e}", self.id, dir);
                self.state = SessionState::Idle;
                self.drafts.clear();
                self.message = Some(format!("Scan failed: {e}"));
                self.last_error = Some(e.to_string());
                Err(SessionError::ScanFailed(e))
            }
        }
    }

    /// Scan again with the live form values.
    pub async fn rescan<B: ImportBackend>(&mut self, backend: &B) -> Result<usize, SessionError> {
        let dir = self.author_dir.clone();
        let author = self.default_author.clone();
        let url = self.default_download_url.clone();
        self.start_scan(backend, &dir, author.as_deref(), url.as_deref())
            .await
    }

    // ─── Edit ──────────────────────────────────────────────────────────

    pub fn edit_row(&mut self, index: usize, patch: DraftPatch) -> Result<&DraftMod, SessionError> {
        if self.state != SessionState::Editing {
            return Err(self.invalid("edit drafts"));
        }
        let len = self.drafts.len();
        let draft = self
            .drafts
            .get_mut(index)
            .ok_or(SessionError::RowOutOfRange { index, len })?;
        draft.apply(patch);
        Ok(&*draft)
    }

    /// Costumes selectable for row `index`, derived from the row's current
    /// character on every call.
    pub fn costume_options<'c>(
        &self,
        index: usize,
        catalog: &'c CatalogCache,
    ) -> Vec<&'c CatalogCostume> {
        match self.drafts.get(index) {
            Some(draft) => catalog.costumes_for(draft.character_id),
            None => Vec::new(),
        }
    }

    // ─── Commit / close ────────────────────────────────────────────────

    /// Commit every draft in one backend call.
    ///
    /// An empty draft list closes the session without calling the backend.
    /// On failure the session stays in Editing with its drafts intact.
    pub async fn commit<B: ImportBackend>(
        &mut self,
        backend: &B,
    ) -> Result<CommitOutcome, SessionError> {
        if self.state != SessionState::Editing {
            return Err(self.invalid("commit"));
        }

        if self.drafts.is_empty() {
            log::info!("[import {}] nothing to commit, closing", self.id);
            self.state = SessionState::Closed;
            self.message = None;
            return Ok(CommitOutcome::Empty);
        }

        log::info!("[import {}] committing {} drafts", self.id, self.drafts.len());
        let drafts = self.drafts.clone();

        self.state = SessionState::Committing;
        let result = {
            let guard = StateGuard::new(&mut self.state, SessionState::Editing);
            let result = backend.commit_drafts(drafts).await;
            guard.disarm();
            result
        };

        match result {
            Ok(report) => {
                log::info!(
                    "[import {}] commit done inserted={} updated={}",
                    self.id,
                    report.inserted,
                    report.updated
                );
                self.state = SessionState::Closed;
                self.drafts.clear();
                self.last_error = None;
                self.message = Some(format!("Imported {} mods", report.total()));
                if let Some(callback) = self.on_imported.as_mut() {
                    callback(&report);
                }
                Ok(CommitOutcome::Committed(report))
            }
            Err(e) => {
                log::warn!("[import {}] commit failed: {e}", self.id);
                self.state = SessionState::Editing;
                self.message = Some(format!("Import failed: {e}"));
                self.last_error = Some(e.to_string());
                Err(SessionError::CommitFailed(e))
            }
        }
    }

    /// Close without committing. Drafts are discarded.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => Ok(()),
            SessionState::Idle | SessionState::Editing => {
                log::info!(
                    "[import {}] closed without commit ({} drafts discarded)",
                    self.id,
                    self.drafts.len()
                );
                self.state = SessionState::Closed;
                self.drafts.clear();
                Ok(())
            }
            _ => Err(self.invalid("close")),
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            state: self.state.label(),
        }
    }
}

/// Restores `fallback` if the pending backend call is dropped before it
/// resolves.
struct StateGuard<'a> {
    state: &'a mut SessionState,
    fallback: SessionState,
    armed: bool,
}

impl<'a> StateGuard<'a> {
    fn new(state: &'a mut SessionState, fallback: SessionState) -> Self {
        Self {
            state,
            fallback,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state = self.fallback;
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
