//! Bulk import across every registered library root.
//!
//! The queue is built once per run. Each entry gets its own
//! [`ImportSession`]; the next session is only created after the current one
//! has closed.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::normalizer::{non_blank, normalize_path_string};
use super::session::{CommitOutcome, ImportSession, SessionState};
use crate::services::backend::{ImportBackend, LibraryBackend};
use crate::types::{AuthorFolder, BulkError, CommitReport};

pub const NOTHING_TO_IMPORT_MESSAGE: &str = "Nothing to import: no author folders found.";
pub const BULK_FINISHED_MESSAGE: &str = "Bulk import finished.";

#[derive(Debug, Clone, Serialize)]
pub struct RootFailure {
    pub root: String,
    pub error: String,
}

/// Ordered, deduplicated author folders plus the roots that failed to list.
#[derive(Debug, Clone, Default)]
pub struct BulkImportQueue {
    entries: Vec<AuthorFolder>,
    failed_roots: Vec<RootFailure>,
}

impl BulkImportQueue {
    /// Enumerate author folders under every root.
    ///
    /// A failing root is logged and skipped. Entries are deduplicated by
    /// `folder_path` (first occurrence kept) and sorted ascending.
    pub async fn build<B: LibraryBackend>(backend: &B, roots: &[String]) -> Self {
        let mut seen_roots = HashSet::new();
        let mut seen_paths = HashSet::new();
        let mut entries = Vec::new();
        let mut failed_roots = Vec::new();

        for root in roots {
            let root = normalize_path_string(root);
            if root.is_empty() || !seen_roots.insert(root.clone()) {
                continue;
            }

            match backend.list_author_folders(&root).await {
                Ok(folders) => {
                    log::info!("Bulk import: {} author folders under '{}'", folders.len(), root);
                    for folder in folders {
                        if seen_paths.insert(folder.folder_path.clone()) {
                            entries.push(folder);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Bulk import: skipping library root '{}': {e}", root);
                    failed_roots.push(RootFailure {
                        root,
                        error: e.to_string(),
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.folder_path.cmp(&b.folder_path));

        Self {
            entries,
            failed_roots,
        }
    }

    pub fn entries(&self) -> &[AuthorFolder] {
        &self.entries
    }

    pub fn failed_roots(&self) -> &[RootFailure] {
        &self.failed_roots
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkStart {
    /// No author folders anywhere; bulk mode was not entered.
    NothingToImport,
    Started { total: usize },
}

/// Where the runner stands after a session closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAdvance {
    Next { index: usize, total: usize },
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkPosition {
    pub index: usize,
    pub total: usize,
    pub folder_path: String,
    pub inferred_author: String,
}

struct ActiveRun {
    queue: BulkImportQueue,
    index: usize,
    session: ImportSession,
    auto_scanned: bool,
}

/// Imported callback shared by every session of a bulk run.
pub type SharedImportedCallback = Arc<dyn Fn(&CommitReport) + Send + Sync>;

/// Drives one import session per queue entry, strictly one at a time.
pub struct BulkImportRunner<B> {
    backend: Arc<B>,
    run: Option<ActiveRun>,
    message: Option<String>,
    on_imported: Option<SharedImportedCallback>,
}

impl<B> BulkImportRunner<B>
where
    B: ImportBackend + LibraryBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            run: None,
            message: None,
            on_imported: None,
        }
    }

    /// Fire `callback` after every successful non-empty commit in the run.
    pub fn on_imported(mut self, callback: impl Fn(&CommitReport) + Send + Sync + 'static) -> Self {
        self.set_on_imported(callback);
        self
    }

    /// Also installed on the current session, if any.
    pub fn set_on_imported(&mut self, callback: impl Fn(&CommitReport) + Send + Sync + 'static) {
        let callback: SharedImportedCallback = Arc::new(callback);
        if let Some(run) = self.run.as_mut() {
            install_callback(&mut run.session, &callback);
        }
        self.on_imported = Some(callback);
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn position(&self) -> Option<BulkPosition> {
        let run = self.run.as_ref()?;
        let entry = run.queue.entries.get(run.index)?;
        Some(BulkPosition {
            index: run.index,
            total: run.queue.len(),
            folder_path: entry.folder_path.clone(),
            inferred_author: entry.inferred_author.clone(),
        })
    }

    pub fn failed_roots(&self) -> &[RootFailure] {
        self.run
            .as_ref()
            .map(|run| run.queue.failed_roots())
            .unwrap_or(&[])
    }

    pub fn session(&self) -> Option<&ImportSession> {
        self.run.as_ref().map(|run| &run.session)
    }

    /// The current entry's session, for user edits.
    pub fn session_mut(&mut self) -> Option<&mut ImportSession> {
        self.run.as_mut().map(|run| &mut run.session)
    }

    /// Build the queue and enter bulk mode at the first entry.
    pub async fn begin(&mut self, roots: &[String]) -> Result<BulkStart, BulkError> {
        if self.run.is_some() {
            return Err(BulkError::AlreadyActive);
        }

        let queue = BulkImportQueue::build(self.backend.as_ref(), roots).await;
        if queue.is_empty() {
            log::info!("Bulk import: nothing to import across {} roots", roots.len());
            self.message = Some(NOTHING_TO_IMPORT_MESSAGE.to_string());
            return Ok(BulkStart::NothingToImport);
        }

        let total = queue.len();
        log::info!(
            "Bulk import started: {} author folders, {} roots failed",
            total,
            queue.failed_roots().len()
        );
        self.message = if queue.failed_roots().is_empty() {
            None
        } else {
            Some(format!(
                "{} library folder(s) could not be read and were skipped.",
                queue.failed_roots().len()
            ))
        };

        let session = seeded_session(&queue.entries[0], self.on_imported.as_ref())?;
        self.run = Some(ActiveRun {
            queue,
            index: 0,
            session,
            auto_scanned: false,
        });
        Ok(BulkStart::Started { total })
    }

    /// Scan the current entry once its session's live values match the entry.
    ///
    /// Returns `true` when a scan was attempted. Fires at most once per
    /// entry; later scans are the user's call.
    pub async fn auto_scan_if_settled(&mut self) -> bool {
        let backend = Arc::clone(&self.backend);
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if run.auto_scanned || run.session.state() != SessionState::Idle {
            return false;
        }
        let Some(entry) = run.queue.entries.get(run.index) else {
            return false;
        };
        let expected_author = non_blank(Some(entry.inferred_author.as_str()));
        let settled = run.session.author_dir() == entry.folder_path.trim()
            && run.session.default_author() == expected_author.as_deref();
        if !settled {
            log::debug!(
                "Bulk import: session for '{}' not settled yet, deferring scan",
                entry.folder_path
            );
            return false;
        }

        run.auto_scanned = true;
        let dir = entry.folder_path.clone();
        let author = entry.inferred_author.clone();
        if let Err(e) = run
            .session
            .start_scan(backend.as_ref(), &dir, Some(author.as_str()), None)
            .await
        {
            log::warn!("Bulk import: auto-scan of '{}' failed: {e}", dir);
        }
        true
    }

    /// Commit the current session and advance when it closes.
    ///
    /// A failed commit leaves the session open; the user may retry or
    /// [`close_current`](Self::close_current) to move on.
    pub async fn commit_current(&mut self) -> Result<(CommitOutcome, BulkAdvance), BulkError> {
        let backend = Arc::clone(&self.backend);
        let run = self.run.as_mut().ok_or(BulkError::NotActive)?;
        let outcome = run.session.commit(backend.as_ref()).await?;
        let advance = self.advance()?;
        Ok((outcome, advance))
    }

    /// Close the current session without committing and advance.
    pub fn close_current(&mut self) -> Result<BulkAdvance, BulkError> {
        let run = self.run.as_mut().ok_or(BulkError::NotActive)?;
        run.session.cancel()?;
        self.advance()
    }

    /// Leave bulk mode immediately, discarding the current session.
    pub fn abort(&mut self) {
        if let Some(mut run) = self.run.take() {
            let _ = run.session.cancel();
            log::info!(
                "Bulk import aborted at {}/{}",
                run.index + 1,
                run.queue.len()
            );
        }
        self.message = None;
    }

    fn advance(&mut self) -> Result<BulkAdvance, BulkError> {
        let run = self.run.as_mut().ok_or(BulkError::NotActive)?;
        if !run.session.is_closed() {
            return Err(BulkError::SessionOpen);
        }

        let next = run.index + 1;
        if next >= run.queue.len() {
            log::info!("Bulk import finished: {} author folders", run.queue.len());
            self.run = None;
            self.message = Some(BULK_FINISHED_MESSAGE.to_string());
            return Ok(BulkAdvance::Finished);
        }

        run.session = seeded_session(&run.queue.entries[next], self.on_imported.as_ref())?;
        run.index = next;
        run.auto_scanned = false;
        Ok(BulkAdvance::Next {
            index: next,
            total: run.queue.len(),
        })
    }
}

fn seeded_session(
    entry: &AuthorFolder,
    on_imported: Option<&SharedImportedCallback>,
) -> Result<ImportSession, BulkError> {
    let mut session = ImportSession::new();
    session.set_author_dir(&entry.folder_path)?;
    session.set_default_author(Some(entry.inferred_author.as_str()))?;
    if let Some(callback) = on_imported {
        install_callback(&mut session, callback);
    }
    Ok(session)
}

fn install_callback(session: &mut ImportSession, callback: &SharedImportedCallback) {
    let callback = Arc::clone(callback);
    session.set_on_imported(move |report| callback(report));
}

#[cfg(test)]
#[path = "tests/bulk_tests.rs"]
mod tests;
