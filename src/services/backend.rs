//! Backend collaborator seams.
//!
//! The host shell implements these over its IPC layer. Every call is async
//! and reports failures as `CommandError`; the services catch them at the
//! call site and turn them into session or progress state.

use std::future::Future;

use crate::types::{
    AuthorFolder, CatalogListResponse, CommandResult, CommitReport, DraftMod, PreviewInfo,
    PreviewKind,
};

/// Dry-run scan and commit of one author folder.
pub trait ImportBackend: Send + Sync {
    fn scan_author_folder(
        &self,
        author_dir: &str,
        default_author: Option<&str>,
        default_download_url: Option<&str>,
    ) -> impl Future<Output = CommandResult<Vec<DraftMod>>> + Send;

    /// All-or-nothing from the caller's point of view.
    fn commit_drafts(
        &self,
        drafts: Vec<DraftMod>,
    ) -> impl Future<Output = CommandResult<CommitReport>> + Send;
}

pub trait LibraryBackend: Send + Sync {
    fn list_author_folders(
        &self,
        library_root: &str,
    ) -> impl Future<Output = CommandResult<Vec<AuthorFolder>>> + Send;
}

pub trait CatalogBackend: Send + Sync {
    fn list_catalog(&self) -> impl Future<Output = CommandResult<CatalogListResponse>> + Send;
}

/// Preview jobs are fire-and-forget; their results arrive on the progress
/// stream (`services::preview::hub::ProgressHub`).
pub trait PreviewBackend: Send + Sync {
    fn start_image_generation(&self) -> impl Future<Output = CommandResult<()>> + Send;

    fn start_video_generation(&self) -> impl Future<Output = CommandResult<()>> + Send;

    fn cancel_generation(&self, kind: PreviewKind)
        -> impl Future<Output = CommandResult<()>> + Send;

    fn fetch_preview(
        &self,
        folder_path: &str,
    ) -> impl Future<Output = CommandResult<PreviewInfo>> + Send;
}
