use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};

use crate::services::backend::{CatalogBackend, ImportBackend, LibraryBackend, PreviewBackend};
use crate::types::{
    AuthorFolder, CatalogCharacter, CatalogCostume, CatalogListResponse, CommandError,
    CommandResult, CommitReport, DraftMod, PreviewInfo, PreviewKind,
};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        // Initialize logger only once
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn draft(path: &str, name: &str) -> DraftMod {
    DraftMod::new(path, name)
}

pub fn author_folder(path: &str, author: &str) -> AuthorFolder {
    AuthorFolder {
        folder_path: path.to_string(),
        inferred_author: author.to_string(),
    }
}

/// Two characters; character 2 owns costumes 1 and 3, character 4 owns 5.
pub fn sample_catalog() -> CatalogListResponse {
    let character = |id: i64, slug: &str, name: &str| CatalogCharacter {
        id,
        slug: slug.to_string(),
        display_name: name.to_string(),
    };
    let costume = |id: i64, character_id: i64, slug: &str, name: &str| CatalogCostume {
        id,
        character_id,
        slug: slug.to_string(),
        display_name: name.to_string(),
    };
    CatalogListResponse {
        characters: vec![character(2, "lathel", "Lathel"), character(4, "justia", "Justia")],
        costumes: vec![
            costume(1, 2, "default", "Default"),
            costume(3, 2, "swimsuit", "Swimsuit"),
            costume(5, 4, "maid", "Maid"),
        ],
    }
}

// ─── Import ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ScanCall {
    pub author_dir: String,
    pub default_author: Option<String>,
    pub default_download_url: Option<String>,
}

/// Scripted import backend. Unscripted scans return no drafts; unscripted
/// commits report every draft as inserted.
#[derive(Default)]
pub struct FakeImportBackend {
    scan_responses: Mutex<VecDeque<CommandResult<Vec<DraftMod>>>>,
    commit_responses: Mutex<VecDeque<CommandResult<CommitReport>>>,
    scans: Mutex<Vec<ScanCall>>,
    commits: Mutex<Vec<Vec<DraftMod>>>,
}

impl FakeImportBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scan(&self, response: CommandResult<Vec<DraftMod>>) {
        self.scan_responses.lock().unwrap().push_back(response);
    }

    pub fn push_commit(&self, response: CommandResult<CommitReport>) {
        self.commit_responses.lock().unwrap().push_back(response);
    }

    pub fn scans(&self) -> Vec<ScanCall> {
        self.scans.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<Vec<DraftMod>> {
        self.commits.lock().unwrap().clone()
    }
}

impl ImportBackend for FakeImportBackend {
    async fn scan_author_folder(
        &self,
        author_dir: &str,
        default_author: Option<&str>,
        default_download_url: Option<&str>,
    ) -> CommandResult<Vec<DraftMod>> {
        self.scans.lock().unwrap().push(ScanCall {
            author_dir: author_dir.to_string(),
            default_author: default_author.map(str::to_string),
            default_download_url: default_download_url.map(str::to_string),
        });
        self.scan_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn commit_drafts(&self, drafts: Vec<DraftMod>) -> CommandResult<CommitReport> {
        let inserted = drafts.len();
        self.commits.lock().unwrap().push(drafts);
        self.commit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(CommitReport {
                inserted,
                updated: 0,
            }))
    }
}

// ─── Library ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeLibraryBackend {
    roots: HashMap<String, CommandResult<Vec<AuthorFolder>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeLibraryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: &str, folders: Vec<AuthorFolder>) -> Self {
        self.roots.insert(root.to_string(), Ok(folders));
        self
    }

    pub fn with_failing_root(mut self, root: &str, error: &str) -> Self {
        self.roots
            .insert(root.to_string(), Err(CommandError::Io(error.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl LibraryBackend for FakeLibraryBackend {
    async fn list_author_folders(&self, library_root: &str) -> CommandResult<Vec<AuthorFolder>> {
        self.calls.lock().unwrap().push(library_root.to_string());
        self.roots
            .get(library_root)
            .cloned()
            .unwrap_or_else(|| Err(CommandError::NotFound(library_root.to_string())))
    }
}

// ─── Catalog ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCatalogBackend {
    responses: Mutex<VecDeque<CommandResult<CatalogListResponse>>>,
    calls: Mutex<usize>,
}

impl FakeCatalogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: CommandResult<CatalogListResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl CatalogBackend for FakeCatalogBackend {
    async fn list_catalog(&self) -> CommandResult<CatalogListResponse> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(sample_catalog()))
    }
}

// ─── Preview ───────────────────────────────────────────────────────

/// Records calls as `"start:image"`, `"cancel:video"`, `"fetch:<path>"`.
#[derive(Default)]
pub struct FakePreviewBackend {
    start_error: Mutex<Option<CommandError>>,
    cancel_error: Mutex<Option<CommandError>>,
    fetch_error: Mutex<Option<CommandError>>,
    previews: Mutex<HashMap<String, PreviewInfo>>,
    calls: Mutex<Vec<String>>,
}

impl FakePreviewBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_start(&self, error: CommandError) {
        *self.start_error.lock().unwrap() = Some(error);
    }

    pub fn fail_next_cancel(&self, error: CommandError) {
        *self.cancel_error.lock().unwrap() = Some(error);
    }

    pub fn fail_next_fetch(&self, error: CommandError) {
        *self.fetch_error.lock().unwrap() = Some(error);
    }

    pub fn set_preview(&self, info: PreviewInfo) {
        self.previews
            .lock()
            .unwrap()
            .insert(info.folder_path.clone(), info);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn start(&self, kind: PreviewKind) -> CommandResult<()> {
        self.record(format!("start:{kind}"));
        match self.start_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl PreviewBackend for FakePreviewBackend {
    async fn start_image_generation(&self) -> CommandResult<()> {
        self.start(PreviewKind::Image)
    }

    async fn start_video_generation(&self) -> CommandResult<()> {
        self.start(PreviewKind::Video)
    }

    async fn cancel_generation(&self, kind: PreviewKind) -> CommandResult<()> {
        self.record(format!("cancel:{kind}"));
        match self.cancel_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn fetch_preview(&self, folder_path: &str) -> CommandResult<PreviewInfo> {
        self.record(format!("fetch:{folder_path}"));
        if let Some(e) = self.fetch_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self
            .previews
            .lock()
            .unwrap()
            .get(folder_path)
            .cloned()
            .unwrap_or_else(|| PreviewInfo {
                folder_path: folder_path.to_string(),
                ..PreviewInfo::default()
            }))
    }
}

// ─── Combined ──────────────────────────────────────────────────────

/// Import + library backend in one, as the bulk runner needs.
#[derive(Default)]
pub struct FakeBulkBackend {
    pub import: FakeImportBackend,
    pub library: FakeLibraryBackend,
}

impl FakeBulkBackend {
    pub fn new(library: FakeLibraryBackend) -> Self {
        Self {
            import: FakeImportBackend::new(),
            library,
        }
    }
}

impl ImportBackend for FakeBulkBackend {
    async fn scan_author_folder(
        &self,
        author_dir: &str,
        default_author: Option<&str>,
        default_download_url: Option<&str>,
    ) -> CommandResult<Vec<DraftMod>> {
        self.import
            .scan_author_folder(author_dir, default_author, default_download_url)
            .await
    }

    async fn commit_drafts(&self, drafts: Vec<DraftMod>) -> CommandResult<CommitReport> {
        self.import.commit_drafts(drafts).await
    }
}

impl LibraryBackend for FakeBulkBackend {
    async fn list_author_folders(&self, library_root: &str) -> CommandResult<Vec<AuthorFolder>> {
        self.library.list_author_folders(library_root).await
    }
}
