#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use modshelf_lib::services::backend::{ImportBackend, LibraryBackend, PreviewBackend};
use modshelf_lib::services::import::normalizer::{file_name_of, normalize_path_string};
use modshelf_lib::services::import::AuthorInference;
use modshelf_lib::services::preview::ProgressHub;
use modshelf_lib::types::{
    AuthorFolder, CommandError, CommandResult, CommitReport, DraftMod, PreviewInfo, PreviewKind,
    PreviewProgress, PreviewStatus,
};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn mkdirs(root: &Path, rel: &[&str]) {
    for r in rel {
        fs::create_dir_all(root.join(r)).unwrap();
    }
}

pub fn path_str(path: &Path) -> String {
    normalize_path_string(&path.to_string_lossy())
}

fn subdirs(dir: &str) -> CommandResult<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            out.push(path_str(&entry.path()));
        }
    }
    out.sort();
    Ok(out)
}

/// Library + import host backed by the real filesystem and an in-memory
/// mods table.
pub struct FsHost {
    inference: AuthorInference,
    pub mods: Mutex<HashMap<String, DraftMod>>,
}

impl FsHost {
    pub fn new(inference: AuthorInference) -> Self {
        Self {
            inference,
            mods: Mutex::new(HashMap::new()),
        }
    }

    pub fn mod_count(&self) -> usize {
        self.mods.lock().unwrap().len()
    }
}

impl LibraryBackend for FsHost {
    async fn list_author_folders(&self, library_root: &str) -> CommandResult<Vec<AuthorFolder>> {
        Ok(subdirs(library_root)?
            .into_iter()
            .map(|folder_path| AuthorFolder {
                inferred_author: self.inference.infer(file_name_of(&folder_path)),
                folder_path,
            })
            .collect())
    }
}

impl ImportBackend for FsHost {
    async fn scan_author_folder(
        &self,
        author_dir: &str,
        default_author: Option<&str>,
        default_download_url: Option<&str>,
    ) -> CommandResult<Vec<DraftMod>> {
        Ok(subdirs(author_dir)?
            .into_iter()
            .map(|path| {
                let mut draft = DraftMod::new(&path, file_name_of(&path));
                draft.author = default_author.map(str::to_string);
                draft.download_url = default_download_url.map(str::to_string);
                draft
            })
            .collect())
    }

    async fn commit_drafts(&self, drafts: Vec<DraftMod>) -> CommandResult<CommitReport> {
        let mut mods = self.mods.lock().unwrap();
        let mut report = CommitReport::default();
        for draft in drafts {
            match mods.insert(draft.folder_path.clone(), draft) {
                Some(_) => report.updated += 1,
                None => report.inserted += 1,
            }
        }
        Ok(report)
    }
}

/// Preview generator that runs jobs on a tokio task and reports through
/// a `ProgressHub`, like the host's event bridge.
pub struct SimulatedGenerator {
    hub: ProgressHub,
    items: u64,
    step: Duration,
    cancel: Arc<AtomicBool>,
    pub previews: Mutex<HashMap<String, PreviewInfo>>,
}

impl SimulatedGenerator {
    pub fn new(hub: &ProgressHub, items: u64, step: Duration) -> Self {
        Self {
            hub: hub.clone(),
            items,
            step,
            cancel: Arc::new(AtomicBool::new(false)),
            previews: Mutex::new(HashMap::new()),
        }
    }

    fn spawn_job(&self, kind: PreviewKind) {
        let hub = self.hub.clone();
        let cancel = Arc::clone(&self.cancel);
        let items = self.items;
        let step = self.step;
        cancel.store(false, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut progress = PreviewProgress {
                total: items,
                message: None,
                ..PreviewProgress::preparing(kind)
            };
            for i in 0..items {
                tokio::time::sleep(step).await;
                if cancel.load(Ordering::SeqCst) {
                    progress.status = PreviewStatus::Cancelled;
                    progress.message = Some("Cancelled".into());
                    hub.publish(progress);
                    return;
                }
                progress.processed = i + 1;
                progress.generated = i + 1;
                progress.current_mod = Some(format!("mod-{i}"));
                hub.publish(progress.clone());
            }
            progress.status = PreviewStatus::Done;
            progress.message = Some("Done".into());
            hub.publish(progress);
        });
    }
}

impl PreviewBackend for SimulatedGenerator {
    async fn start_image_generation(&self) -> CommandResult<()> {
        self.spawn_job(PreviewKind::Image);
        Ok(())
    }

    async fn start_video_generation(&self) -> CommandResult<()> {
        self.spawn_job(PreviewKind::Video);
        Ok(())
    }

    async fn cancel_generation(&self, _kind: PreviewKind) -> CommandResult<()> {
        self.cancel.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_preview(&self, folder_path: &str) -> CommandResult<PreviewInfo> {
        self.previews
            .lock()
            .unwrap()
            .get(folder_path)
            .cloned()
            .ok_or_else(|| CommandError::NotFound(folder_path.to_string()))
    }
}
