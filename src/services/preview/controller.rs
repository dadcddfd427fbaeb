//! Preview generation: start/cancel a job, fold its progress stream, and keep
//! the selected mod's preview fresh.

use std::sync::Arc;

use super::busy::BusyToken;
use super::hub::{ProgressHub, ProgressSubscription};
use crate::services::backend::PreviewBackend;
use crate::services::import::normalizer::normalize_path_string;
use crate::types::preview::CANCELLING_MESSAGE;
use crate::types::{CommandError, PreviewInfo, PreviewKind, PreviewProgress, SequencedProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Another job (of either kind) is running.
    Rejected { active: PreviewKind },
    /// The backend refused; progress shows a terminal error.
    Failed(CommandError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Requested,
    /// No job of that kind is running, or a cancel is already pending.
    Ignored,
    /// Forwarding failed; the cancel flag was reset.
    Failed(CommandError),
}

pub struct PreviewGenerationController<B> {
    backend: Arc<B>,
    busy: BusyToken,
    progress: Option<PreviewProgress>,
    last_seq: Option<u64>,
    hub: Option<ProgressHub>,
    /// Hub whose numbering `last_seq` belongs to; kept across unmount.
    seq_hub: Option<ProgressHub>,
    subscription: Option<ProgressSubscription>,
    selected: Option<String>,
    preview: Option<PreviewInfo>,
}

impl<B: PreviewBackend> PreviewGenerationController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            busy: BusyToken::new(),
            progress: None,
            last_seq: None,
            hub: None,
            seq_hub: None,
            subscription: None,
            selected: None,
            preview: None,
        }
    }

    // ─── Accessors ─────────────────────────────────────────────────────

    pub fn progress(&self) -> Option<&PreviewProgress> {
        self.progress.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn active_kind(&self) -> Option<PreviewKind> {
        self.busy.active()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.busy.is_cancel_requested()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn preview(&self) -> Option<&PreviewInfo> {
        self.preview.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    // ─── Jobs ──────────────────────────────────────────────────────────

    pub async fn start(&mut self, kind: PreviewKind) -> StartOutcome {
        if let Err(active) = self.busy.try_acquire(kind) {
            log::info!("Preview {kind} generation rejected: {active} job is running");
            return StartOutcome::Rejected { active };
        }
        self.busy.reset_cancel();
        self.progress = Some(PreviewProgress::preparing(kind));
        log::info!("Starting preview {kind} generation");

        let result = match kind {
            PreviewKind::Image => self.backend.start_image_generation().await,
            PreviewKind::Video => self.backend.start_video_generation().await,
        };

        match result {
            Ok(()) => StartOutcome::Started,
            Err(e) => {
                log::error!("Preview {kind} generation failed to start: {e}");
                self.progress = Some(PreviewProgress::start_failed(kind, e.to_string()));
                self.busy.release();
                StartOutcome::Failed(e)
            }
        }
    }

    /// Ask the backend to stop the running `kind` job. The job only counts as
    /// stopped once its terminal event arrives.
    pub async fn cancel(&mut self, kind: PreviewKind) -> CancelOutcome {
        let running = self.progress.as_ref().is_some_and(|p| p.is_running());
        if !running || !self.busy.request_cancel(kind) {
            return CancelOutcome::Ignored;
        }
        if let Some(progress) = self.progress.as_mut() {
            progress.message = Some(CANCELLING_MESSAGE.to_string());
        }
        log::info!("Cancelling preview {kind} generation");

        match self.backend.cancel_generation(kind).await {
            Ok(()) => CancelOutcome::Requested,
            Err(e) => {
                log::warn!("Cancel of preview {kind} generation failed: {e}");
                self.busy.reset_cancel();
                if let Some(progress) = self.progress.as_mut() {
                    progress.message = Some(format!("Cancel failed: {e}"));
                }
                CancelOutcome::Failed(e)
            }
        }
    }

    /// Drop the finished job's progress. Refused while a job runs.
    pub fn clear(&mut self) -> bool {
        if self.busy.is_busy() {
            return false;
        }
        self.progress = None;
        self.busy.reset_cancel();
        true
    }

    /// Fold one streamed event into the current progress.
    ///
    /// Returns `false` for duplicates and for events of a kind other than the
    /// running job.
    pub async fn apply_event(&mut self, event: SequencedProgress) -> bool {
        if self.last_seq.is_some_and(|last| event.seq <= last) {
            log::trace!("Preview progress #{} already applied", event.seq);
            return false;
        }
        self.last_seq = Some(event.seq);

        let kind = event.progress.kind;
        match self.busy.active() {
            Some(active) if active != kind => {
                log::debug!("Ignoring {kind} progress while {active} job is running");
                return false;
            }
            None if event.progress.is_running() => {
                log::info!("Adopting running preview {kind} job");
                self.busy.adopt(kind);
            }
            _ => {}
        }

        let has_message = event.progress.message.is_some();
        let mut progress = PreviewProgress::merged(self.progress.as_ref(), event.progress);
        let terminal = progress.status.is_terminal();
        if terminal && !has_message && progress.message.as_deref() == Some(CANCELLING_MESSAGE) {
            progress.message = None;
        }
        if terminal {
            log::info!(
                "Preview {kind} generation {:?}: generated={} skipped={} errors={}",
                progress.status,
                progress.generated,
                progress.skipped,
                progress.errors
            );
        }
        self.progress = Some(progress);

        if terminal {
            self.busy.release();
            self.refresh_selected().await;
        }
        true
    }

    // ─── Selection ─────────────────────────────────────────────────────

    /// Show `folder_path`'s preview and fetch it.
    pub async fn select(&mut self, folder_path: &str) -> Option<&PreviewInfo> {
        let folder_path = normalize_path_string(folder_path);
        if folder_path.is_empty() {
            self.deselect();
            return None;
        }
        if self.selected.as_deref() != Some(folder_path.as_str()) {
            self.preview = None;
        }
        self.selected = Some(folder_path);
        self.refresh_selected().await;
        self.preview.as_ref()
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.preview = None;
    }

    /// Refetch the selected preview. A failure keeps the previous info.
    pub async fn refresh_selected(&mut self) {
        let Some(folder_path) = self.selected.clone() else {
            return;
        };
        match self.backend.fetch_preview(&folder_path).await {
            Ok(info) => self.preview = Some(info),
            Err(e) => log::warn!("Failed to refresh preview for '{}': {e}", folder_path),
        }
    }

    // ─── Event stream ──────────────────────────────────────────────────

    /// Subscribe to `hub`, replacing any earlier subscription.
    ///
    /// Sequence numbers are per hub, so switching to another hub forgets the
    /// last applied one.
    pub fn mount(&mut self, hub: &ProgressHub) {
        self.unmount();
        if self.seq_hub.as_ref().is_some_and(|seen| !seen.same_hub(hub)) {
            log::debug!("Mounted on a new progress hub, resetting sequence");
            self.last_seq = None;
        }
        self.subscription = Some(hub.subscribe());
        self.hub = Some(hub.clone());
        self.seq_hub = Some(hub.clone());
    }

    pub fn unmount(&mut self) {
        if let (Some(hub), Some(subscription)) = (self.hub.take(), self.subscription.take()) {
            hub.unsubscribe(&subscription);
        }
    }

    /// Wait for the next event and apply it.
    ///
    /// `None` when unmounted or the stream ended; otherwise whether the event
    /// was applied.
    pub async fn next_event(&mut self) -> Option<bool> {
        let subscription = self.subscription.as_mut()?;
        let event = subscription.next().await?;
        Some(self.apply_event(event).await)
    }

    /// Apply every event already queued, without waiting. Returns how many
    /// were applied.
    pub async fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(event) = self.subscription.as_mut().and_then(|s| s.try_next()) else {
                break;
            };
            if self.apply_event(event).await {
                applied += 1;
            }
        }
        applied
    }
}

impl<B> Drop for PreviewGenerationController<B> {
    fn drop(&mut self) {
        if let (Some(hub), Some(subscription)) = (self.hub.as_ref(), self.subscription.as_ref()) {
            hub.unsubscribe(subscription);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
