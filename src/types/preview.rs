//! Preview generation progress contracts.
//!
//! `PreviewProgress` is both the payload streamed by the backend while a job
//! runs and the state the controller keeps for the view.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PREPARING_MESSAGE: &str = "Preparing preview generation...";
pub const CANCELLING_MESSAGE: &str = "Cancelling...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewKind::Image => f.write_str("image"),
            PreviewKind::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStatus {
    Running,
    Done,
    Error,
    Cancelled,
}

impl PreviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PreviewStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewProgress {
    pub kind: PreviewKind,
    pub status: PreviewStatus,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub generated: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub current_mod: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PreviewProgress {
    /// Optimistic state published the moment a job is accepted.
    pub fn preparing(kind: PreviewKind) -> Self {
        Self {
            kind,
            status: PreviewStatus::Running,
            total: 0,
            processed: 0,
            generated: 0,
            skipped: 0,
            errors: 0,
            current_mod: None,
            message: Some(PREPARING_MESSAGE.to_string()),
        }
    }

    /// Terminal entry for a job the backend refused to start.
    pub fn start_failed(kind: PreviewKind, message: impl Into<String>) -> Self {
        Self {
            status: PreviewStatus::Error,
            errors: 1,
            message: Some(message.into()),
            ..Self::preparing(kind)
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == PreviewStatus::Running
    }

    /// Fold a streamed event into the previous state.
    ///
    /// Counters and status come from `event`. `message` and `current_mod`
    /// carry over from `previous` (same kind only) when the event leaves
    /// them out.
    pub fn merged(previous: Option<&PreviewProgress>, event: PreviewProgress) -> PreviewProgress {
        let Some(previous) = previous.filter(|p| p.kind == event.kind) else {
            return event;
        };
        PreviewProgress {
            current_mod: event.current_mod.or_else(|| previous.current_mod.clone()),
            message: event.message.or_else(|| previous.message.clone()),
            ..event
        }
    }
}

/// Progress payload stamped by the hub, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedProgress {
    pub seq: u64,
    pub progress: PreviewProgress,
}

/// Preview media currently known for one mod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewInfo {
    pub folder_path: String,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
}
