//! Single busy token shared by both preview job kinds.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::types::PreviewKind;

const IDLE: u8 = 0;
const IMAGE: u8 = 1;
const VIDEO: u8 = 2;

fn encode(kind: PreviewKind) -> u8 {
    match kind {
        PreviewKind::Image => IMAGE,
        PreviewKind::Video => VIDEO,
    }
}

fn decode(raw: u8) -> Option<PreviewKind> {
    match raw {
        IMAGE => Some(PreviewKind::Image),
        VIDEO => Some(PreviewKind::Video),
        _ => None,
    }
}

/// Which job kind currently owns the generator, plus its cancel request.
#[derive(Debug, Default)]
pub struct BusyToken {
    active: AtomicU8,
    cancel_requested: AtomicBool,
}

impl BusyToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the token for `kind`. Fails with the kind that already holds it.
    pub fn try_acquire(&self, kind: PreviewKind) -> Result<(), PreviewKind> {
        self.active
            .compare_exchange(IDLE, encode(kind), Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|held| decode(held).unwrap_or(kind))
    }

    /// Take the token for a job started elsewhere.
    pub fn adopt(&self, kind: PreviewKind) {
        self.active.store(encode(kind), Ordering::SeqCst);
    }

    /// Free the token. Any pending cancel request is settled with it.
    pub fn release(&self) {
        self.active.store(IDLE, Ordering::SeqCst);
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    pub fn active(&self) -> Option<PreviewKind> {
        decode(self.active.load(Ordering::SeqCst))
    }

    pub fn is_busy(&self) -> bool {
        self.active().is_some()
    }

    /// Flag a cancel for the running `kind`. `false` if `kind` is not the
    /// running job or a cancel is already pending.
    pub fn request_cancel(&self, kind: PreviewKind) -> bool {
        if self.active() != Some(kind) {
            return false;
        }
        self.cancel_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn reset_cancel(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "tests/busy_tests.rs"]
mod tests;
