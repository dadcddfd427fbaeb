//! Progress event stream between the host and the preview view.
//!
//! The host publishes every `PreviewProgress` it receives from the generator.
//! At most one view is subscribed; a new subscription replaces the old one.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc as tokio_mpsc;

use crate::types::{PreviewProgress, SequencedProgress};

struct Subscriber {
    id: String,
    tx: tokio_mpsc::UnboundedSender<SequencedProgress>,
}

#[derive(Default)]
struct HubInner {
    last_seq: u64,
    subscriber: Option<Subscriber>,
}

#[derive(Clone, Default)]
pub struct ProgressHub {
    inner: Arc<Mutex<HubInner>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Stamp the next sequence number and deliver to the current subscriber.
    pub fn publish(&self, progress: PreviewProgress) -> u64 {
        let mut inner = self.lock();
        inner.last_seq += 1;
        let seq = inner.last_seq;

        if let Some(subscriber) = inner.subscriber.as_ref() {
            let event = SequencedProgress { seq, progress };
            if subscriber.tx.send(event).is_err() {
                // Receiver was dropped without unsubscribing
                log::debug!("Progress subscriber {} gone, detaching", subscriber.id);
                inner.subscriber = None;
            }
        } else {
            log::trace!("Progress event #{seq} published with no subscriber");
        }
        seq
    }

    /// Attach a new subscriber. The previous subscription's stream ends.
    pub fn subscribe(&self) -> ProgressSubscription {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        let id = uuid::Uuid::new_v4().to_string();

        let mut inner = self.lock();
        if let Some(previous) = inner.subscriber.replace(Subscriber { id: id.clone(), tx }) {
            log::debug!("Progress subscriber {} replaced by {}", previous.id, id);
        }
        ProgressSubscription { id, rx }
    }

    /// Detach `subscription` if it is still the current subscriber.
    pub fn unsubscribe(&self, subscription: &ProgressSubscription) -> bool {
        let mut inner = self.lock();
        let is_current = inner
            .subscriber
            .as_ref()
            .is_some_and(|s| s.id == subscription.id);
        if is_current {
            inner.subscriber = None;
        }
        is_current
    }

    pub fn has_subscriber(&self) -> bool {
        self.lock().subscriber.is_some()
    }

    pub fn last_seq(&self) -> u64 {
        self.lock().last_seq
    }

    /// Whether both handles share one sequence space.
    pub fn same_hub(&self, other: &ProgressHub) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Receiving end handed to one view.
#[derive(Debug)]
pub struct ProgressSubscription {
    id: String,
    rx: tokio_mpsc::UnboundedReceiver<SequencedProgress>,
}

impl ProgressSubscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the next event. `None` once the hub detached this subscription
    /// and every queued event has been read.
    pub async fn next(&mut self) -> Option<SequencedProgress> {
        self.rx.recv().await
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<SequencedProgress> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
#[path = "tests/hub_tests.rs"]
mod tests;
