pub mod busy;
pub mod controller;
pub mod hub;

pub use controller::{CancelOutcome, PreviewGenerationController, StartOutcome};
pub use hub::{ProgressHub, ProgressSubscription};
