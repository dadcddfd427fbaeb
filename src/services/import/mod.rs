//! Import workflow: author inference, draft reconciliation, per-folder
//! sessions and bulk traversal across library roots.

pub mod author;
pub mod bulk;
pub mod normalizer;
pub mod reconcile;
pub mod session;

pub use author::{infer_author_name, AuthorAlias, AuthorInference, UNKNOWN_AUTHOR};
pub use bulk::{
    BulkAdvance, BulkImportQueue, BulkImportRunner, BulkPosition, BulkStart, SharedImportedCallback,
};
pub use reconcile::reconcile_drafts;
pub use session::{CommitOutcome, ImportSession, SessionState};
