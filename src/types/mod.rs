pub mod catalog;
pub mod draft;
pub mod errors;
pub mod preview;

pub use catalog::{CatalogCharacter, CatalogCostume, CatalogListResponse};
pub use draft::{AuthorFolder, CommitReport, DraftMod, DraftPatch, ModType};
pub use errors::{BulkError, CommandError, CommandResult, SessionError};
pub use preview::{PreviewInfo, PreviewKind, PreviewProgress, PreviewStatus, SequencedProgress};

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod errors_tests;

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod draft_tests;

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod preview_tests;
