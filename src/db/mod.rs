//! Side-table persistence: one row per source document tracking its
//! per-language destination links.

mod ledger;
mod models;

pub use ledger::{DbLedger, MemoryLedger};
pub use models::Model as TranslationLinkModel;

use crate::errors::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait LinkLedger: Send + Sync {
    /// Create the record for a source document. A conflicting insert means
    /// the document is already being tracked and yields
    /// [`AppError::DuplicateRecord`].
    async fn insert_record(&self, source_id: &str, source_url: &str) -> Result<(), AppError>;

    /// Record the destination URL produced for one language.
    async fn update_record(
        &self,
        source_id: &str,
        language: &str,
        url: &str,
    ) -> Result<(), AppError>;
}
