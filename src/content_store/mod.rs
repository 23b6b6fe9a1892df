//! Content store collaborator: typed documents plus their ordered body units.
//!
//! The trait mirrors the handful of operations the pipeline needs from the
//! external document API. Implementations must be `Send + Sync` so services
//! can share them behind `Arc<dyn ContentStore>`.

mod codec;
mod http;
mod memory;

pub use http::HttpContentStore;
pub use memory::MemoryContentStore;

use crate::errors::AppError;
use crate::model::{ContentUnit, NamedField, SourceDocument};
use async_trait::async_trait;

/// One bounded page of a collection enumeration.
#[derive(Clone, Debug)]
pub struct DocumentPage {
    pub items: Vec<SourceDocument>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch one page of the collection, continuing from `cursor` if given.
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<DocumentPage, AppError>;

    async fn get_document(&self, document_id: &str) -> Result<SourceDocument, AppError>;

    /// Create a document and return its identifier. The store needs a
    /// concrete id before incremental field updates can target it.
    async fn create_document(
        &self,
        collection_id: &str,
        fields: &[NamedField],
    ) -> Result<String, AppError>;

    async fn update_document_fields(
        &self,
        document_id: &str,
        fields: &[NamedField],
    ) -> Result<(), AppError>;

    /// Ordered body units of a document.
    async fn list_content_units(&self, document_id: &str) -> Result<Vec<ContentUnit>, AppError>;

    /// Append units to a document body in one batched call.
    async fn append_content_units(
        &self,
        document_id: &str,
        units: &[ContentUnit],
    ) -> Result<(), AppError>;
}
