//! Blob store collaborator and image relocation.

mod http;
mod memory;
mod relocate;

pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;
pub use relocate::ImageRelocator;

use crate::errors::AppError;
use async_trait::async_trait;

/// Durable blob storage: store bytes under a name, get back a public URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), AppError>;

    /// Public URL for a stored object. Pure name-to-URL mapping, no I/O.
    fn public_url(&self, name: &str) -> String;
}
