use super::BlobStore;
use crate::errors::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory blob store for tests and local development.
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    rejected: Mutex<Vec<String>>,
    fail_uploads: Mutex<bool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            rejected: Mutex::new(Vec::new()),
            fail_uploads: Mutex::new(false),
        }
    }

    /// Make every subsequent upload fail.
    pub fn fail_uploads(&self) {
        *self.fail_uploads.lock().unwrap() = true;
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.lock().unwrap().contains_key(name)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object_names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Names of uploads that were turned away by `fail_uploads`.
    pub fn rejected_names(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        if *self.fail_uploads.lock().unwrap() {
            self.rejected.lock().unwrap().push(name.to_string());
            return Err(AppError::BlobStore("upload rejected".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!("memory://blob/{name}")
    }
}
