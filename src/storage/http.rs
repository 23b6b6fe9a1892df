use super::BlobStore;
use crate::config::StorageConfig;
use crate::errors::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Upload timeout for blob store calls
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// HTTP blob store client (Supabase-storage-style REST API).
///
/// Objects land in a single configured bucket; public URLs are derived from
/// the bucket path, no signing involved.
pub struct HttpBlobStore {
    client: reqwest::Client,
    config: StorageConfig,
}

impl HttpBlobStore {
    pub fn new(config: StorageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/object/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.bucket,
            name
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::BlobStore(format!("upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BlobStore(format!("upload error {status}: {body}")));
        }
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.bucket,
            name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_is_bucket_scoped() {
        let store = HttpBlobStore::new(StorageConfig {
            base_url: "https://blobs.example/storage/v1/".into(),
            api_key: "key".into(),
            bucket: "ppt".into(),
        });
        assert_eq!(
            store.public_url("image_abc.jpg"),
            "https://blobs.example/storage/v1/object/public/ppt/image_abc.jpg"
        );
    }
}
