use super::BlobStore;
use crate::errors::AppError;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Fetch attempts before giving up on a source image
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Fixed delay between fetch attempts
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Content type stored for relocated images
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Moves a remote image into the durable blob store.
///
/// The remote body is staged through a uniquely named scratch file in the OS
/// temp dir; the scratch copy never outlives the relocation, whichever way it
/// ends.
pub struct ImageRelocator {
    client: reqwest::Client,
    blob_store: Arc<dyn BlobStore>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ImageRelocator {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            blob_store,
            max_attempts: MAX_FETCH_ATTEMPTS,
            retry_delay: FETCH_RETRY_DELAY,
        }
    }

    /// Override the retry policy. Tests use this to avoid real delays.
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        assert!(max_attempts > 0, "at least one attempt is required");
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    /// Fetch `source_url`, store it under a fresh random name, and return the
    /// durable public URL.
    pub async fn relocate(&self, source_url: &str) -> Result<String, AppError> {
        let name = format!("image_{}.jpg", random_suffix(10));
        let bytes = self.fetch_with_retry(source_url).await?;

        let scratch = ScratchFile::create(std::env::temp_dir().join(&name), &bytes).await?;
        let buffer = scratch.read().await?;
        self.blob_store
            .upload(&name, buffer, IMAGE_CONTENT_TYPE)
            .await?;
        let url = self.blob_store.public_url(&name);
        tracing::debug!(source = source_url, durable = %url, "image relocated");
        Ok(url)
        // `scratch` dropped here (and on every early return above) removes
        // the local copy.
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.fetch_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(reason) => {
                    tracing::warn!(
                        url,
                        attempt,
                        max_attempts = self.max_attempts,
                        %reason,
                        "image fetch failed"
                    );
                    last_error = reason;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(AppError::Fetch {
            url: url.to_string(),
            attempts: self.max_attempts,
            reason: last_error,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| e.to_string())
    }
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Scoped scratch file: removed when dropped, success or not.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    async fn create(path: PathBuf, bytes: &[u8]) -> Result<Self, AppError> {
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    async fn read(&self) -> Result<Vec<u8>, AppError> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    #[cfg(test)]
    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "scratch file not removed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;

    /// Serve a one-route image endpoint on an ephemeral port.
    async fn image_server() -> SocketAddr {
        let app = Router::new().route("/img.jpg", get(|| async { vec![0xFFu8, 0xD8, 0xFF] }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn relocates_to_a_fresh_durable_name() {
        let addr = image_server().await;
        let blob_store = Arc::new(MemoryBlobStore::new());
        let relocator = ImageRelocator::new(blob_store.clone());

        let url = relocator
            .relocate(&format!("http://{addr}/img.jpg"))
            .await
            .unwrap();

        assert!(url.starts_with("memory://blob/image_"));
        assert!(url.ends_with(".jpg"));
        assert_eq!(blob_store.object_count(), 1);
    }

    #[tokio::test]
    async fn distinct_relocations_get_distinct_names() {
        let addr = image_server().await;
        let blob_store = Arc::new(MemoryBlobStore::new());
        let relocator = ImageRelocator::new(blob_store.clone());
        let source = format!("http://{addr}/img.jpg");

        let first = relocator.relocate(&source).await.unwrap();
        let second = relocator.relocate(&source).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(blob_store.object_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_a_fetch_error() {
        let blob_store = Arc::new(MemoryBlobStore::new());
        let relocator = ImageRelocator::new(blob_store.clone())
            .with_retry(2, Duration::from_millis(10));

        // Port 1 refuses connections immediately.
        let err = relocator
            .relocate("http://127.0.0.1:1/img.jpg")
            .await
            .unwrap_err();
        match err {
            AppError::Fetch { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected Fetch, got {other:?}"),
        }
        assert_eq!(blob_store.object_count(), 0);
    }

    #[tokio::test]
    async fn scratch_file_is_removed_on_success() {
        let addr = image_server().await;
        let blob_store = Arc::new(MemoryBlobStore::new());
        let relocator = ImageRelocator::new(blob_store.clone());
        relocator
            .relocate(&format!("http://{addr}/img.jpg"))
            .await
            .unwrap();

        // The scratch file shares the uploaded object's name.
        let names = blob_store.object_names();
        assert_eq!(names.len(), 1);
        assert!(!std::env::temp_dir().join(&names[0]).exists());
    }

    #[tokio::test]
    async fn scratch_file_is_removed_on_upload_failure() {
        let addr = image_server().await;
        let blob_store = Arc::new(MemoryBlobStore::new());
        blob_store.fail_uploads();
        let relocator = ImageRelocator::new(blob_store.clone());

        let err = relocator
            .relocate(&format!("http://{addr}/img.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BlobStore(_)));

        let rejected = blob_store.rejected_names();
        assert_eq!(rejected.len(), 1);
        assert!(!std::env::temp_dir().join(&rejected[0]).exists());
    }

    #[tokio::test]
    async fn scratch_guard_removes_its_file() {
        let path = std::env::temp_dir().join(format!("scratch_guard_{}.tmp", random_suffix(8)));
        let scratch = ScratchFile::create(path.clone(), b"bytes").await.unwrap();
        assert!(scratch.path().exists());
        drop(scratch);
        assert!(!path.exists());
    }
}
