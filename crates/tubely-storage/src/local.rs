use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tubely_core::VideoReference;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}`. Presigned URLs point at
/// `{base_url}/{bucket}/{key}` and carry an expiry timestamp plus an HMAC-SHA256
/// signature over method, object path and expiry.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/tubely/media")
    /// * `base_url` - Base URL the API serves objects from (e.g., "http://localhost:8091/media")
    /// * `bucket` - Bucket name written into references for uploaded objects
    /// * `signing_secret` - HMAC key for presigned URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        if bucket.is_empty() || bucket.contains(['/', ',']) || bucket.contains("..") {
            return Err(StorageError::ConfigError(format!(
                "Invalid local bucket name: {}",
                bucket
            )));
        }

        fs::create_dir_all(base_path.join(&bucket)).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
            signing_secret: signing_secret.into(),
        })
    }

    /// Convert bucket and key to a filesystem path with traversal validation.
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.contains("..") {
            return Err(StorageError::InvalidKey(format!("invalid bucket: {}", bucket)));
        }

        let path = self.base_path.join(bucket).join(key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }
        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn signature(&self, bucket: &str, key: &str, expires: u64) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(format!("GET\n{}/{}\n{}", bucket, key, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Signed URL valid until the unix timestamp `expires`.
    pub fn signed_url_until(&self, bucket: &str, key: &str, expires: u64) -> StorageResult<String> {
        self.object_path(bucket, key)?;
        let signature = self.signature(bucket, key, expires)?;
        Ok(format!(
            "{}/{}/{}?expires={}&signature={}",
            self.base_url.trim_end_matches('/'),
            bucket,
            key,
            expires,
            signature
        ))
    }

    /// Check a presigned URL's signature and expiry against the current time.
    pub fn verify_presigned(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
        signature: &str,
    ) -> StorageResult<()> {
        self.verify_presigned_at(bucket, key, expires, signature, unix_now())
    }

    pub fn verify_presigned_at(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
        signature: &str,
        now: u64,
    ) -> StorageResult<()> {
        let provided = hex::decode(signature).map_err(|_| StorageError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(format!("GET\n{}/{}\n{}", bucket, key, expires).as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| StorageError::InvalidSignature)?;

        if now > expires {
            return Err(StorageError::Expired);
        }
        Ok(())
    }

    /// Open a stored object for reading. The caller is expected to have verified
    /// the request's signature first.
    pub async fn open(&self, bucket: &str, key: &str) -> StorageResult<(fs::File, u64)> {
        let path = self.object_path(bucket, key)?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(format!("{}/{}", bucket, key)));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<VideoReference> {
        let path = self.object_path(&self.bucket, key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let written = tokio::io::copy(&mut reader, &mut file).await;
        let size = match written {
            Ok(size) => size,
            Err(e) => {
                drop(file);
                if let Err(rm_err) = fs::remove_file(&path).await {
                    tracing::warn!(error = %rm_err, path = %path.display(), "Failed to remove partial object");
                }
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(VideoReference::new(self.bucket.clone(), key))
    }

    async fn get_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let expires = unix_now().saturating_add(expires_in.as_secs());
        self.signed_url_until(bucket, key, expires)
    }
}
