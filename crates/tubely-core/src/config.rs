//! Configuration module
//!
//! Environment-driven configuration for the upload service: server, authentication,
//! storage backend and media tool settings. A `.env` file is honoured when present.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_PRESIGNED_URL_TTL_SECS;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8091;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const DEFAULT_LOCAL_BUCKET: &str = "tubely-local";
const MIN_SECRET_LEN: usize = 32;

fn megabytes_to_bytes(mb: usize) -> anyhow::Result<usize> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB={} overflows a byte count", mb))
}

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    pub url_signing_secret: String,
    pub presigned_url_ttl_secs: u64,
    // Media processing configuration
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub staging_dir: Option<PathBuf>,
    pub max_video_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_upload().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_upload().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_upload().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_upload().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_upload().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_upload().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_upload().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_upload().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_upload().local_storage_base_url.as_deref()
    }

    pub fn local_storage_bucket(&self) -> &str {
        &self.as_upload().local_storage_bucket
    }

    pub fn url_signing_secret(&self) -> &str {
        &self.as_upload().url_signing_secret
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.as_upload().presigned_url_ttl_secs)
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_upload().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_upload().ffprobe_path
    }

    /// Scratch directory for staged uploads, falling back to the OS temp dir.
    pub fn staging_dir(&self) -> PathBuf {
        self.as_upload()
            .staging_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_upload().max_video_size_bytes
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);
        let max_video_size_bytes = megabytes_to_bytes(max_video_size_mb)?;

        let url_signing_secret =
            env::var("URL_SIGNING_SECRET").unwrap_or_else(|_| base.jwt_secret.clone());

        let config = UploadServiceConfig {
            base,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            local_storage_bucket: env::var("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|_| DEFAULT_LOCAL_BUCKET.to_string()),
            url_signing_secret,
            presigned_url_ttl_secs: env::var("PRESIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PRESIGNED_URL_TTL_SECS),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            staging_dir: env::var("STAGING_DIR").ok().map(PathBuf::from),
            max_video_size_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.url_signing_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "URL_SIGNING_SECRET must be at least 32 characters long"
            ));
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }

        if self.local_storage_bucket.contains(',') {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_BUCKET must not contain ','"
            ));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                match self.s3_bucket.as_deref() {
                    None => {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when using S3 storage backend"
                        ));
                    }
                    Some(bucket) if bucket.contains(',') => {
                        return Err(anyhow::anyhow!("S3_BUCKET must not contain ','"));
                    }
                    Some(_) => {}
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
