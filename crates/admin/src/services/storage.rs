//! S3-compatible object storage for product media.
//!
//! Media lives in two buckets, `images` and `videos`, each created on the
//! first upload that needs it. Objects are publicly readable through the
//! configured public URL; only uploads go through this service.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use secrecy::ExposeSecret;
use thiserror::Error;

use aurelia_core::ProductId;

use crate::config::StorageConfig;

/// Bucket for product images.
const IMAGE_BUCKET: &str = "images";
/// Bucket for product videos.
const VIDEO_BUCKET: &str = "videos";

/// Upload size cap for images (10 MB).
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Upload size cap for videos (100 MB).
const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Errors from object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket {bucket}: {message}")]
    Bucket { bucket: String, message: String },

    #[error("upload to {bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}

/// The two kinds of product media, with their bucket and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    const fn bucket(self) -> &'static str {
        match self {
            Self::Image => IMAGE_BUCKET,
            Self::Video => VIDEO_BUCKET,
        }
    }

    const fn max_bytes(self) -> usize {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Video => MAX_VIDEO_BYTES,
        }
    }

    const fn content_type_prefix(self) -> &'static str {
        match self {
            Self::Image => "image/",
            Self::Video => "video/",
        }
    }
}

/// Check an upload against the size and content-type rules for its kind.
///
/// # Errors
///
/// Returns a client-facing message when the upload is oversized or the
/// content type does not match the bucket.
pub fn validate_upload(kind: MediaKind, size: usize, content_type: &str) -> Result<(), String> {
    if !content_type.starts_with(kind.content_type_prefix()) {
        return Err(format!(
            "expected a {}* upload, got {content_type}",
            kind.content_type_prefix()
        ));
    }
    if size > kind.max_bytes() {
        return Err(format!(
            "upload of {size} bytes exceeds the {} byte limit",
            kind.max_bytes()
        ));
    }
    Ok(())
}

/// An uploaded object: where it lives and where it is served from.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// `bucket/key`, recorded in the database for later housekeeping.
    pub storage_key: String,
    /// Public URL the object is served from.
    pub url: String,
}

/// Client for the S3-compatible media store.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    public_url: String,
}

impl StorageService {
    /// Build the storage client from configuration.
    pub async fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.expose_secret().to_string(),
            None,
            None,
            "aurelia-admin",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        // MinIO and friends need path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a validated media object for a product.
    ///
    /// Creates the bucket on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bucket cannot be ensured or the upload
    /// fails.
    pub async fn upload(
        &self,
        kind: MediaKind,
        product_id: ProductId,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let bucket = kind.bucket();
        self.ensure_bucket(bucket).await?;

        let key = object_key(product_id, filename);
        self.client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.clone(),
                message: e.to_string(),
            })?;

        Ok(StoredObject {
            storage_key: format!("{bucket}/{key}"),
            url: format!("{}/{bucket}/{key}", self.public_url),
        })
    }

    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => {
                tracing::info!(bucket, "Creating storage bucket");
                self.client
                    .create_bucket()
                    .bucket(bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::Bucket {
                        bucket: bucket.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(())
            }
            Err(e) => Err(StorageError::Bucket {
                bucket: bucket.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Storage key for an upload: scoped by product, timestamped, with the
/// original filename reduced to a safe suffix.
fn object_key(product_id: ProductId, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}/{}-{}",
        product_id.as_i32(),
        Utc::now().timestamp_millis(),
        safe
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_accepts_small_image() {
        assert!(validate_upload(MediaKind::Image, 1024, "image/jpeg").is_ok());
    }

    #[test]
    fn test_validate_upload_rejects_oversized_image() {
        assert!(validate_upload(MediaKind::Image, MAX_IMAGE_BYTES + 1, "image/png").is_err());
    }

    #[test]
    fn test_validate_upload_rejects_wrong_content_type() {
        assert!(validate_upload(MediaKind::Image, 1024, "video/mp4").is_err());
        assert!(validate_upload(MediaKind::Video, 1024, "image/png").is_err());
        assert!(validate_upload(MediaKind::Video, 1024, "application/pdf").is_err());
    }

    #[test]
    fn test_video_limit_is_larger() {
        assert!(validate_upload(MediaKind::Video, MAX_IMAGE_BYTES + 1, "video/mp4").is_ok());
        assert!(validate_upload(MediaKind::Video, MAX_VIDEO_BYTES + 1, "video/mp4").is_err());
    }

    #[test]
    fn test_object_key_sanitizes_filename() {
        let key = object_key(ProductId::new(7), "my ring photo (1).jpg");
        assert!(key.starts_with("7/"));
        assert!(key.ends_with("my_ring_photo__1_.jpg"));
        assert!(!key.contains(' '));
    }
}
