//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use chrono::{DateTime, Utc};

use crate::config::StorageConfig;
use crate::error::{AppError, Result, StorageError};

use super::types::{ObjectMetadata, StorageObject};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration and probe the bucket
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let s3 = Self::from_config(config);

        // Test connection by checking if bucket exists
        match s3.client.head_bucket().bucket(&s3.bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", s3.bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    s3.bucket,
                    e
                );
            }
        }

        Ok(s3)
    }

    /// Build a client without touching the network
    pub fn from_config(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "pdf-annotator",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload an object
    pub async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, key, content_type, size = data.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| map_sdk_error(key, "put object", DisplayErrorContext(&e)))?;

        Ok(())
    }

    /// Get an object's data
    pub async fn get_object(&self, key: &str) -> Result<StorageObject> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(key, "get object", DisplayErrorContext(&e)))?;

        let metadata = ObjectMetadata {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0),
            last_modified: response.last_modified().and_then(|dt| {
                DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos())
            }),
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(StorageObject { metadata, data })
    }

    /// Delete an object
    ///
    /// S3 reports success for keys that do not exist.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(key, "delete object", DisplayErrorContext(&e)))?;

        Ok(())
    }
}

/// Classify an SDK failure by the codes in its full error chain
fn map_sdk_error(key: &str, action: &str, e: impl std::fmt::Display) -> AppError {
    let text = e.to_string();
    if text.contains("404") || text.contains("NoSuchKey") {
        AppError::Storage(StorageError::ObjectNotFound(key.to_string()))
    } else if text.contains("403") || text.contains("AccessDenied") {
        AppError::Storage(StorageError::AccessDenied(key.to_string()))
    } else {
        AppError::Storage(StorageError::SdkError(format!(
            "Failed to {} {}: {}",
            action, key, text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_sdk_error_not_found() {
        let err = map_sdk_error("a.pdf", "get object", "service error: NoSuchKey");
        assert!(matches!(
            err,
            AppError::Storage(StorageError::ObjectNotFound(ref k)) if k == "a.pdf"
        ));
    }

    #[test]
    fn test_map_sdk_error_other() {
        let err = map_sdk_error("a.pdf", "put object", "dispatch failure");
        assert!(matches!(err, AppError::Storage(StorageError::SdkError(_))));
    }
}
