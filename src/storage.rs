use crate::{domain::ObjectStore, errors::StorageError, models::PutReceipt};
use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, error::SdkError, primitives::ByteStream};
use tracing;

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket_name: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    /// Writes the object using PutObject. Sets Content-Type when given one.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<PutReceipt, StorageError> {
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, ?content_type, "S3: Writing object");

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data));
        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let output = request.send().await.map_err(|sdk_err| {
            tracing::error!(s3_key = %key, bucket = %self.bucket_name, error = %sdk_err, "S3: Error writing object");
            StorageError::PutFailed {
                key: key.to_string(),
                reason: sdk_err.to_string(),
            }
        })?;

        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Write successful");
        Ok(PutReceipt {
            key: key.to_string(),
            etag: output.e_tag().map(|s| s.to_string()),
        })
    }

    /// Reads the full object content using GetObject.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Reading object");

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|sdk_err| {
                // Check specifically for NoSuchKey
                if let SdkError::ServiceError(service_err) = &sdk_err {
                    if service_err.err().meta().code() == Some("NoSuchKey") {
                        tracing::warn!(s3_key = %key, bucket = %self.bucket_name, "S3: NoSuchKey reading object");
                        return StorageError::NotFound(key.to_string());
                    }
                }
                tracing::error!(s3_key = %key, bucket = %self.bucket_name, error = %sdk_err, "S3: Error reading object");
                StorageError::BackendError(
                    anyhow::Error::new(sdk_err)
                        .context(format!("S3: Failed to read object with key '{}'", key)),
                )
            })?;

        let data = output.body.collect().await.map_err(|e| {
            StorageError::BackendError(
                anyhow::Error::new(e)
                    .context(format!("S3: Failed to collect body of object '{}'", key)),
            )
        })?;

        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Read successful");
        Ok(data.into_bytes().to_vec())
    }
}
