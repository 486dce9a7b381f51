//! S3-compatible blob store adapter.
//!
//! Talks to any S3 API (MinIO included) via endpoint + access/secret key,
//! path-style addressing, single named bucket.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};

use super::{BlobStore, StoreError};

/// Connection settings for the object store.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Endpoint URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// Blob store backed by an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client for the configured endpoint. No network I/O happens
    /// here; call [`S3BlobStore::ensure_bucket`] before accepting uploads.
    pub fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "depot-static",
        );
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            // MinIO and friends serve buckets path-style, not as subdomains.
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(conf),
            bucket: config.bucket.clone(),
        }
    }

    /// Create the bucket if it does not exist. Idempotent: an existing
    /// bucket (owned or not) is success.
    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "created bucket");
                Ok(())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    return Ok(());
                }
                warn!(bucket = %self.bucket, error = %service_err, "bucket creation failed");
                Err(StoreError::Bucket(service_err.to_string()))
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, staging: &Path) -> Result<(), StoreError> {
        let body = ByteStream::from_path(staging)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Write(e.into_service_error().to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Read(service_err.to_string())
                }
            })?;
        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        // S3 DeleteObject succeeds for absent keys, matching the trait contract.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Remove(e.into_service_error().to_string()))?;
        Ok(())
    }
}
