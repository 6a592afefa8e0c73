//! S3/MinIO-compatible photo storage
//!
//! Uploads go through rust-s3. A missing bucket is created on demand with a
//! public-read policy and the upload is retried once.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use tracing::{debug, info, warn};

use super::sigv4::{self, SigningKey};
use super::PhotoStorage;
use crate::core::config::ObjectStorageConfig;
use crate::core::error::AppError;

/// Why a single upload attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
enum PutFailure {
    /// The target bucket does not exist yet
    MissingBucket(String),
    Other(String),
}

impl PutFailure {
    fn classify(reason: String) -> Self {
        if is_missing_bucket(&reason) {
            PutFailure::MissingBucket(reason)
        } else {
            PutFailure::Other(reason)
        }
    }

    /// Classify a non-2xx object PUT response. rust-s3 replaces the body of
    /// PUT responses with the ETag, so a 404 is the only reliable signal of a
    /// missing bucket.
    fn from_status(status: u16, body: &str) -> Self {
        let reason = format!("status {}: {}", status, body);
        if status == 404 {
            PutFailure::MissingBucket(reason)
        } else {
            PutFailure::classify(reason)
        }
    }

    fn reason(&self) -> &str {
        match self {
            PutFailure::MissingBucket(reason) | PutFailure::Other(reason) => reason,
        }
    }
}

/// Whether an S3 error message reports a bucket that does not exist
fn is_missing_bucket(message: &str) -> bool {
    message.contains("NoSuchBucket")
        || message.contains("Bucket not found")
        || message.contains("The specified bucket does not exist")
}

/// Whether an S3 error message reports a bucket that already exists
fn is_existing_bucket(message: &str) -> bool {
    message.contains("BucketAlreadyOwnedByYou")
        || message.contains("BucketAlreadyExists")
        || message.contains("already own it")
}

/// Photo storage backed by an S3-compatible bucket
pub struct ObjectPhotoStorage {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    key_prefix: String,
    access_key: String,
    secret_key: String,
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl ObjectPhotoStorage {
    pub fn new(config: ObjectStorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to configure S3 bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) work with MinIO and AWS alike
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Object photo storage configured: endpoint={}, bucket={}, prefix={}",
            config.endpoint, config.bucket, config.key_prefix
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            key_prefix: config.key_prefix,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    fn object_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.key_prefix, key)
        }
    }

    async fn try_put(&self, object_key: &str, data: &[u8], content_type: &str) -> Result<(), PutFailure> {
        match self
            .bucket
            .put_object_with_content_type(object_key, data, content_type)
            .await
        {
            Ok(response) if (200..300).contains(&response.status_code()) => Ok(()),
            Ok(response) => Err(PutFailure::from_status(
                response.status_code(),
                &String::from_utf8_lossy(response.bytes()),
            )),
            Err(e) => Err(PutFailure::classify(e.to_string())),
        }
    }

    /// Create the bucket and open it for anonymous reads
    async fn create_public_bucket(&self) -> Result<(), AppError> {
        let bucket_name = self.bucket.name();

        match Bucket::create_with_path_style(
            &bucket_name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created", bucket_name);
            }
            Ok(response) if is_existing_bucket(&response.response_text) => {
                debug!("Bucket '{}' already exists", bucket_name);
            }
            Ok(response) => {
                return Err(AppError::Upload(format!(
                    "Failed to create bucket '{}': status {}: {}",
                    bucket_name, response.response_code, response.response_text
                )));
            }
            Err(e) if is_existing_bucket(&e.to_string()) => {
                debug!("Bucket '{}' already exists", bucket_name);
            }
            Err(e) => {
                return Err(AppError::Upload(format!(
                    "Failed to create bucket '{}': {}",
                    bucket_name, e
                )));
            }
        }

        if let Err(e) = self.set_public_read_policy(&bucket_name).await {
            // Uploads still work; photos just need the policy applied by hand
            warn!(
                "Failed to set public read policy for bucket '{}': {}",
                bucket_name, e
            );
        }

        Ok(())
    }

    /// Allow anonymous `GetObject` on the photo prefix
    async fn set_public_read_policy(&self, bucket_name: &str) -> Result<(), AppError> {
        let resource = if self.key_prefix.is_empty() {
            format!("arn:aws:s3:::{}/*", bucket_name)
        } else {
            format!("arn:aws:s3:::{}/{}/*", bucket_name, self.key_prefix)
        };

        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [resource]
                }
            ]
        })
        .to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let signing_key = SigningKey {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region_name,
        };
        let signed = sigv4::sign_request(
            &signing_key,
            "PUT",
            &host_header,
            &format!("/{}", bucket_name),
            "policy=",
            policy.as_bytes(),
            Utc::now(),
        )?;

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .header("Content-Type", "application/json")
            .body(policy)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            info!("Set public read policy on bucket '{}'", bucket_name);
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::Internal(format!(
                "Bucket policy rejected: {} - {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl PhotoStorage for ObjectPhotoStorage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let object_key = self.object_key(key);

        match self.try_put(&object_key, &data, content_type).await {
            Ok(()) => {}
            Err(PutFailure::MissingBucket(reason)) => {
                warn!(
                    "Bucket '{}' missing ({}); creating it and retrying upload",
                    self.bucket.name(),
                    reason
                );
                self.create_public_bucket().await?;
                self.try_put(&object_key, &data, content_type)
                    .await
                    .map_err(|failure| {
                        AppError::Upload(format!(
                            "Failed to upload '{}' after creating bucket: {}",
                            object_key,
                            failure.reason()
                        ))
                    })?;
            }
            Err(PutFailure::Other(reason)) => {
                return Err(AppError::Upload(format!(
                    "Failed to upload '{}': {}",
                    object_key, reason
                )));
            }
        }

        debug!(
            "Uploaded photo '{}' to bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(object_key)
    }

    fn public_url(&self, reference: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket.name(),
            reference
        )
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
