#![doc = "AWS implementations of the core storage and CDN collaborators."]
//
//! # AWS integration (CLI <-> Core)
//!
//! Bridges the [`StorageClient`] and [`CdnClient`] traits from
//! `s3-deploy-core` to the AWS SDK:
//! - [`S3Storage`]: one `PutObject` per file.
//! - [`CloudFrontCdn`]: one `CreateInvalidation` per run.
//!
//! Credentials are resolved by the SDK's default provider chain (env, profile,
//! instance metadata). Region, profile and a custom S3 endpoint can be set in
//! the `client` section of the config file.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::ObjectCannedAcl;
use s3_deploy_core::contract::{CdnClient, InvalidationRequest, StorageClient, UploadRequest};
use s3_deploy_core::error::BoxError;
use uuid::Uuid;

use crate::load_config::ClientSection;

/// Key bytes left as-is in object URLs; `/` keeps its role as segment separator.
const KEY_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Loads the shared SDK config, applying any region/profile overrides.
pub async fn load_sdk_config(client: &ClientSection) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = &client.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(profile) = &client.profile {
        loader = loader.profile_name(profile);
    }
    let sdk_config = loader.load().await;
    tracing::info!(
        region = ?sdk_config.region(),
        profile = ?client.profile,
        endpoint_url = ?client.endpoint_url,
        "Loaded AWS SDK configuration"
    );
    sdk_config
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Storage {
    pub fn new(sdk_config: &aws_config::SdkConfig, client: &ClientSection) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &client.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            region,
            endpoint_url: client.endpoint_url.clone(),
        }
    }

    /// Public URL of an uploaded object.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        object_url(self.endpoint_url.as_deref(), &self.region, bucket, key)
    }
}

/// Virtual-hosted URL on AWS, path-style URL on a custom endpoint. Each key
/// segment is percent-encoded.
pub fn object_url(endpoint_url: Option<&str>, region: &str, bucket: &str, key: &str) -> String {
    let key = utf8_percent_encode(key, KEY_PATH_SET);
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

/// `Expires` timestamp `seconds_from_now` after `now` (Unix seconds).
pub fn expires_at(now: u64, seconds_from_now: u64) -> Result<DateTime, BoxError> {
    let at = now
        .checked_add(seconds_from_now)
        .and_then(|secs| i64::try_from(secs).ok())
        .ok_or_else(|| format!("expires of {seconds_from_now} seconds is out of range"))?;
    Ok(DateTime::from_secs(at))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn upload(&self, request: UploadRequest) -> Result<String, BoxError> {
        tracing::debug!(
            bucket = %request.bucket,
            key = %request.key,
            content_type = %request.content_type,
            "Putting object"
        );
        let location = self.object_url(&request.bucket, &request.key);
        let expires = expires_at(unix_now(), request.expires).map_err(|e| {
            tracing::error!(error = %e, key = %request.key, "Invalid Expires value");
            e
        })?;

        let result = self
            .client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .acl(ObjectCannedAcl::from(request.acl.as_str()))
            .cache_control(&request.cache_control)
            .set_content_encoding(request.content_encoding.clone())
            .content_type(&request.content_type)
            .expires(expires)
            .body(ByteStream::from(request.body))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(key = %request.key, location = %location, "Put object succeeded");
                Ok(location)
            }
            Err(e) => {
                tracing::error!(error = ?e, key = %request.key, "S3 PutObject failed");
                Err(Box::new(e))
            }
        }
    }
}

pub struct CloudFrontCdn {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontCdn {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudfront::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl CdnClient for CloudFrontCdn {
    async fn create_invalidation(&self, request: InvalidationRequest) -> Result<String, BoxError> {
        let quantity = i32::try_from(request.paths.len())?;
        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(request.paths))
            .build()?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(Uuid::new_v4().to_string())
            .build()?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(&request.distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, distribution_id = %request.distribution_id, "CloudFront CreateInvalidation failed");
                e
            })?;

        let id = output
            .invalidation()
            .map(|inv| inv.id().to_string())
            .ok_or("CreateInvalidation returned no invalidation")?;
        tracing::info!(invalidation_id = %id, distribution_id = %request.distribution_id, "Created CloudFront invalidation");
        Ok(id)
    }
}
