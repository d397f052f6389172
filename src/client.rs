//! Defines the object store that receives the downloaded files, and
//! its S3-API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::env;

/// A bucket-addressed blob store. Writes always overwrite.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes the whole of `body` to `key` in `bucket`.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;
}

/// An object store backed by any S3-compatible API.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        S3Store { client }
    }

    /// Build a store from the ambient AWS configuration. A non-empty
    /// `AWS_ENDPOINT_URL` redirects the client to a different
    /// S3-compatible service.
    pub async fn from_env() -> Self {
        let mut loader = aws_config::from_env();
        if let Some(endpoint) = env::var("AWS_ENDPOINT_URL")
            .ok()
            .and_then(|raw| endpoint_url(&raw))
        {
            // Custom endpoints ignore the region, but the SDK requires one.
            loader = loader
                .endpoint_url(endpoint)
                .region(Region::new("us-east-1"));
        }
        S3Store::new(Client::new(&loader.load().await))
    }
}

/// Turns an endpoint given as a bare host or a full URL into a URL,
/// defaulting to https. Blank input means no endpoint.
fn endpoint_url(raw: &str) -> Option<String> {
    let endpoint = raw.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        None
    } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Some(endpoint.to_string())
    } else {
        Some(format!("https://{}", endpoint))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to upload {} bytes to remote object {:?} in bucket {:?}",
                    size, key, bucket
                )
            })?;
        Ok(())
    }
}
