//! Defines the remote host the monthly files are downloaded from.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;

/// The outcome of a download that reached the remote host.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub body: Bytes,
}

/// Something files can be downloaded from.
#[async_trait]
pub trait Source: Send + Sync {
    /// Issues a single GET for `url`. Transport failures are errors;
    /// any HTTP status, successful or not, is returned as-is.
    async fn fetch(&self, url: &str) -> Result<Fetched>;
}

/// A source reached over HTTP.
#[derive(Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        HttpSource { client }
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request {:?}", url))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read the response body from {:?}", url))?;
        Ok(Fetched { status, body })
    }
}
