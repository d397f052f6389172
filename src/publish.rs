//! Defines the topic publisher used by the scheduler, and its client
//! for the Pub/Sub REST API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Publishes raw messages to a fixed topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes a single message, returning the id assigned to it.
    async fn publish(&self, data: Vec<u8>) -> Result<String>;
}

/// The fully-qualified name of a topic.
pub fn topic_path(project_id: &str, topic_id: &str) -> String {
    format!("projects/{}/topics/{}", project_id, topic_id)
}

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<OutgoingMessage>,
}

#[derive(Serialize)]
struct OutgoingMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// A publisher speaking the Pub/Sub REST protocol.
#[derive(Clone)]
pub struct PubSubPublisher {
    client: reqwest::Client,
    endpoint: String,
    topic: String,
    access_token: Option<String>,
}

impl PubSubPublisher {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        project_id: &str,
        topic_id: &str,
        access_token: Option<String>,
    ) -> Self {
        PubSubPublisher {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            topic: topic_path(project_id, topic_id),
            access_token,
        }
    }

    /// The URL publish requests are sent to.
    pub fn publish_url(&self) -> String {
        format!("{}/v1/{}:publish", self.endpoint, self.topic)
    }
}

#[async_trait]
impl Publisher for PubSubPublisher {
    #[instrument(skip(self, data), fields(topic = %self.topic))]
    async fn publish(&self, data: Vec<u8>) -> Result<String> {
        let request = PublishRequest {
            messages: vec![OutgoingMessage {
                data: Base64::encode_string(&data),
            }],
        };
        let mut operation = self.client.post(self.publish_url()).json(&request);
        if let Some(token) = &self.access_token {
            operation = operation.bearer_auth(token);
        }
        let response = operation
            .send()
            .await
            .with_context(|| format!("Failed to publish to topic {:?}", self.topic))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Publishing to topic {:?} was rejected with status {}: {}",
                self.topic,
                status,
                detail
            ));
        }
        let body: PublishResponse = response.json().await.with_context(|| {
            format!(
                "Failed to read the publish response for topic {:?}",
                self.topic
            )
        })?;
        body.message_ids
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Topic {:?} returned no message id", self.topic))
    }
}
