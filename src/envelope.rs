//! Defines the push envelope wrapping each delivered message, and
//! the decoding of its payload into a trigger.

use crate::trigger::PartialTrigger;
use anyhow::{anyhow, Context, Result};
use base64ct::{Base64, Encoding};
use serde::Deserialize;
use serde_json::Value;

/// The body of a push delivery.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    /// The delivered message. Its absence makes the envelope
    /// malformed.
    #[serde(default)]
    pub message: Option<PushMessage>,

    /// The subscription that pushed the message.
    #[serde(default)]
    pub subscription: Option<Value>,
}

/// A delivered message. Only `data` is needed; the rest is delivery
/// metadata kept for logging, accepted whatever its shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// The base64-encoded payload.
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub message_id: Option<Value>,

    #[serde(default)]
    pub publish_time: Option<Value>,

    #[serde(default)]
    pub attributes: Option<Value>,
}

/// The request body isn't a push envelope.
#[derive(Debug)]
pub struct MalformedEnvelope;

impl PushEnvelope {
    /// Parses a request body, requiring a top-level `message` object.
    pub fn parse(body: &[u8]) -> Result<(PushMessage, Option<Value>), MalformedEnvelope> {
        let envelope: PushEnvelope = serde_json::from_slice(body).map_err(|_| MalformedEnvelope)?;
        envelope
            .message
            .map(|message| (message, envelope.subscription))
            .ok_or(MalformedEnvelope)
    }
}

impl PushMessage {
    /// Decodes the payload from base64, then parses it as a trigger.
    pub fn decode_payload(&self) -> Result<PartialTrigger> {
        let data = self
            .data
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("message carries no data"))?;
        let bytes = Base64::decode_vec(data)
            .map_err(|e| anyhow!("message data is not valid base64: {}", e))?;
        let text = String::from_utf8(bytes).context("message data is not valid UTF-8")?;
        serde_json::from_str(&text)
            .with_context(|| format!("message data is not a trigger message: {:?}", text))
    }
}
