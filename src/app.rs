//! Defines the two components, the ingestor and the scheduler, each
//! holding the settings and the client handles it was built with.

use crate::client::ObjectStore;
use crate::conf::{IngestionSettings, SchedulerSettings};
use crate::envelope::PushEnvelope;
use crate::publish::Publisher;
use crate::source::Source;
use crate::trigger::{InvalidDate, TriggerMessage};
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// The ways an ingestion can fail.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid Pub/Sub format")]
    MalformedEnvelope,

    #[error("Invalid date parameter: year {year:?}, month {month:?}")]
    InvalidDateParameter { year: String, month: String },

    #[error("Failed to fetch: {url} (Status: {status})")]
    FetchFailed { url: String, status: u16 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<InvalidDate> for IngestError {
    fn from(invalid: InvalidDate) -> Self {
        IngestError::InvalidDateParameter {
            year: invalid.year,
            month: invalid.month,
        }
    }
}

/// Downloads monthly files and stores them unmodified.
pub struct Ingestor {
    pub settings: IngestionSettings,
    source: Arc<dyn Source>,
    store: Arc<dyn ObjectStore>,
}

impl Ingestor {
    pub fn new(
        settings: IngestionSettings,
        source: Arc<dyn Source>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Ingestor {
            settings,
            source,
            store,
        }
    }

    /// Handle a push delivery: unwrap the envelope, resolve the month
    /// it names and ingest it. Returns the confirmation text.
    #[instrument(skip(self, body))]
    pub async fn handle(&self, body: &[u8]) -> Result<String, IngestError> {
        let (message, subscription) = PushEnvelope::parse(body).map_err(|_| {
            warn!("Invalid Pub/Sub format: 'message' key missing");
            IngestError::MalformedEnvelope
        })?;
        info!(
            message_id = ?message.message_id,
            publish_time = ?message.publish_time,
            subscription = ?subscription,
            attributes = ?message.attributes,
            "Received message"
        );
        let partial = message.decode_payload()?;
        let trigger = TriggerMessage::resolve(
            partial,
            &self.settings.default_year,
            &self.settings.default_month,
        )
        .map_err(|invalid| {
            warn!(year = %invalid.year, month = %invalid.month, "Rejecting invalid date parameter");
            IngestError::from(invalid)
        })?;
        let file_name = self.ingest(&trigger).await?;
        Ok(format!("Done: {}", file_name))
    }

    /// Download the file for the given month and store it. Returns
    /// the file name.
    #[instrument(skip(self))]
    pub async fn ingest(&self, trigger: &TriggerMessage) -> Result<String, IngestError> {
        let file = trigger.remote_file();
        let url = file.url(&self.settings.source_base_url);
        info!("Attempting to download from: {}", url);
        let fetched = self.source.fetch(&url).await?;
        if fetched.status != 200 {
            warn!(
                "Failed to fetch data from: {}. Status code: {}",
                url, fetched.status
            );
            return Err(IngestError::FetchFailed {
                url,
                status: fetched.status,
            });
        }
        let key = file.object_key(&self.settings.key_prefix);
        self.store
            .put(&self.settings.bucket, &key, fetched.body)
            .await
            .with_context(|| format!("Failed to store {:?}", file.file_name))?;
        info!("Successfully uploaded to bucket {:?}: {}", self.settings.bucket, key);
        Ok(file.file_name)
    }
}

/// Failures of the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Failed to publish trigger message: {0:#}")]
    Publish(#[from] anyhow::Error),
}

/// Publishes a trigger message naming the current month.
pub struct Scheduler {
    pub settings: SchedulerSettings,
    publisher: Arc<dyn Publisher>,
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings, publisher: Arc<dyn Publisher>) -> Self {
        Scheduler {
            settings,
            publisher,
        }
    }

    /// Publish the message for the month containing `today`. Returns
    /// the confirmation text.
    #[instrument(skip(self))]
    pub async fn trigger(&self, today: NaiveDate) -> Result<String, SchedulerError> {
        let message = TriggerMessage::for_date(today);
        let data = serde_json::to_vec(&message).context("Failed to serialize trigger message")?;
        let message_id = self.publisher.publish(data).await?;
        info!(
            message_id = %message_id,
            project_id = %self.settings.project_id,
            topic_id = %self.settings.topic_id,
            "Published message for {}-{}",
            message.year,
            message.month
        );
        Ok(format!(
            "Published message for {}-{}",
            message.year, message.month
        ))
    }
}
