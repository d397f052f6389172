use anyhow::{Context, Result};
use envy::from_env;
use serde_json::Value;
use std::env::var;
use std::sync::Arc;
use trip_data_bridge::app::Ingestor;
use trip_data_bridge::client::S3Store;
use trip_data_bridge::conf::IngestionSettings;
use trip_data_bridge::source::HttpSource;
use trip_data_bridge::trigger::{PartialTrigger, TriggerMessage};

/// Ingest a single month named by the `YEAR` and `MONTH` variables,
/// without going through the topic. Absent variables take the
/// configured defaults.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    let settings: IngestionSettings = from_env()?;
    let trigger = TriggerMessage::resolve(
        PartialTrigger {
            year: var("YEAR").ok().map(Value::String),
            month: var("MONTH").ok().map(Value::String),
        },
        &settings.default_year,
        &settings.default_month,
    )
    .map_err(|invalid| {
        anyhow::anyhow!(
            "YEAR {:?} and MONTH {:?} don't name a valid month",
            invalid.year,
            invalid.month
        )
    })?;
    let ingestor = Ingestor::new(
        settings,
        Arc::new(HttpSource::default()),
        Arc::new(S3Store::from_env().await),
    );

    let file_name = ingestor
        .ingest(&trigger)
        .await
        .with_context(|| format!("Failed to ingest {}-{}", trigger.year, trigger.month))?;
    println!("Done: {}", file_name);
    Ok(())
}
