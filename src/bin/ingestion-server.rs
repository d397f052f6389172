use anyhow::Result;
use envy::from_env;
use std::sync::Arc;
use trip_data_bridge::app::Ingestor;
use trip_data_bridge::client::S3Store;
use trip_data_bridge::conf::IngestionSettings;
use trip_data_bridge::server;
use trip_data_bridge::source::HttpSource;

/// Serve push deliveries of trigger messages, downloading the month
/// each one names and storing it in the bucket.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    let settings: IngestionSettings = from_env()?;
    let port = settings.port;
    let ingestor = Ingestor::new(
        settings,
        Arc::new(HttpSource::default()),
        Arc::new(S3Store::from_env().await),
    );

    server::serve(server::ingestion_router(Arc::new(ingestor)), port).await
}
