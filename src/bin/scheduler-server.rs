use anyhow::Result;
use envy::from_env;
use std::sync::Arc;
use trip_data_bridge::app::Scheduler;
use trip_data_bridge::conf::SchedulerSettings;
use trip_data_bridge::publish::PubSubPublisher;
use trip_data_bridge::server;

/// Serve scheduler invocations, publishing a trigger message for the
/// current month on each request.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    let settings: SchedulerSettings = from_env()?;
    let publisher = PubSubPublisher::new(
        reqwest::Client::new(),
        &settings.pubsub_endpoint,
        &settings.project_id,
        &settings.topic_id,
        settings.pubsub_access_token.clone(),
    );
    let port = settings.port;
    let scheduler = Scheduler::new(settings, Arc::new(publisher));

    server::serve(server::scheduler_router(Arc::new(scheduler)), port).await
}
