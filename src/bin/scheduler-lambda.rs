use anyhow::{anyhow, Result};
use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use chrono::Local;
use envy::from_env;
use lambda_runtime::{run, service_fn, LambdaEvent};
use std::sync::Arc;
use tracing::info;
use trip_data_bridge::app::Scheduler;
use trip_data_bridge::conf::SchedulerSettings;
use trip_data_bridge::publish::PubSubPublisher;

/// Publish the trigger message for the current month.
async fn function_handler(
    scheduler: Arc<Scheduler>,
    event: LambdaEvent<CloudWatchEvent>,
) -> Result<String> {
    info!(
        "Scheduled event {:?} fired at {:?}",
        event.payload.id, event.payload.time
    );
    Ok(scheduler.trigger(Local::now().date_naive()).await?)
}

/// Run an AWS Lambda function that listens to scheduled events and
/// publishes a trigger message for the current month on each one.
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
    let scheduler = Arc::new(Scheduler::new(settings, Arc::new(publisher)));

    run(service_fn(move |event| {
        function_handler(scheduler.clone(), event)
    }))
    .await
    .map_err(|e| anyhow!("{:?}", e))
}
