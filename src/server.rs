//! HTTP surfaces for the ingestor and the scheduler.

use crate::app::{IngestError, Ingestor, Scheduler, SchedulerError};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::Router;
use chrono::Local;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

impl IngestError {
    fn status_code(&self) -> StatusCode {
        match self {
            IngestError::MalformedEnvelope | IngestError::InvalidDateParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            IngestError::FetchFailed { .. } | IngestError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        if let IngestError::Internal(e) = &self {
            warn!("Ingestion failed: {:?}", e);
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        warn!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

async fn ingest(State(ingestor): State<Arc<Ingestor>>, body: Bytes) -> Result<String, IngestError> {
    ingestor.handle(&body).await
}

async fn trigger(State(scheduler): State<Arc<Scheduler>>) -> Result<String, SchedulerError> {
    scheduler.trigger(Local::now().date_naive()).await
}

/// Routes push deliveries at `POST /` to the ingestor.
pub fn ingestion_router(ingestor: Arc<Ingestor>) -> Router {
    Router::new()
        .route("/", post(ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(ingestor)
}

/// Routes any request at `/` to the scheduler. The body is ignored.
pub fn scheduler_router(scheduler: Arc<Scheduler>) -> Router {
    Router::new()
        .route("/", any(trigger))
        .layer(TraceLayer::new_for_http())
        .with_state(scheduler)
}

/// Serve `router` on all interfaces at `port` until CTRL-C.
pub async fn serve(router: Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("CTRL-C");
            }
        })
        .await
        .context("Server terminated unexpectedly")
}
