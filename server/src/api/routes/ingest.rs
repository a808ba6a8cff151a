//! Inbound sample ingestion endpoint
//!
//! The route stamps the receive time and hands the raw payload to the
//! samples topic. Decoding (and success/failure accounting) happens in the
//! ingest pipeline, so a malformed payload is still accepted here with 202.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use chrono::Utc;

use crate::core::Publisher;
use crate::core::constants::BACKPRESSURE_RETRY_AFTER_SECS;
use crate::domain::ingest::InboundMessage;

#[derive(Clone)]
pub struct IngestState {
    pub publisher: Publisher<InboundMessage>,
}

pub async fn ingest(State(state): State<IngestState>, body: Bytes) -> Response {
    let msg = InboundMessage {
        payload: body,
        received_at: Utc::now(),
    };

    if let Err(e) = state.publisher.publish(msg) {
        tracing::warn!(error = %e, "Failed to publish inbound payload");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(
                HeaderName::from_static("retry-after"),
                BACKPRESSURE_RETRY_AFTER_SECS.to_string(),
            )],
        )
            .into_response();
    }

    StatusCode::ACCEPTED.into_response()
}

pub fn routes(publisher: Publisher<InboundMessage>) -> Router {
    Router::new()
        .route("/api/v1/ingest", post(ingest))
        .with_state(IngestState { publisher })
}
