//! Scrape endpoint
//!
//! Serves the registry's current, non-expired snapshot in Prometheus text
//! format. The snapshot is copied out under the registry's read lock;
//! rendering happens afterwards.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::Utc;

use crate::data::registry::SampleRegistry;
use crate::domain::exposition::render_exposition;
use crate::domain::ingest::IngestStats;

/// Content type for text exposition format 0.0.4
const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct ExpositionState {
    pub registry: Arc<SampleRegistry>,
    pub stats: Arc<IngestStats>,
}

pub async fn scrape(State(state): State<ExpositionState>) -> impl IntoResponse {
    let samples = state.registry.snapshot(Utc::now());
    let body = render_exposition(&samples, &state.stats);
    ([(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)], body)
}

pub fn routes(registry: Arc<SampleRegistry>, stats: Arc<IngestStats>) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(ExpositionState { registry, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::registry::{Descriptor, SampleValue, StoredSample, ValueKind, identity};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeDelta;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_scrape_serves_snapshot_as_text_exposition() {
        let registry = Arc::new(SampleRegistry::new());
        let stats = Arc::new(IngestStats::new());
        let labels = BTreeMap::from([("role".to_string(), "barista".to_string())]);
        registry.upsert(vec![StoredSample {
            identity: identity("counter1", &labels),
            descriptor: Descriptor {
                name: "counter1".to_string(),
                labels,
                help: "a counter that counts stuff".to_string(),
            },
            value: SampleValue::Scalar {
                value: 10000.0,
                kind: ValueKind::Counter,
            },
            expires_at: Utc::now() + TimeDelta::seconds(90),
        }]);
        stats.record_success(1);

        let response = routes(registry, stats)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4; charset=utf-8"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("promgate_ingest_success 1\n"));
        assert!(page.contains("# TYPE counter1 counter\n"));
        assert!(page.contains("counter1{role=\"barista\"} 10000\n"));
    }
}
