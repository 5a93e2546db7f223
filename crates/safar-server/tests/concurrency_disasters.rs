//! Concurrency tests for the hazard cache behind `/disasters`: concurrent
//! cold-cache requests must coalesce into a single upstream fan-out.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use safar_hazards::{EventAggregator, HazardSource, SourceError};
use safar_server::{app, AppState};
use safar_travel::{maps::MapsClient, weather::WeatherClient};
use safar_types::HazardEvent;

/// A slow feed that counts fetches. The delay gives every concurrent
/// request time to pile up behind the recompute lock.
struct SlowCountingSource {
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl HazardSource for SlowCountingSource {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![HazardEvent {
            id: "slow-1".to_string(),
            source: "slow".to_string(),
            name: "slow event".to_string(),
            kind: "T".to_string(),
            lat: 35.0,
            lon: 74.0,
            severity: None,
            magnitude: None,
            start: None,
            url: None,
            raw: Map::new(),
        }])
    }
}

#[tokio::test]
async fn concurrent_cold_requests_trigger_one_fan_out() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let state = AppState {
        aggregator: Arc::new(EventAggregator::new(
            vec![Arc::new(SlowCountingSource {
                fetches: Arc::clone(&fetches),
            }) as Arc<dyn HazardSource>],
            None,
            Duration::from_secs(60),
        )),
        predictor: Arc::new(safar_hazards::WeatherRiskPredictor::new(
            "http://127.0.0.1:9/weather",
            "test-key",
        )),
        weather: Arc::new(WeatherClient::new("http://127.0.0.1:9", "test-key")),
        maps: Arc::new(MapsClient::new("http://127.0.0.1:9", "test-key")),
    };
    let app = app(state);

    let mut handles = Vec::new();
    for _ in 0..12 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(
                Request::builder()
                    .uri("/disasters")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }));
    }

    for handle in handles {
        let response = handle.await.expect("request task should not panic");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["count"], 1, "every waiter gets the same result");
        assert_eq!(json["events"][0]["id"], "slow-1");
    }

    assert_eq!(
        fetches.load(Ordering::SeqCst),
        1,
        "cold-cache requests must coalesce into one fetch"
    );
}
