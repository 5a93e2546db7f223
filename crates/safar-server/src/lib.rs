//! Safar server library logic.

pub mod api_disasters;
pub mod api_risk;
pub mod api_travel;
pub mod config;

use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use safar_hazards::risk::WeatherRiskPredictor;
use safar_hazards::weather::CurrentRainSource;
use safar_hazards::{
    gdacs::GdacsSource, usgs::UsgsSource, EventAggregator, HazardSource, RiskAugmenter,
    RiskPredictor,
};
use safar_travel::{maps::MapsClient, weather::WeatherClient};

use crate::config::Config;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The hazard pipeline behind `/disasters`.
    pub aggregator: Arc<EventAggregator>,
    /// Risk predictor behind the `/ml-*` endpoints.
    pub predictor: Arc<dyn RiskPredictor>,
    /// Weather collaborator.
    pub weather: Arc<WeatherClient>,
    /// Maps collaborator.
    pub maps: Arc<MapsClient>,
}

/// Builds the application state from configuration.
///
/// Catalog feeds are always registered. The OpenWeather-backed pieces (rain
/// heuristic feed, risk augmenter) are only registered when an API key is
/// configured; without one the pipeline still serves the catalog feeds.
pub fn build_state(config: &Config) -> AppState {
    let mut sources: Vec<Arc<dyn HazardSource>> = vec![
        Arc::new(GdacsSource::new(&config.hazards.gdacs_url)),
        Arc::new(UsgsSource::new(
            &config.hazards.usgs_url,
            config.hazards.min_quake_magnitude,
        )),
    ];

    let predictor: Arc<dyn RiskPredictor> = Arc::new(WeatherRiskPredictor::new(
        format!("{}/weather", config.weather.base_url),
        &config.weather.api_key,
    ));

    let augmenter = if config.weather.api_key.is_empty() {
        tracing::info!("no OpenWeather API key configured; weather-derived hazards disabled");
        None
    } else {
        sources.push(Arc::new(CurrentRainSource::new(
            format!("{}/weather", config.weather.base_url),
            &config.weather.api_key,
            safar_types::hazard_watchpoints().copied().collect(),
        )));
        Some(RiskAugmenter::new(
            Arc::clone(&predictor),
            safar_types::hazard_watchpoints().copied().collect(),
        ))
    };

    AppState {
        aggregator: Arc::new(EventAggregator::new(
            sources,
            augmenter,
            Duration::from_secs(config.hazards.ttl_seconds),
        )),
        predictor,
        weather: Arc::new(WeatherClient::new(
            &config.weather.base_url,
            &config.weather.api_key,
        )),
        maps: Arc::new(MapsClient::new(&config.maps.base_url, &config.maps.api_key)),
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/disasters", get(api_disasters::disasters_handler))
        .route("/weather", get(api_travel::weather_handler))
        .route("/forecast", get(api_travel::forecast_handler))
        .route("/route", get(api_travel::route_handler))
        .route("/places", get(api_travel::places_handler))
        .route("/hotels", get(api_travel::hotels_handler))
        .route("/ml-predictions", get(api_risk::predictions_handler))
        .route("/ml-high-risk", get(api_risk::high_risk_handler))
        .route(
            "/ml-predict/{disaster_type}",
            get(api_risk::predict_handler),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = app(build_state(&Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
