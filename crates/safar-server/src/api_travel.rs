//! Weather, forecast, route, places, and hotel endpoints.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use safar_travel::{hotels, TravelError};

use crate::AppState;

fn default_city() -> String {
    "Hunza".to_string()
}

fn default_place_kind() -> String {
    "restaurant".to_string()
}

fn default_budget() -> u32 {
    15_000
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    #[serde(default = "default_city")]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub location: String,
    #[serde(default = "default_place_kind", rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct HotelsQuery {
    pub city: String,
    #[serde(default = "default_budget")]
    pub budget: u32,
}

/// Handler for `GET /weather?city=`. Never fails — the client degrades to
/// sample data on any upstream trouble.
pub async fn weather_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Response {
    Json(state.weather.current(&query.city).await).into_response()
}

/// Handler for `GET /forecast?city=`. Upstream rejections surface in-band
/// as `{"error": message}`, matching what map clients already parse.
pub async fn forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Response {
    match state.weather.forecast(&query.city).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            tracing::debug!(city = %query.city, error = %e, "forecast lookup failed");
            Json(json!({"error": e.to_string()})).into_response()
        }
    }
}

/// Handler for `GET /route?origin=&destination=`.
pub async fn route_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    match state.maps.route(&query.origin, &query.destination).await {
        Ok(route) => Json(route).into_response(),
        Err(TravelError::NoRoute) => Json(json!({"error": "No route found"})).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "directions lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Handler for `GET /places?location=&type=`.
pub async fn places_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PlacesQuery>,
) -> Response {
    match state.maps.places(&query.location, &query.kind).await {
        Ok(places) => Json(places).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "places lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Handler for `GET /hotels?city=&budget=`. Served entirely from the
/// curated catalog; no upstream call.
pub async fn hotels_handler(Query(query): Query<HotelsQuery>) -> Response {
    Json(hotels::suggestions_for(&query.city, query.budget)).into_response()
}
