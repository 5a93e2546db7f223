//! Risk-prediction endpoints: per-hazard assessments for the watched
//! destinations and for arbitrary coordinates.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use safar_types::{hazard_watchpoints, Destination, RiskAssessment};

use crate::AppState;

/// API error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("prediction service error: {0}")]
    PredictionFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PredictionFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

fn coordinates_json(point: &Destination) -> Value {
    json!({"lat": point.lat, "lon": point.lon})
}

/// Handler for `GET /ml-predictions` — flood and earthquake assessments for
/// every watched destination. Points the predictor cannot assess are simply
/// absent from the maps.
pub async fn predictions_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let sweeps = hazard_watchpoints().map(|point| {
        let predictor = Arc::clone(&state.predictor);
        async move {
            let flood = predictor.flood_risk(point.lat, point.lon).await;
            let quake = predictor.quake_risk(point.lat, point.lon).await;
            (point, flood, quake)
        }
    });

    let mut floods = Map::new();
    let mut quakes = Map::new();
    for (point, flood, quake) in join_all(sweeps).await {
        match flood {
            Ok(Some(assessment)) => {
                floods.insert(
                    point.name.to_string(),
                    json!({
                        "coordinates": coordinates_json(point),
                        "prediction": assessment,
                    }),
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(point = point.name, error = %e, "flood assessment failed"),
        }
        match quake {
            Ok(Some(assessment)) => {
                quakes.insert(
                    point.name.to_string(),
                    json!({
                        "coordinates": coordinates_json(point),
                        "prediction": assessment,
                    }),
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(point = point.name, error = %e, "quake assessment failed"),
        }
    }

    Json(json!({
        "flood_predictions": floods,
        "earthquake_predictions": quakes,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "model_status": "active",
    }))
}

/// Handler for `GET /ml-high-risk` — watched destinations whose assessment
/// is elevated, per hazard.
pub async fn high_risk_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let sweeps = hazard_watchpoints().map(|point| {
        let predictor = Arc::clone(&state.predictor);
        async move {
            let flood = predictor.flood_risk(point.lat, point.lon).await;
            let quake = predictor.quake_risk(point.lat, point.lon).await;
            (point, flood, quake)
        }
    });

    let mut flood_high = Vec::new();
    let mut quake_high = Vec::new();
    for (point, flood, quake) in join_all(sweeps).await {
        if let Ok(Some(assessment)) = flood {
            if assessment.risk_level.is_elevated() {
                flood_high.push(json!({
                    "location": point.name,
                    "coordinates": coordinates_json(point),
                    "risk_level": assessment.risk_level,
                    "probability": assessment.probability,
                }));
            }
        }
        if let Ok(Some(assessment)) = quake {
            if assessment.risk_level.is_elevated() {
                quake_high.push(json!({
                    "location": point.name,
                    "coordinates": coordinates_json(point),
                    "risk_level": assessment.risk_level,
                    "probability": assessment.probability,
                    "predicted_depth": assessment.predicted_depth,
                }));
            }
        }
    }

    Json(json!({
        "flood_high_risk": flood_high,
        "earthquake_high_risk": quake_high,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Query parameters for `GET /ml-predict/{disaster_type}`.
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Handler for `GET /ml-predict/{disaster_type}` — a single assessment for
/// arbitrary coordinates. `disaster_type` is `flood`, `earthquake`, or
/// `quake`.
pub async fn predict_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(disaster_type): Path<String>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<Value>, ApiError> {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(ApiError::BadRequest(
                "lat and lon parameters required".to_string(),
            ))
        }
    };

    let result: Result<Option<RiskAssessment>, _> = match disaster_type.to_lowercase().as_str() {
        "flood" => state.predictor.flood_risk(lat, lon).await,
        "earthquake" | "quake" => state.predictor.quake_risk(lat, lon).await,
        other => {
            return Err(ApiError::BadRequest(format!(
                "disaster_type must be 'flood' or 'earthquake', got '{other}'"
            )))
        }
    };

    let assessment = result
        .map_err(|e| ApiError::PredictionFailed(e.to_string()))?
        .ok_or_else(|| ApiError::PredictionFailed("prediction unavailable".to_string()))?;

    Ok(Json(json!({
        "disaster_type": disaster_type,
        "coordinates": {"lat": lat, "lon": lon},
        "prediction": assessment,
    })))
}
