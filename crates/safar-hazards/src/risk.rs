//! Risk prediction and the event augmenter built on top of it.
//!
//! The predictor is a collaborator seam: anything that can turn a
//! coordinate into a [`RiskAssessment`] plugs in behind [`RiskPredictor`].
//! The default implementation scores current weather observations with the
//! heuristics the product shipped before its ML models existed.

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use safar_types::{Destination, HazardEvent, RiskAssessment, RiskLevel, WeatherSample};

/// Source name for augmenter-synthesized events. Starts with the
/// `openweather` prefix so projection derives `predicted = true`.
pub const AUGMENTER_SOURCE: &str = "openweather-risk";

/// Default conditions endpoint backing the heuristic predictor.
pub const DEFAULT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from a risk predictor.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The observations backing the assessment could not be fetched.
    #[error("conditions fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The conditions service answered with a non-success status.
    #[error("conditions service returned {0}")]
    Status(reqwest::StatusCode),
}

/// A model assessing hazard risk at a coordinate.
///
/// `Ok(None)` means the predictor has no usable assessment for the point;
/// callers treat it like an all-clear.
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    /// Flood risk over the assessment window at a point.
    async fn flood_risk(&self, lat: f64, lon: f64)
        -> Result<Option<RiskAssessment>, PredictError>;

    /// Earthquake risk over the assessment window at a point.
    async fn quake_risk(&self, lat: f64, lon: f64)
        -> Result<Option<RiskAssessment>, PredictError>;
}

/// Heuristic predictor scoring current OpenWeather observations.
pub struct WeatherRiskPredictor {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ConditionsResponse {
    main: MainReadings,
    #[serde(default)]
    wind: WindReadings,
    #[serde(default)]
    rain: RainReadings,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Default, Deserialize)]
struct WindReadings {
    #[serde(default)]
    speed: f64,
}

#[derive(Default, Deserialize)]
struct RainReadings {
    #[serde(default, rename = "1h")]
    last_hour_mm: f64,
}

impl WeatherRiskPredictor {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (risk-predictor)")
                .build()
                .unwrap_or_default(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetches the observations an assessment is derived from. A failed
    /// fetch fails the assessment; fabricating default observations would
    /// produce predictions with nothing behind them.
    async fn sample(&self, lat: f64, lon: f64) -> Result<WeatherSample, PredictError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(PredictError::Status(resp.status()));
        }
        let conditions: ConditionsResponse = resp.json().await?;
        Ok(WeatherSample {
            temp_c: conditions.main.temp,
            temp_min_c: conditions.main.temp_min,
            temp_max_c: conditions.main.temp_max,
            humidity_pct: conditions.main.humidity,
            wind_speed_ms: conditions.wind.speed,
            precipitation_mm: conditions.rain.last_hour_mm,
        })
    }
}

#[async_trait]
impl RiskPredictor for WeatherRiskPredictor {
    async fn flood_risk(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<RiskAssessment>, PredictError> {
        let sample = self.sample(lat, lon).await?;
        Ok(Some(flood_assessment(&sample)))
    }

    async fn quake_risk(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<RiskAssessment>, PredictError> {
        let sample = self.sample(lat, lon).await?;
        Ok(Some(quake_assessment(&sample)))
    }
}

/// Flood risk from precipitation, humidity, and snowmelt-driving warmth.
pub(crate) fn flood_assessment(sample: &WeatherSample) -> RiskAssessment {
    let mut score: f64 = 0.0;

    if sample.precipitation_mm > 10.0 {
        score += 0.4;
    } else if sample.precipitation_mm > 5.0 {
        score += 0.2;
    }

    if sample.humidity_pct > 80.0 {
        score += 0.3;
    } else if sample.humidity_pct > 70.0 {
        score += 0.1;
    }

    // Warm spells accelerate snowmelt in the high valleys.
    if sample.temp_c > 15.0 {
        score += 0.2;
    } else if sample.temp_c > 10.0 {
        score += 0.1;
    }

    let (risk_level, probability) = if score > 0.6 {
        (RiskLevel::High, score.min(0.9))
    } else if score > 0.3 {
        (RiskLevel::Medium, score)
    } else {
        (RiskLevel::Low, score.max(0.1))
    };

    RiskAssessment {
        prediction: u8::from(risk_level.is_elevated()),
        probability,
        risk_level,
        confidence: 0.7,
        predicted_depth: None,
        weather_conditions: sample.clone(),
        method: "weather-heuristic".to_string(),
    }
}

/// Earthquake risk. The region is seismically active, so a base score
/// applies everywhere; atmospheric readings nudge it only slightly.
pub(crate) fn quake_assessment(sample: &WeatherSample) -> RiskAssessment {
    let mut score: f64 = 0.2;

    if sample.temp_c > 20.0 || sample.temp_c < 0.0 {
        score += 0.1;
    }
    if sample.humidity_pct > 80.0 {
        score += 0.05;
    }
    if sample.wind_speed_ms > 10.0 {
        score += 0.05;
    }

    let (risk_level, probability) = if score > 0.4 {
        (RiskLevel::High, score.min(0.8))
    } else if score > 0.25 {
        (RiskLevel::Medium, score)
    } else {
        (RiskLevel::Low, score.max(0.1))
    };

    RiskAssessment {
        prediction: u8::from(risk_level.is_elevated()),
        probability,
        risk_level,
        confidence: 0.6,
        // Shallow-to-intermediate depths are typical for the region.
        predicted_depth: Some(15.0),
        weather_conditions: sample.clone(),
        method: "weather-heuristic".to_string(),
    }
}

/// Sweeps the fixed watchpoint list through a [`RiskPredictor`] and turns
/// elevated flood assessments into predicted hazard events.
pub struct RiskAugmenter {
    predictor: Arc<dyn RiskPredictor>,
    points: Vec<Destination>,
}

impl RiskAugmenter {
    pub fn new(predictor: Arc<dyn RiskPredictor>, points: Vec<Destination>) -> Self {
        Self { predictor, points }
    }

    /// Predicted events for every watchpoint with an elevated assessment.
    /// Predictor failures degrade to no event for that point, never to a
    /// pipeline failure.
    pub async fn augment(&self) -> Vec<HazardEvent> {
        let sweeps = self.points.iter().map(|point| async move {
            (point, self.predictor.flood_risk(point.lat, point.lon).await)
        });

        let mut out = Vec::new();
        for (point, result) in join_all(sweeps).await {
            match result {
                Ok(Some(assessment)) if assessment.risk_level.is_elevated() => {
                    out.push(predicted_event(point, &assessment));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(
                    point = point.name,
                    error = %e,
                    "risk predictor failed; skipping point"
                ),
            }
        }
        out
    }
}

fn predicted_event(point: &Destination, assessment: &RiskAssessment) -> HazardEvent {
    let mut raw = Map::new();
    raw.insert("location".to_string(), Value::String(point.name.to_string()));
    raw.insert("risk_level".to_string(), json!(assessment.risk_level));
    raw.insert("probability".to_string(), json!(assessment.probability));
    raw.insert("confidence".to_string(), json!(assessment.confidence));
    raw.insert("method".to_string(), Value::String(assessment.method.clone()));

    HazardEvent {
        id: format!("risk-flood-{}-{}", point.lat, point.lon),
        source: AUGMENTER_SOURCE.to_string(),
        name: format!("Elevated flood risk near {}", point.name),
        kind: "FLOOD_RISK".to_string(),
        lat: point.lat,
        lon: point.lon,
        severity: Some(assessment.risk_level.label().to_lowercase()),
        magnitude: None,
        start: None,
        url: None,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temp: f64, humidity: f64, wind: f64, precip: f64) -> WeatherSample {
        WeatherSample {
            temp_c: temp,
            temp_min_c: temp - 5.0,
            temp_max_c: temp + 5.0,
            humidity_pct: humidity,
            wind_speed_ms: wind,
            precipitation_mm: precip,
        }
    }

    #[test]
    fn heavy_rain_humid_and_warm_is_high_flood_risk() {
        let assessment = flood_assessment(&sample(18.0, 85.0, 3.0, 12.0));
        // 0.4 + 0.3 + 0.2 = 0.9, capped probability.
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!((assessment.probability - 0.9).abs() < 1e-9);
        assert_eq!(assessment.prediction, 1);
    }

    #[test]
    fn moderate_signals_land_in_medium() {
        let assessment = flood_assessment(&sample(12.0, 75.0, 3.0, 7.0));
        // 0.2 + 0.1 + 0.1 = 0.4
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert!((assessment.probability - 0.4).abs() < 1e-9);
    }

    #[test]
    fn calm_dry_cool_is_low_with_probability_floor() {
        let assessment = flood_assessment(&sample(5.0, 40.0, 2.0, 0.0));
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!((assessment.probability - 0.1).abs() < 1e-9);
        assert_eq!(assessment.prediction, 0);
    }

    #[test]
    fn quake_risk_carries_regional_base_and_depth() {
        let assessment = quake_assessment(&sample(15.0, 50.0, 5.0, 0.0));
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!((assessment.probability - 0.2).abs() < 1e-9);
        assert_eq!(assessment.predicted_depth, Some(15.0));

        let stressed = quake_assessment(&sample(25.0, 85.0, 5.0, 0.0));
        // 0.2 + 0.1 + 0.05 = 0.35
        assert_eq!(stressed.risk_level, RiskLevel::Medium);
    }

    struct FixedPredictor {
        level: RiskLevel,
    }

    #[async_trait]
    impl RiskPredictor for FixedPredictor {
        async fn flood_risk(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<Option<RiskAssessment>, PredictError> {
            let mut assessment = flood_assessment(&sample(18.0, 85.0, 3.0, 12.0));
            assessment.risk_level = self.level;
            assessment.prediction = u8::from(self.level.is_elevated());
            Ok(Some(assessment))
        }

        async fn quake_risk(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<Option<RiskAssessment>, PredictError> {
            Ok(None)
        }
    }

    struct FailingPredictor;

    #[async_trait]
    impl RiskPredictor for FailingPredictor {
        async fn flood_risk(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<Option<RiskAssessment>, PredictError> {
            Err(PredictError::Status(reqwest::StatusCode::UNAUTHORIZED))
        }

        async fn quake_risk(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<Option<RiskAssessment>, PredictError> {
            Err(PredictError::Status(reqwest::StatusCode::UNAUTHORIZED))
        }
    }

    fn watchpoints() -> Vec<Destination> {
        safar_types::hazard_watchpoints().copied().collect()
    }

    #[tokio::test]
    async fn elevated_assessments_become_predicted_events() {
        let augmenter = RiskAugmenter::new(
            Arc::new(FixedPredictor { level: RiskLevel::High }),
            watchpoints(),
        );
        let events = augmenter.augment().await;
        assert_eq!(events.len(), 7, "one event per watchpoint");
        for event in &events {
            assert!(event.is_predicted());
            assert_eq!(event.source, AUGMENTER_SOURCE);
            assert_eq!(event.kind, "FLOOD_RISK");
        }
    }

    #[tokio::test]
    async fn low_assessments_produce_nothing() {
        let augmenter = RiskAugmenter::new(
            Arc::new(FixedPredictor { level: RiskLevel::Low }),
            watchpoints(),
        );
        assert!(augmenter.augment().await.is_empty());
    }

    #[tokio::test]
    async fn predictor_failure_degrades_to_no_events() {
        let augmenter = RiskAugmenter::new(Arc::new(FailingPredictor), watchpoints());
        assert!(augmenter.augment().await.is_empty());
    }
}
