//! Weather-derived hazard heuristic: flags active rain at the watched
//! destinations as a possible flood signal.

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use safar_types::{Destination, HazardEvent};

use crate::source::{HazardSource, SourceError};

/// Default OpenWeather current-conditions endpoint.
pub const DEFAULT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Polls current conditions at each watchpoint and emits a `CURRENT_RAIN`
/// event wherever rain is observed. Predicted rather than observed hazard
/// data, so the source name carries the `openweather` prefix.
pub struct CurrentRainSource {
    client: reqwest::Client,
    url: String,
    api_key: String,
    points: Vec<Destination>,
}

#[derive(Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    weather: Vec<ConditionEntry>,
}

#[derive(Deserialize)]
struct ConditionEntry {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

impl CurrentRainSource {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, points: Vec<Destination>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (hazard-feed)")
                .build()
                .unwrap_or_default(),
            url: url.into(),
            api_key: api_key.into(),
            points,
        }
    }

    async fn check_point(&self, point: &Destination) -> Result<Option<HazardEvent>, SourceError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }
        let conditions: CurrentConditions = resp.json().await?;

        let (main, description) = conditions
            .weather
            .first()
            .map(|c| (c.main.to_lowercase(), c.description.to_lowercase()))
            .unwrap_or_default();

        if main.contains("rain") || description.contains("rain") {
            Ok(Some(rain_event(point, &description)))
        } else {
            Ok(None)
        }
    }
}

/// The synthesized event. The fetch-time id makes recomputation observable
/// to clients within otherwise identical responses.
fn rain_event(point: &Destination, description: &str) -> HazardEvent {
    let mut raw = Map::new();
    raw.insert("weather".to_string(), Value::String(description.to_string()));
    HazardEvent {
        id: format!(
            "current-rain-{}-{}-{}",
            point.lat,
            point.lon,
            chrono::Utc::now().timestamp()
        ),
        source: "openweather-current".to_string(),
        name: "Current Rain Conditions (possible flood risk)".to_string(),
        kind: "CURRENT_RAIN".to_string(),
        lat: point.lat,
        lon: point.lon,
        severity: Some("moderate".to_string()),
        magnitude: None,
        start: None,
        url: None,
        raw,
    }
}

#[async_trait]
impl HazardSource for CurrentRainSource {
    fn name(&self) -> &'static str {
        "openweather-current"
    }

    /// One concurrent lookup per watchpoint; a failing point is logged and
    /// skipped so the rest of the sweep still contributes.
    async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
        let checks = self.points.iter().map(|point| async move {
            (point, self.check_point(point).await)
        });

        let mut out = Vec::new();
        for (point, result) in join_all(checks).await {
            match result {
                Ok(Some(event)) => out.push(event),
                Ok(None) => {}
                Err(e) => tracing::debug!(
                    source = self.name(),
                    point = point.name,
                    error = %e,
                    "conditions lookup failed; skipping point"
                ),
            }
        }
        Ok(out)
    }
}
