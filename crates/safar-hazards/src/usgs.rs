//! USGS earthquake catalog adapter (all quakes of the last 24 hours).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use safar_types::HazardEvent;

use crate::source::{
    content_hash_id, feature_coordinates, feature_properties, scalar_f64, scalar_string,
    HazardSource, SourceError,
};

/// Default USGS last-24h summary feed.
pub const DEFAULT_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";

/// Minimum magnitude worth showing. Kept low so small regional quakes still
/// appear on the map.
pub const DEFAULT_MIN_MAGNITUDE: f64 = 1.0;

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

pub struct UsgsSource {
    client: reqwest::Client,
    url: String,
    min_magnitude: f64,
}

#[derive(Deserialize)]
struct QuakeFeed {
    #[serde(default)]
    features: Vec<Value>,
}

impl UsgsSource {
    pub fn new(url: impl Into<String>, min_magnitude: f64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (hazard-feed)")
                .build()
                .unwrap_or_default(),
            url: url.into(),
            min_magnitude,
        }
    }

    /// Normalizes one GeoJSON feature. `None` for records without geometry
    /// or below the magnitude threshold.
    fn normalize(&self, feature: &Value) -> Option<HazardEvent> {
        let (lon, lat) = feature_coordinates(feature)?;
        let props = feature_properties(feature);

        // A null magnitude counts as 0.0, which the default threshold drops.
        let magnitude = scalar_f64(&props, "mag").unwrap_or(0.0);
        if magnitude < self.min_magnitude {
            return None;
        }

        let id = scalar_string(&props, "ids")
            .or_else(|| scalar_string(&props, "url"))
            .unwrap_or_else(|| content_hash_id(self.name(), feature));

        Some(HazardEvent {
            id,
            source: self.name().to_string(),
            name: scalar_string(&props, "title")
                .unwrap_or_else(|| format!("Earthquake M{magnitude}")),
            kind: "EQ".to_string(),
            lat,
            lon,
            severity: None,
            magnitude: Some(magnitude),
            start: props.get("time").cloned(),
            url: scalar_string(&props, "url"),
            raw: props,
        })
    }
}

impl Default for UsgsSource {
    fn default() -> Self {
        Self::new(DEFAULT_URL, DEFAULT_MIN_MAGNITUDE)
    }
}

#[async_trait]
impl HazardSource for UsgsSource {
    fn name(&self) -> &'static str {
        "usgs"
    }

    async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }
        let feed: QuakeFeed = resp.json().await?;

        let mut out = Vec::new();
        for feature in &feed.features {
            match self.normalize(feature) {
                Some(event) => out.push(event),
                None => tracing::debug!(
                    source = self.name(),
                    "skipping record below threshold or without geometry"
                ),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quake(mag: Value, title: &str) -> Value {
        json!({
            "properties": {
                "mag": mag,
                "title": title,
                "time": 1722816000000_i64,
                "url": "https://earthquake.usgs.gov/eq/1",
                "ids": ",us7000abcd,"
            },
            "geometry": {"coordinates": [74.58, 35.41, 10.0]}
        })
    }

    #[test]
    fn applies_magnitude_threshold() {
        let source = UsgsSource::new(DEFAULT_URL, 1.0);
        assert!(source.normalize(&quake(json!(0.4), "M0.4")).is_none());
        let event = source.normalize(&quake(json!(4.2), "M 4.2 - Gilgit")).unwrap();
        assert_eq!(event.magnitude, Some(4.2));
        assert_eq!(event.kind, "EQ");
        assert_eq!(event.id, ",us7000abcd,");
    }

    #[test]
    fn boundary_magnitude_is_included() {
        let source = UsgsSource::new(DEFAULT_URL, 1.0);
        assert!(source.normalize(&quake(json!(1.0), "M1.0")).is_some());
    }

    #[test]
    fn null_magnitude_defaults_to_zero_and_is_dropped() {
        let source = UsgsSource::new(DEFAULT_URL, 1.0);
        assert!(source.normalize(&quake(json!(null), "no mag")).is_none());
        // ...but survives a zero threshold.
        let permissive = UsgsSource::new(DEFAULT_URL, 0.0);
        let event = permissive.normalize(&quake(json!(null), "no mag")).unwrap();
        assert_eq!(event.magnitude, Some(0.0));
    }

    #[test]
    fn start_carries_the_epoch_millis_timestamp() {
        let source = UsgsSource::new(DEFAULT_URL, 1.0);
        let event = source.normalize(&quake(json!(2.5), "M2.5")).unwrap();
        assert_eq!(event.start, Some(json!(1722816000000_i64)));
    }

    #[test]
    fn synthesizes_id_when_ids_and_url_are_absent() {
        let source = UsgsSource::new(DEFAULT_URL, 1.0);
        let feature = json!({
            "properties": {"mag": 3.0},
            "geometry": {"coordinates": [74.0, 35.0]}
        });
        let event = source.normalize(&feature).unwrap();
        assert!(event.id.starts_with("usgs-"));
        assert_eq!(event.name, "Earthquake M3");
    }
}
