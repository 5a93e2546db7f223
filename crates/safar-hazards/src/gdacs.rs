//! GDACS multi-hazard catalog adapter (earthquakes, floods, cyclones,
//! volcanoes, droughts).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use safar_types::HazardEvent;

use crate::source::{
    content_hash_id, feature_coordinates, feature_properties, scalar_f64, scalar_string,
    HazardSource, SourceError,
};

/// Default GDACS event-list endpoint, covering the hazard classes the
/// assistant cares about.
pub const DEFAULT_URL: &str =
    "https://www.gdacs.org/gdacsapi/api/events/geteventlist/EQ,FL,TC,VO,DR";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GdacsSource {
    client: reqwest::Client,
    url: String,
}

/// GDACS has served both `features` and `events` as the top-level key over
/// time; accept either.
#[derive(Deserialize)]
struct EventList {
    #[serde(default, alias = "events")]
    features: Vec<Value>,
}

impl GdacsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (hazard-feed)")
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    fn normalize(&self, feature: &Value) -> Option<HazardEvent> {
        let (lon, lat) = feature_coordinates(feature)?;
        let props = feature_properties(feature);

        let id = scalar_string(&props, "id")
            .or_else(|| scalar_string(&props, "eventid"))
            .unwrap_or_else(|| content_hash_id(self.name(), feature));

        Some(HazardEvent {
            id,
            source: self.name().to_string(),
            name: scalar_string(&props, "eventname")
                .or_else(|| scalar_string(&props, "title"))
                .unwrap_or_else(|| "Unknown".to_string()),
            kind: scalar_string(&props, "eventtype").unwrap_or_else(|| "unknown".to_string()),
            lat,
            lon,
            severity: scalar_string(&props, "severity")
                .or_else(|| scalar_string(&props, "alertlevel")),
            magnitude: scalar_f64(&props, "magnitude"),
            start: props.get("start").cloned(),
            url: scalar_string(&props, "link"),
            raw: props,
        })
    }
}

impl Default for GdacsSource {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

#[async_trait]
impl HazardSource for GdacsSource {
    fn name(&self) -> &'static str {
        "gdacs"
    }

    async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }
        let list: EventList = resp.json().await?;

        let mut out = Vec::with_capacity(list.features.len());
        for feature in &list.features {
            match self.normalize(feature) {
                Some(event) => out.push(event),
                None => tracing::debug!(source = self.name(), "skipping record without geometry"),
            }
        }
        Ok(out)
    }
}
