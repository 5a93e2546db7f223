//! Shared types and constants for the Safar travel-assistant backend.
//!
//! This crate provides the foundational types used across all Safar crates:
//! the normalized hazard event model, risk-assessment records, and the fixed
//! table of northern Pakistan destinations.
//!
//! No crate in the workspace depends on anything *except* `safar-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source-name prefix that marks an event as model-predicted rather than
/// observed. Both the current-conditions heuristic feed and the risk
/// augmenter emit sources under this prefix.
pub const PREDICTED_SOURCE_PREFIX: &str = "openweather";

/// A hazard event normalized from one of the external feeds.
///
/// Events from different feeds carry wildly different schemas; adapters map
/// them all onto this record. Coordinates are mandatory — records without
/// usable geometry are dropped during normalization. `raw` retains the
/// original source fields for free-text search and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardEvent {
    /// Unique per source. Synthesized from a content hash when the feed
    /// omits one; never empty.
    pub id: String,
    /// Origin adapter name, e.g. `gdacs`, `usgs`, `openweather-current`.
    pub source: String,
    /// Human-readable label.
    pub name: String,
    /// Hazard category code, e.g. `EQ`, `FL`, `CURRENT_RAIN`.
    #[serde(rename = "type")]
    pub kind: String,
    /// WGS84 latitude in degrees.
    pub lat: f64,
    /// WGS84 longitude in degrees.
    pub lon: f64,
    /// Free-form severity or alert level, when the feed supplies one.
    pub severity: Option<String>,
    /// Seismic magnitude, for earthquake events.
    pub magnitude: Option<f64>,
    /// Event onset. Format varies by source (epoch millis, ISO strings) and
    /// is passed through uninterpreted.
    pub start: Option<Value>,
    /// Link to the source's detail page.
    pub url: Option<String>,
    /// Original source fields, retained for text search.
    pub raw: Map<String, Value>,
}

impl HazardEvent {
    /// Whether this event was predicted by a model/heuristic rather than
    /// observed by a catalog feed.
    pub fn is_predicted(&self) -> bool {
        self.source.starts_with(PREDICTED_SOURCE_PREFIX)
    }
}

/// Risk bands produced by the risk predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Elevated levels are the ones worth surfacing to travellers.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }

    /// Returns the string label for this level.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Point weather observations feeding the risk heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Current temperature, °C.
    pub temp_c: f64,
    /// Daily minimum temperature, °C.
    pub temp_min_c: f64,
    /// Daily maximum temperature, °C.
    pub temp_max_c: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
    /// Wind speed, m/s.
    pub wind_speed_ms: f64,
    /// Precipitation over the last hour, mm.
    pub precipitation_mm: f64,
}

/// One hazard-risk assessment for a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 1 when the assessed risk is elevated, 0 otherwise.
    pub prediction: u8,
    /// Probability of the hazard occurring within the assessment window.
    pub probability: f64,
    pub risk_level: RiskLevel,
    /// How much to trust this assessment (heuristics score lower).
    pub confidence: f64,
    /// Estimated hypocenter depth in km, for seismic assessments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_depth: Option<f64>,
    /// The observations the assessment was derived from.
    pub weather_conditions: WeatherSample,
    /// Identifier of the method that produced this assessment.
    pub method: String,
}

/// A named destination used for weather lookups and hazard prediction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Destination {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    /// Alternate spellings accepted in city lookups.
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// Included in the fixed hazard-prediction sweep.
    #[serde(skip)]
    pub hazard_watch: bool,
}

/// Northern Pakistan destinations tracked by the assistant.
///
/// The `hazard_watch` subset is the fixed point list the hazard pipeline
/// sweeps for weather-derived and predicted events.
pub const DESTINATIONS: &[Destination] = &[
    Destination {
        name: "Hunza Valley",
        lat: 36.3167,
        lon: 74.6500,
        aliases: &["hunza"],
        hazard_watch: true,
    },
    Destination {
        name: "Naran",
        lat: 34.9069,
        lon: 73.6556,
        aliases: &[],
        hazard_watch: true,
    },
    Destination {
        name: "Fairy Meadows",
        lat: 35.4167,
        lon: 74.5833,
        aliases: &[],
        hazard_watch: true,
    },
    Destination {
        name: "Swat",
        lat: 34.7717,
        lon: 72.3600,
        aliases: &[],
        hazard_watch: true,
    },
    Destination {
        name: "Chitral",
        lat: 35.8511,
        lon: 71.7864,
        aliases: &[],
        hazard_watch: true,
    },
    Destination {
        name: "Skardu",
        lat: 35.2976,
        lon: 75.6337,
        aliases: &[],
        hazard_watch: true,
    },
    Destination {
        name: "Neelam Valley",
        lat: 34.6281,
        lon: 73.9110,
        aliases: &["neelam"],
        hazard_watch: true,
    },
    Destination {
        name: "Gilgit",
        lat: 35.9211,
        lon: 74.3081,
        aliases: &[],
        hazard_watch: false,
    },
    Destination {
        name: "Muzaffarabad",
        lat: 34.3700,
        lon: 73.4711,
        aliases: &[],
        hazard_watch: false,
    },
    Destination {
        name: "Mingora",
        lat: 34.7795,
        lon: 72.3607,
        aliases: &[],
        hazard_watch: false,
    },
];

/// Looks up a destination by name or alias, case-insensitively.
pub fn find_destination(name: &str) -> Option<&'static Destination> {
    let needle = name.trim().to_lowercase();
    DESTINATIONS.iter().find(|dest| {
        dest.name.to_lowercase() == needle || dest.aliases.iter().any(|alias| *alias == needle)
    })
}

/// The destinations swept for hazard prediction.
pub fn hazard_watchpoints() -> impl Iterator<Item = &'static Destination> {
    DESTINATIONS.iter().filter(|dest| dest.hazard_watch)
}
