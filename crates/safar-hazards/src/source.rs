//! The feed-adapter seam and shared record-normalization helpers.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use safar_types::HazardEvent;

/// Errors surfaced by a hazard feed adapter.
///
/// Adapters return these instead of swallowing failures; the aggregator
/// decides what to log and always proceeds with the remaining feeds.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be completed (network, timeout, decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

/// A single external hazard feed.
///
/// `fetch` performs one bounded HTTP round-trip and normalizes the payload.
/// Individual malformed records are skipped, not propagated; only whole-feed
/// failures surface as errors.
#[async_trait]
pub trait HazardSource: Send + Sync {
    /// Short feed name used for provenance and logging.
    fn name(&self) -> &'static str;

    /// Fetch the feed and normalize it into hazard events.
    async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError>;
}

/// Deterministic fallback id for records whose feed omits one: SHA-256 over
/// the serialized record, truncated. Collisions are tolerable — the id is a
/// display key, not a dedup key.
pub(crate) fn content_hash_id(source: &str, record: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.to_string().as_bytes());
    let digest = hasher.finalize();
    format!("{}-{}", source, &hex::encode(digest)[..16])
}

/// Extracts `(lon, lat)` from a GeoJSON-like feature, or `None` when the
/// geometry is missing, short, or non-numeric.
pub(crate) fn feature_coordinates(feature: &Value) -> Option<(f64, f64)> {
    let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    Some((coords[0].as_f64()?, coords[1].as_f64()?))
}

/// The feature's `properties` object, cloned for the event's `raw` map.
pub(crate) fn feature_properties(feature: &Value) -> Map<String, Value> {
    feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// A property as a string, accepting strings and numbers. GDACS in
/// particular mixes numeric and textual values for the same keys.
pub(crate) fn scalar_string(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A property as a float, accepting numbers and numeric strings.
pub(crate) fn scalar_f64(props: &Map<String, Value>, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
