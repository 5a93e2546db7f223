//! Query filtering and response projection for the merged event set.
//!
//! All filters AND-compose; an absent or malformed parameter is an identity
//! pass-through, never an error. This endpoint backs a best-effort map
//! overlay: degraded filtering beats a 4xx.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use safar_types::HazardEvent;

use crate::geo::haversine_km;

/// Inclusive geographic rectangle, `minLon,minLat,maxLon,maxLat` on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Parses the comma-separated wire form. `None` when malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(',').map(|p| p.trim().parse::<f64>());
        let bbox = Self {
            min_lon: parts.next()?.ok()?,
            min_lat: parts.next()?.ok()?,
            max_lon: parts.next()?.ok()?,
            max_lat: parts.next()?.ok()?,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(bbox)
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }
}

/// Great-circle radius filter around an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

/// Parsed `/disasters` filter parameters.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub country: Option<String>,
    pub bbox: Option<BoundingBox>,
    pub radius: Option<RadiusFilter>,
    pub simulate: bool,
}

impl EventFilter {
    /// Builds a filter from raw query pairs, leniently: malformed numbers
    /// and bboxes behave as absent filters, and the radius filter only
    /// engages when the full `lat`/`lon`/`radius_km` triple parses.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let float = |key: &str| params.get(key).and_then(|v| v.trim().parse::<f64>().ok());

        let radius = match (float("lat"), float("lon"), float("radius_km")) {
            (Some(lat), Some(lon), Some(radius_km)) => Some(RadiusFilter {
                lat,
                lon,
                radius_km,
            }),
            _ => None,
        };

        Self {
            country: params
                .get("country")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            bbox: params.get("bbox").and_then(|b| BoundingBox::parse(b)),
            radius,
            simulate: params.get("simulate").map(String::as_str) == Some("1"),
        }
    }

    /// Applies the filter chain. The synthetic test event is appended
    /// *before* any predicate runs, so it is subject to the same filters as
    /// real events.
    pub fn apply(&self, mut events: Vec<HazardEvent>) -> Vec<HazardEvent> {
        if self.simulate {
            events.push(simulated_event());
        }

        if let Some(country) = &self.country {
            let needle = country.to_lowercase();
            events.retain(|event| matches_country(event, &needle));
        }

        if let Some(bbox) = self.bbox {
            events.retain(|event| bbox.contains(event.lon, event.lat));
        }

        if let Some(radius) = self.radius {
            // A NaN distance fails the comparison, excluding the event
            // instead of erroring. Boundary distances are included.
            events.retain(|event| {
                haversine_km(radius.lat, radius.lon, event.lat, event.lon) <= radius.radius_km
            });
        }

        events
    }
}

/// Case-insensitive substring match over the display name or the joined
/// values of the provenance map. Deliberately loose: no feed supplies a
/// structured country field.
fn matches_country(event: &HazardEvent, needle_lower: &str) -> bool {
    if event.name.to_lowercase().contains(needle_lower) {
        return true;
    }
    let raw_text = event
        .raw
        .values()
        .map(value_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    raw_text.contains(needle_lower)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The hardcoded synthetic event injected by `simulate=1`, placed in the
/// Hunza valley. For client-side rendering checks, not a real signal.
pub fn simulated_event() -> HazardEvent {
    HazardEvent {
        id: "sim-local-1".to_string(),
        source: "simulate".to_string(),
        name: "Simulated local hazard".to_string(),
        kind: "SIM".to_string(),
        lat: 36.3167,
        lon: 74.65,
        severity: Some("test".to_string()),
        magnitude: None,
        start: None,
        url: None,
        raw: Map::new(),
    }
}

/// Fixed response projection of an event. Absent optionals serialize as
/// `null`, and `predicted` is derived from the source prefix.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: String,
    pub source: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lon: f64,
    pub severity: Option<String>,
    pub magnitude: Option<f64>,
    pub start: Option<Value>,
    pub url: Option<String>,
    pub predicted: bool,
}

impl From<&HazardEvent> for EventView {
    fn from(event: &HazardEvent) -> Self {
        Self {
            id: event.id.clone(),
            source: event.source.clone(),
            name: event.name.clone(),
            kind: event.kind.clone(),
            lat: event.lat,
            lon: event.lon,
            severity: event.severity.clone(),
            magnitude: event.magnitude,
            start: event.start.clone(),
            url: event.url.clone(),
            predicted: event.is_predicted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, lat: f64, lon: f64) -> HazardEvent {
        HazardEvent {
            id: id.to_string(),
            source: "usgs".to_string(),
            name: "M 4.0 - 20km N of Gilgit".to_string(),
            kind: "EQ".to_string(),
            lat,
            lon,
            severity: None,
            magnitude: Some(4.0),
            start: None,
            url: None,
            raw: Map::new(),
        }
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bbox_parse_accepts_exactly_four_floats() {
        assert_eq!(
            BoundingBox::parse("71.0,33.0,77.0,37.0"),
            Some(BoundingBox {
                min_lon: 71.0,
                min_lat: 33.0,
                max_lon: 77.0,
                max_lat: 37.0,
            })
        );
        assert!(BoundingBox::parse("71.0,33.0,77.0").is_none());
        assert!(BoundingBox::parse("71.0,33.0,77.0,37.0,1.0").is_none());
        assert!(BoundingBox::parse("a,b,c,d").is_none());
        assert!(BoundingBox::parse("").is_none());
    }

    #[test]
    fn bbox_is_inclusive_on_its_edges() {
        let bbox = BoundingBox::parse("71.0,33.0,77.0,37.0").unwrap();
        assert!(bbox.contains(71.0, 33.0));
        assert!(bbox.contains(77.0, 37.0));
        assert!(!bbox.contains(77.0001, 36.0));
    }

    #[test]
    fn bbox_filter_keeps_only_contained_events() {
        let filter = EventFilter::from_query(&query(&[("bbox", "71.0,33.0,77.0,37.0")]));
        let kept = filter.apply(vec![
            event("inside", 35.0, 74.0),
            event("west", 35.0, 60.0),
            event("south", 20.0, 74.0),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "inside");
    }

    #[test]
    fn malformed_bbox_is_ignored_not_an_error() {
        let filter = EventFilter::from_query(&query(&[("bbox", "not,a,bbox")]));
        assert!(filter.bbox.is_none());
        let kept = filter.apply(vec![event("a", 35.0, 74.0), event("b", 20.0, 60.0)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn radius_requires_the_full_triple() {
        let partial = EventFilter::from_query(&query(&[("lat", "36.0"), ("lon", "74.0")]));
        assert!(partial.radius.is_none());

        let garbled = EventFilter::from_query(&query(&[
            ("lat", "36.0"),
            ("lon", "74.0"),
            ("radius_km", "plenty"),
        ]));
        assert!(garbled.radius.is_none());
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        // Two points on the same meridian 1° of latitude apart: ~111.19 km.
        let origin_lat = 35.0;
        let target = event("edge", 36.0, 74.0);
        let distance = haversine_km(origin_lat, 74.0, target.lat, target.lon);

        let filter = EventFilter {
            radius: Some(RadiusFilter {
                lat: origin_lat,
                lon: 74.0,
                radius_km: distance,
            }),
            ..Default::default()
        };
        assert_eq!(filter.apply(vec![target.clone()]).len(), 1);

        let tighter = EventFilter {
            radius: Some(RadiusFilter {
                lat: origin_lat,
                lon: 74.0,
                radius_km: distance - 0.5,
            }),
            ..Default::default()
        };
        assert!(tighter.apply(vec![target]).is_empty());
    }

    #[test]
    fn radius_excludes_events_with_unusable_coordinates() {
        let filter = EventFilter {
            radius: Some(RadiusFilter {
                lat: 35.0,
                lon: 74.0,
                radius_km: 10_000.0,
            }),
            ..Default::default()
        };
        assert!(filter.apply(vec![event("nan", f64::NAN, 74.0)]).is_empty());
    }

    #[test]
    fn country_match_is_case_insensitive_over_raw_values() {
        let mut quake = event("q1", 35.0, 74.0);
        quake.name = "M 4.0".to_string();
        quake
            .raw
            .insert("place".to_string(), json!("Pakistan seismic zone"));

        let filter = EventFilter::from_query(&query(&[("country", "pakistan")]));
        assert_eq!(filter.apply(vec![quake.clone()]).len(), 1);

        let miss = EventFilter::from_query(&query(&[("country", "iceland")]));
        assert!(miss.apply(vec![quake]).is_empty());
    }

    #[test]
    fn country_match_also_covers_the_display_name() {
        let mut flood = event("f1", 34.0, 73.0);
        flood.name = "Flood in Pakistan (Swat)".to_string();
        let filter = EventFilter::from_query(&query(&[("country", "PAKISTAN")]));
        assert_eq!(filter.apply(vec![flood]).len(), 1);
    }

    #[test]
    fn country_match_reads_non_string_raw_values() {
        let mut quake = event("q1", 35.0, 74.0);
        quake.name = "M 4.0".to_string();
        quake
            .raw
            .insert("details".to_string(), json!({"country": "Pakistan"}));
        let filter = EventFilter::from_query(&query(&[("country", "pakistan")]));
        assert_eq!(filter.apply(vec![quake]).len(), 1);
    }

    #[test]
    fn simulate_appends_exactly_one_fixed_event() {
        let filter = EventFilter::from_query(&query(&[("simulate", "1")]));
        let events = filter.apply(Vec::new());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "sim-local-1");
        assert_eq!((events[0].lat, events[0].lon), (36.3167, 74.65));

        // Any other value is not the simulate switch.
        let off = EventFilter::from_query(&query(&[("simulate", "true")]));
        assert!(!off.simulate);
    }

    #[test]
    fn simulated_event_is_subject_to_the_other_filters() {
        // A bbox well away from the Hunza valley must exclude the
        // simulated event even though it was requested.
        let filter =
            EventFilter::from_query(&query(&[("simulate", "1"), ("bbox", "60.0,20.0,65.0,25.0")]));
        assert!(filter.apply(Vec::new()).is_empty());

        // A bbox around Hunza keeps it.
        let around =
            EventFilter::from_query(&query(&[("simulate", "1"), ("bbox", "74.0,36.0,75.0,37.0")]));
        assert_eq!(around.apply(Vec::new()).len(), 1);
    }

    #[test]
    fn filters_and_compose() {
        let mut near = event("near", 36.3, 74.6);
        near.raw.insert("place".to_string(), json!("Pakistan"));
        let mut far = event("far", 34.0, 60.0);
        far.raw.insert("place".to_string(), json!("Pakistan"));

        let filter = EventFilter::from_query(&query(&[
            ("country", "pakistan"),
            ("bbox", "70.0,30.0,78.0,38.0"),
            ("lat", "36.3167"),
            ("lon", "74.65"),
            ("radius_km", "150"),
        ]));
        let kept = filter.apply(vec![near, far]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "near");
    }

    #[test]
    fn projection_derives_predicted_and_keeps_nulls() {
        let mut predicted = event("p1", 36.3, 74.6);
        predicted.source = "openweather-current".to_string();

        let view = EventView::from(&predicted);
        assert!(view.predicted);

        let observed = EventView::from(&event("o1", 36.3, 74.6));
        assert!(!observed.predicted);

        let json = serde_json::to_value(&observed).unwrap();
        assert_eq!(json["type"], "EQ");
        assert!(json["severity"].is_null());
        assert!(json["url"].is_null());
        assert!(json.get("raw").is_none(), "raw is not part of the wire shape");
    }
}
