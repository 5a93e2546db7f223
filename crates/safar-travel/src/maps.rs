//! Route and places lookup via the Google Maps web APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::TravelError;

/// Default Google Maps API root.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How many places to return from a text search.
const MAX_PLACES: usize = 8;

pub struct MapsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// A place from text search, trimmed to what the client renders.
#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub name: String,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub location: Option<Value>,
}

/// A driving route summary.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub start: String,
    pub end: String,
    pub distance: String,
    pub duration: String,
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: String,
}

#[derive(Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Deserialize)]
struct PlaceResult {
    name: String,
    rating: Option<f64>,
    formatted_address: Option<String>,
    geometry: Option<PlaceGeometry>,
}

#[derive(Deserialize)]
struct PlaceGeometry {
    location: Option<Value>,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    start_address: String,
    end_address: String,
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Deserialize)]
struct DirectionsStep {
    html_instructions: String,
    distance: TextValue,
}

#[derive(Deserialize)]
struct TextValue {
    text: String,
}

impl MapsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (maps)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Text search for places of `kind` around a location.
    pub async fn places(&self, location: &str, kind: &str) -> Result<Vec<Place>, TravelError> {
        let resp = self
            .client
            .get(format!("{}/place/textsearch/json", self.base_url))
            .query(&[
                ("query", format!("{kind} in {location}")),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;
        let places: PlacesResponse = resp.json().await?;

        Ok(places
            .results
            .into_iter()
            .take(MAX_PLACES)
            .map(|place| Place {
                name: place.name,
                rating: place.rating,
                address: place.formatted_address,
                location: place.geometry.and_then(|g| g.location),
            })
            .collect())
    }

    /// Driving directions between two endpoints, summarized to the first
    /// route's first leg.
    pub async fn route(&self, origin: &str, destination: &str) -> Result<Route, TravelError> {
        let resp = self
            .client
            .get(format!("{}/directions/json", self.base_url))
            .query(&[
                ("origin", origin.to_string()),
                ("destination", destination.to_string()),
                ("mode", "driving".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;
        let directions: DirectionsResponse = resp.json().await?;

        let leg = directions
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
            .ok_or(TravelError::NoRoute)?;

        Ok(Route {
            start: leg.start_address,
            end: leg.end_address,
            distance: leg.distance.text,
            duration: leg.duration.text,
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: step.html_instructions,
                    distance: step.distance.text,
                })
                .collect(),
        })
    }
}
