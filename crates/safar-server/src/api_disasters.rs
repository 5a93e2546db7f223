//! The `/disasters` endpoint: the merged, filtered hazard event list.

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use safar_hazards::{EventFilter, EventView};

use crate::AppState;

/// Response body for `GET /disasters`.
#[derive(Debug, Serialize)]
pub struct DisastersResponse {
    pub count: usize,
    pub events: Vec<EventView>,
}

/// Handler for `GET /disasters`.
///
/// Query parameters (all optional, all combinable): `country`,
/// `lat`+`lon`+`radius_km`, `bbox=minLon,minLat,maxLon,maxLat`,
/// `simulate=1`.
///
/// Parameters are taken as a raw string map and parsed leniently — a
/// malformed value behaves like an absent filter. The endpoint never fails:
/// when every upstream feed is down it answers `{"count": 0, "events": []}`
/// rather than a 5xx, because partial or empty data still renders as a map
/// overlay while an error does not.
pub async fn disasters_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<DisastersResponse> {
    let events = state.aggregator.events().await;

    let filter = EventFilter::from_query(&params);
    let filtered = filter.apply(events);

    let views: Vec<EventView> = filtered.iter().map(EventView::from).collect();
    Json(DisastersResponse {
        count: views.len(),
        events: views,
    })
}
