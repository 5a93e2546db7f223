//! Wrappers around the travel-assistant's external collaborators: weather
//! and forecast lookup, route and places search, and the curated hotel
//! catalog.
//!
//! These are thin single-call clients. The interesting coordination logic
//! lives in `safar-hazards`; everything here favors graceful degradation
//! over surfacing upstream trouble to the traveller.

pub mod hotels;
pub mod maps;
pub mod weather;

use thiserror::Error;

/// Errors from the travel collaborators.
#[derive(Debug, Error)]
pub enum TravelError {
    /// The request could not be completed (network, timeout, decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API rejected the request and said why.
    #[error("upstream rejected request: {0}")]
    Upstream(String),

    /// Directions lookup found no route between the endpoints.
    #[error("no route found")]
    NoRoute,
}
