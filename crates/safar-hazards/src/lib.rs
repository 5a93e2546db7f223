//! Hazard-event aggregation pipeline.
//!
//! Merges heterogeneous disaster feeds (GDACS multi-hazard catalog, USGS
//! seismic catalog, an OpenWeather-derived rain heuristic) into one
//! normalized event stream, augments it with per-destination risk
//! predictions, caches the merged set with a TTL, and filters it
//! geographically and textually for the `/disasters` endpoint.
//!
//! Design points:
//! - each feed adapter is isolated behind [`source::HazardSource`]; a
//!   failing feed never takes the pipeline down,
//! - adapters run concurrently, so total latency is bounded by the slowest
//!   feed rather than the sum,
//! - concurrent cache misses coalesce into a single recompute.

pub mod aggregator;
pub mod cache;
pub mod filter;
pub mod gdacs;
pub mod geo;
pub mod risk;
pub mod source;
pub mod usgs;
pub mod weather;

pub use aggregator::EventAggregator;
pub use cache::EventCache;
pub use filter::{BoundingBox, EventFilter, EventView};
pub use risk::{RiskAugmenter, RiskPredictor, WeatherRiskPredictor};
pub use source::{HazardSource, SourceError};
