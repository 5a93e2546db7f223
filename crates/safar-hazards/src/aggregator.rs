//! Orchestrates the feed adapters and the risk augmenter behind the cache.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use safar_types::HazardEvent;

use crate::cache::EventCache;
use crate::risk::RiskAugmenter;
use crate::source::HazardSource;

/// Produces the canonical merged event list.
///
/// Feeds are fetched concurrently and independently: a failing feed is
/// logged with its name and cause, and the merge proceeds with whatever the
/// healthy feeds returned. The merged list is unordered; consumers must not
/// rely on adapter ordering.
pub struct EventAggregator {
    sources: Vec<Arc<dyn HazardSource>>,
    augmenter: Option<RiskAugmenter>,
    cache: EventCache,
}

impl EventAggregator {
    pub fn new(
        sources: Vec<Arc<dyn HazardSource>>,
        augmenter: Option<RiskAugmenter>,
        ttl: Duration,
    ) -> Self {
        Self {
            sources,
            augmenter,
            cache: EventCache::new(ttl),
        }
    }

    /// The current merged event set, served from cache while fresh.
    pub async fn events(&self) -> Vec<HazardEvent> {
        self.cache.get_or_refresh(|| self.refresh()).await
    }

    async fn refresh(&self) -> Vec<HazardEvent> {
        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move { (source.name(), source.fetch().await) }
        });

        let mut merged = Vec::new();
        for (name, result) in join_all(fetches).await {
            match result {
                Ok(events) => {
                    tracing::debug!(source = name, count = events.len(), "feed fetched");
                    merged.extend(events);
                }
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "feed failed; continuing without it");
                }
            }
        }

        if let Some(augmenter) = &self.augmenter {
            merged.extend(augmenter.augment().await);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        name: &'static str,
        ids: Vec<&'static str>,
        fetches: AtomicUsize,
    }

    impl StaticSource {
        fn new(name: &'static str, ids: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                ids,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HazardSource for StaticSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .ids
                .iter()
                .map(|id| HazardEvent {
                    id: (*id).to_string(),
                    source: self.name.to_string(),
                    name: "t".to_string(),
                    kind: "T".to_string(),
                    lat: 35.0,
                    lon: 74.0,
                    severity: None,
                    magnitude: None,
                    start: None,
                    url: None,
                    raw: Map::new(),
                })
                .collect())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl HazardSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch(&self) -> Result<Vec<HazardEvent>, SourceError> {
            Err(SourceError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    #[tokio::test]
    async fn merges_all_healthy_sources() {
        let aggregator = EventAggregator::new(
            vec![
                StaticSource::new("a", vec!["a1", "a2"]),
                StaticSource::new("b", vec!["b1"]),
            ],
            None,
            Duration::from_secs(60),
        );
        let mut ids: Vec<_> = aggregator.events().await.into_iter().map(|e| e.id).collect();
        ids.sort();
        assert_eq!(ids, ["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn one_failing_source_does_not_block_the_rest() {
        let healthy = StaticSource::new("healthy", vec!["h1"]);
        let aggregator = EventAggregator::new(
            vec![Arc::new(BrokenSource) as Arc<dyn HazardSource>, healthy.clone()],
            None,
            Duration::from_secs(60),
        );
        let events = aggregator.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "h1");
    }

    #[tokio::test]
    async fn all_sources_failing_yields_an_empty_set_not_an_error() {
        let aggregator = EventAggregator::new(
            vec![Arc::new(BrokenSource) as Arc<dyn HazardSource>],
            None,
            Duration::from_secs(60),
        );
        assert!(aggregator.events().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_calls_within_ttl_fetch_once() {
        let source = StaticSource::new("a", vec!["a1"]);
        let aggregator = EventAggregator::new(
            vec![source.clone() as Arc<dyn HazardSource>],
            None,
            Duration::from_secs(60),
        );
        aggregator.events().await;
        aggregator.events().await;
        aggregator.events().await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_a_new_fan_out() {
        let source = StaticSource::new("a", vec!["a1"]);
        let aggregator = EventAggregator::new(
            vec![source.clone() as Arc<dyn HazardSource>],
            None,
            Duration::from_millis(20),
        );
        aggregator.events().await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        aggregator.events().await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
