use crate::clean::clean_city_name;
use crate::error::ErrorKind;
use crate::service::LookupHandle;
use snapname_cache::{CityCache, Source};
use snapname_coords::Coordinate;
use snapname_retry::RetryPolicy;
use tracing::{debug, instrument, warn};

/// Resolves coordinates to city names, cache first.
///
/// On a cache miss the [`CityLookupService`](crate::CityLookupService) is
/// called through the [`RetryPolicy`]: transient failures are retried with
/// backoff, a permanent failure ends the attempt at once. Only a successful,
/// non-empty answer is written back to the cache. Every failure degrades to
/// "no city"; nothing here aborts a batch.
///
/// The resolver owns its [`CityCache`] for the duration of a batch. Take it
/// back with [`into_cache`](Self::into_cache) to persist it.
pub struct GeocodingResolver {
    cache: CityCache,
    service: LookupHandle,
    retry: RetryPolicy,
}
impl GeocodingResolver {
    pub fn new(service: LookupHandle, cache: CityCache, retry: RetryPolicy) -> Self {
        Self { cache, service, retry }
    }

    pub fn cache(&self) -> &CityCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CityCache {
        &mut self.cache
    }

    pub fn into_cache(self) -> CityCache {
        self.cache
    }

    /// Records a known city without asking the service.
    pub fn seed(&mut self, coordinate: Coordinate, city: impl AsRef<str>) {
        let city = clean_city_name(city.as_ref());
        if !city.is_empty() {
            self.cache.insert(coordinate, city, Source::Seed);
        }
    }

    #[instrument(skip_all, fields(%coordinate, service = self.service.name()))]
    pub async fn resolve_city(&mut self, coordinate: &Coordinate) -> Option<String> {
        if let Some(city) = self.cache.lookup(coordinate) {
            return Some(city.to_string());
        }

        let (latitude, longitude) = (coordinate.latitude(), coordinate.longitude());
        let service = &self.service;
        let answer = self
            .retry
            .execute_if(|| service.lookup(latitude, longitude), ErrorKind::is_retryable)
            .await;
        let raw = match answer {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = ?err, "Unable to resolve city; continuing without one");
                return None;
            },
        };

        let city = clean_city_name(&raw);
        if city.is_empty() {
            debug!("Lookup service knows of no city here");
            return None;
        }
        debug!(raw = raw.as_str(), city = city.as_str(), "Resolved city");
        self.cache.insert(*coordinate, city.clone(), Source::Network);
        Some(city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLookup, Reply};
    use snapname_cache::CacheSettings;
    use std::sync::Arc;

    fn resolver(service: &Arc<MockLookup>) -> GeocodingResolver {
        GeocodingResolver::new(service.clone(), CityCache::default(), RetryPolicy::default())
    }

    fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_network() {
        let service = Arc::new(MockLookup::always(Reply::city("Elsewhere")));
        let mut resolver = resolver(&service);
        resolver.seed(coordinate(38.015, 23.821), "NeoPsihiko");

        assert_eq!(resolver.resolve_city(&coordinate(38.0152, 23.8208)).await.as_deref(), Some("NeoPsihiko"));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_resolves_cleans_and_caches() {
        let service = Arc::new(MockLookup::always(Reply::city("Municipality of Thessaloniki")));
        let mut resolver = resolver(&service);
        let point = coordinate(40.6401, 22.9444);

        assert_eq!(resolver.resolve_city(&point).await.as_deref(), Some("Thessaloniki"));
        assert_eq!(resolver.resolve_city(&point).await.as_deref(), Some("Thessaloniki"));
        assert_eq!(service.calls(), 1);

        let stats = resolver.cache().statistics();
        assert_eq!((stats.entry_count, stats.hit_count, stats.miss_count), (1, 1, 1));
        assert_eq!(resolver.cache().entries().next().map(|e| e.source()), Some(Source::Network));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let service = Arc::new(MockLookup::scripted([Reply::Transient, Reply::Transient], Reply::city("Athens")));
        let mut resolver = resolver(&service);
        assert_eq!(resolver.resolve_city(&coordinate(37.9755, 23.7348)).await.as_deref(), Some("Athens"));
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_yields_no_city_and_leaves_cache_untouched() {
        let service = Arc::new(MockLookup::always(Reply::Transient));
        let mut resolver = resolver(&service);
        assert_eq!(resolver.resolve_city(&coordinate(38.015, 23.821)).await, None);
        assert_eq!(service.calls(), 3);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let service = Arc::new(MockLookup::always(Reply::Permanent));
        let mut resolver = resolver(&service);
        assert_eq!(resolver.resolve_city(&coordinate(38.015, 23.821)).await, None);
        assert_eq!(service.calls(), 1);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_answer_is_not_cached() {
        let service = Arc::new(MockLookup::always(Reply::city("   ")));
        let mut resolver = resolver(&service);
        let point = coordinate(0.0, -30.0);
        assert_eq!(resolver.resolve_city(&point).await, None);
        assert_eq!(resolver.resolve_city(&point).await, None);
        assert_eq!(service.calls(), 2);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_into_cache_returns_resolved_entries() {
        let service = Arc::new(MockLookup::always(Reply::city("Athens")));
        let cache = CityCache::new(CacheSettings::new(1, 0.001));
        let mut resolver = GeocodingResolver::new(service.clone(), cache, RetryPolicy::none());
        resolver.resolve_city(&coordinate(37.9755, 23.7348)).await;
        resolver.resolve_city(&coordinate(38.015, 23.821)).await;

        let cache = resolver.into_cache();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&coordinate(38.015, 23.821)));
    }
}
