use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Reverse geocoding: a coordinate in, a city name out.
///
/// Implementations wrap whatever remote API is in use and classify their own
/// failures as [`Transient`](crate::error::ErrorKind::Transient) or
/// [`Permanent`](crate::error::ErrorKind::Permanent). They need not clean the
/// name or cache anything; [`GeocodingResolver`](crate::GeocodingResolver)
/// does both.
#[async_trait]
pub trait CityLookupService {
    /// Identifies the service in logs.
    fn name(&self) -> &str;

    /// Looks up the city containing the given point. An empty string means
    /// the service knows of no city there.
    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<String>;
}

pub type LookupHandle = Arc<dyn CityLookupService + Send + Sync>;
