//! Cached, retrying reverse geocoding.
//!
//! [`GeocodingResolver`] answers "which city is this coordinate in?" by
//! consulting a [`CityCache`](snapname_cache::CityCache) first and falling
//! back to a [`CityLookupService`] through a
//! [`RetryPolicy`](snapname_retry::RetryPolicy). Names coming back from the
//! service are cleaned with [`clean_city_name`] before they are cached or
//! returned.

mod clean;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod resolver;
mod service;

pub use crate::clean::clean_city_name;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockLookup, Reply};
pub use crate::resolver::GeocodingResolver;
pub use crate::service::{CityLookupService, LookupHandle};
