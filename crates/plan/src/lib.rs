//! Rename plan construction.
//!
//! A [`Planner`] turns a batch of [`MediaFile`]s into a [`RenamePlan`]: for
//! each file, in order, the GPS coordinate is normalized, a city is resolved
//! through the cache-first [`GeocodingResolver`](snapname_geocode::GeocodingResolver),
//! and the naming pattern is rendered. Candidates are then made unique
//! against each other and the target directory in a single pass.
//!
//! Files with nothing to name them after keep their name behind a marker
//! prefix (`_IMG_0042.jpg`), and files that already carry the marker are
//! left out. Nothing in planning touches the filesystem; applying the plan
//! is up to the caller.
//!
//! Metadata comes from [`MetadataProvider`]s tried in priority order by a
//! [`ProviderChain`].
//!
//! ```no_run
//! # async fn run(planner: snapname_plan::Planner, files: Vec<snapname_plan::MediaFile>) {
//! use futures::StreamExt;
//! use std::collections::HashSet;
//! use tokio_util::sync::CancellationToken;
//!
//! let mut task = planner.spawn(files, HashSet::new(), CancellationToken::new());
//! {
//!     let mut events = std::pin::pin!(task.events());
//!     while let Some(event) = events.next().await {
//!         println!("{event:?}");
//!     }
//! }
//! let (plan, _planner) = task.join().await.unwrap();
//! for (from, to) in plan.renames() {
//!     println!("{from} -> {to}");
//! }
//! # }
//! ```

pub mod error;
mod plan;
mod planner;
mod provider;
mod record;
mod task;

pub use crate::plan::{PlanEntry, PlanStatus, RenamePlan, Summary};
pub use crate::planner::{DEFAULT_MARKER, PlanEvent, Planner};
pub use crate::provider::{MetadataProvider, ProviderChain, ProviderHandle};
pub use crate::record::{MediaFile, MetadataRecord, MetadataSource};
pub use crate::task::PlanTask;
