use crate::error::{ErrorKind, Result};
use crate::plan::RenamePlan;
use crate::planner::{PlanEvent, Planner};
use crate::record::MediaFile;
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::collections::HashSet;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A batch running on its own task. Read progress from
/// [`events`](Self::events), then [`join`](Self::join) for the plan.
pub struct PlanTask {
    events: UnboundedReceiver<PlanEvent>,
    handle: JoinHandle<(RenamePlan, Planner)>,
}
impl PlanTask {
    /// Progress events in the order documented on [`PlanEvent`]. The stream
    /// ends once the batch has finished.
    pub fn events(&mut self) -> impl Stream<Item = PlanEvent> + '_ {
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            while let Some(event) = self.events.recv().await {
                yield event;
            }
        })
    }

    /// Waits for the plan. The planner comes back too, so its city cache can
    /// be saved.
    pub async fn join(self) -> Result<(RenamePlan, Planner)> {
        self.handle.await.or_raise(|| ErrorKind::Task)
    }
}

impl Planner {
    /// Runs [`plan`](Self::plan) on a new tokio task, taking ownership of the
    /// batch.
    pub fn spawn(mut self, files: Vec<MediaFile>, existing: HashSet<String>, cancel: CancellationToken) -> PlanTask {
        let (sender, events) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let plan = self.plan(&files, &existing, &cancel, Some(&sender)).await;
            (plan, self)
        });
        PlanTask { events, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MetadataRecord, MetadataSource};
    use futures::StreamExt;
    use snapname_cache::CityCache;
    use snapname_coords::RawCoordinate;
    use snapname_geocode::{GeocodingResolver, MockLookup, Reply};
    use snapname_retry::RetryPolicy;
    use std::sync::Arc;
    use time::macros::datetime;

    fn planner() -> Planner {
        let service = Arc::new(MockLookup::always(Reply::city("Athens")));
        let resolver = GeocodingResolver::new(service, CityCache::default(), RetryPolicy::default());
        Planner::new(resolver, "{{ city }}_{{ year }}".parse().unwrap())
    }

    #[tokio::test]
    async fn test_spawned_batch_reports_progress_and_returns_cache() {
        let gps = RawCoordinate::axes("38.015N", "23.821E");
        let files = vec![
            MediaFile::new(
                "a.jpg",
                MetadataRecord::new(Some(datetime!(2024-03-14 11:56:10)), Some(gps), MetadataSource::Exif),
            ),
            MediaFile::new("_b.jpg", MetadataRecord::empty(MetadataSource::Filesystem)),
        ];
        let mut task = planner().spawn(files, HashSet::new(), CancellationToken::new());
        let events: Vec<_> = task.events().collect().await;
        assert_eq!(
            events,
            [
                PlanEvent::Started { total: 2 },
                PlanEvent::Resolved { index: 0, original: "a.jpg".into(), candidate: "Athens_2024.jpg".into() },
                PlanEvent::Excluded { index: 1, original: "_b.jpg".into() },
                PlanEvent::Complete { planned: 1 },
            ]
        );

        let (plan, planner) = task.join().await.unwrap();
        assert_eq!(plan.entries[0].final_name, "Athens_2024.jpg");
        assert_eq!(plan.excluded, ["_b.jpg"]);
        assert_eq!(planner.into_resolver().into_cache().len(), 1);
    }
}
