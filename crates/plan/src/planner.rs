use crate::plan::{PlanEntry, PlanStatus, RenamePlan};
use crate::record::MediaFile;
use snapname_coords::normalize;
use snapname_geocode::GeocodingResolver;
use snapname_naming::{Fields, NameGenerator, Outcome, resolve, split_extension};
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default prefix marking files that had no usable metadata.
pub const DEFAULT_MARKER: &str = "_";

/// Progress of a [`Planner`] batch.
///
/// `Started` comes first, then one `Resolved` or `Excluded` per processed
/// file in input order, then exactly one of `Cancelled` or `Complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEvent {
    Started { total: usize },
    /// A candidate name was produced for the file at `index`.
    Resolved { index: usize, original: String, candidate: String },
    /// The file at `index` already carries the marker and is left out.
    Excluded { index: usize, original: String },
    /// Planning stopped early; `planned` entries made it into the plan.
    Cancelled { planned: usize },
    Complete { planned: usize },
}

/// A file's name before collision resolution.
struct Draft {
    original: String,
    candidate: String,
    city: Option<String>,
    no_metadata: bool,
}

/// Builds [`RenamePlan`]s: normalize the coordinate, resolve a city, render
/// the pattern, then resolve collisions across the whole batch.
///
/// The planner owns its [`GeocodingResolver`] (and with it the city cache)
/// for as long as batches run; take it back with
/// [`into_resolver`](Self::into_resolver) to persist the cache.
pub struct Planner {
    resolver: GeocodingResolver,
    generator: NameGenerator,
    marker: String,
}
impl Planner {
    pub fn new(resolver: GeocodingResolver, generator: NameGenerator) -> Self {
        Self { resolver, generator, marker: DEFAULT_MARKER.to_string() }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn resolver(&self) -> &GeocodingResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut GeocodingResolver {
        &mut self.resolver
    }

    pub fn into_resolver(self) -> GeocodingResolver {
        self.resolver
    }

    /// Plans new names for `files`, in order.
    ///
    /// `existing` lists the names already present in the target directory.
    /// Cancellation is honoured between files only; files processed before
    /// it are still collision-resolved and returned, with
    /// [`RenamePlan::cancelled`] set. Failures for individual files degrade
    /// (no city, or no-metadata) and never end the batch.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn plan(
        &mut self,
        files: &[MediaFile],
        existing: &HashSet<String>,
        cancel: &CancellationToken,
        events: Option<&UnboundedSender<PlanEvent>>,
    ) -> RenamePlan {
        emit(events, PlanEvent::Started { total: files.len() });

        let mut drafts = Vec::with_capacity(files.len());
        let mut excluded = Vec::new();
        let mut sequence = 0;
        let mut cancelled = false;
        for (index, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed = index, "Planning cancelled");
                cancelled = true;
                break;
            }
            match self.draft(file, &mut sequence).await {
                Some(draft) => {
                    emit(
                        events,
                        PlanEvent::Resolved { index, original: file.name.clone(), candidate: draft.candidate.clone() },
                    );
                    drafts.push(draft);
                },
                None => {
                    emit(events, PlanEvent::Excluded { index, original: file.name.clone() });
                    excluded.push(file.name.clone());
                },
            }
        }

        // A file that is already correctly named must not collide with itself,
        // and it claims its name before any other file in the batch can.
        let keeping: HashSet<&str> =
            drafts.iter().filter(|d| d.candidate == d.original).map(|d| d.original.as_str()).collect();
        let existing: HashSet<String> = existing.iter().filter(|name| !keeping.contains(name.as_str())).cloned().collect();
        let mut order: Vec<usize> = (0..drafts.len()).collect();
        order.sort_by_key(|&i| !keeping.contains(drafts[i].original.as_str()));

        let candidates: Vec<&str> = order.iter().map(|&i| drafts[i].candidate.as_str()).collect();
        let mut resolved: Vec<_> = order.into_iter().zip(resolve(&candidates, &existing)).collect();
        resolved.sort_by_key(|(i, _)| *i);
        let entries: Vec<PlanEntry> = drafts
            .into_iter()
            .zip(resolved.into_iter().map(|(_, resolved)| resolved))
            .map(|(draft, resolved)| {
                let status = match (draft.no_metadata, resolved.outcome) {
                    (true, _) => PlanStatus::NoMetadata,
                    (false, Outcome::Conflict) => PlanStatus::ConflictResolved,
                    (false, Outcome::Duplicate) => PlanStatus::DuplicateResolved,
                    (false, Outcome::Unchanged) => PlanStatus::Ok,
                };
                PlanEntry {
                    original_name: draft.original,
                    candidate_name: draft.candidate,
                    final_name: resolved.name,
                    status,
                    city: draft.city,
                }
            })
            .collect();

        let planned = entries.len();
        emit(events, if cancelled { PlanEvent::Cancelled { planned } } else { PlanEvent::Complete { planned } });
        info!(planned, excluded = excluded.len(), cancelled, "Rename plan ready");
        RenamePlan { entries, excluded, cancelled }
    }

    /// Produces the candidate for one file, or `None` if it is excluded.
    /// `sequence` counts the files named from their metadata so far.
    async fn draft(&mut self, file: &MediaFile, sequence: &mut usize) -> Option<Draft> {
        let record = &file.metadata;
        let coordinate = record.gps.as_ref().and_then(normalize);

        if record.has_metadata && (record.captured_at.is_some() || coordinate.is_some()) {
            let city = match &coordinate {
                Some(coordinate) => self.resolver.resolve_city(coordinate).await,
                None => None,
            };
            let (_, ext) = split_extension(&file.name);
            let fields = Fields {
                captured_at: record.captured_at,
                city: city.as_deref(),
                sequence: *sequence + 1,
                original: &file.name,
            };
            match self.generator.generate_with_ext(&fields, ext) {
                Ok(candidate) => {
                    *sequence += 1;
                    return Some(Draft { original: file.name.clone(), candidate, city, no_metadata: false });
                },
                Err(err) => {
                    warn!(file = file.name.as_str(), error = ?err, "Unable to render name; treating file as having no metadata");
                },
            }
        }

        if file.name.starts_with(&self.marker) {
            debug!(file = file.name.as_str(), "Skipping file already marked as having no metadata");
            return None;
        }
        Some(Draft {
            original: file.name.clone(),
            candidate: format!("{}{}", self.marker, file.name),
            city: None,
            no_metadata: true,
        })
    }
}

/// Progress is best-effort: a receiver that went away does not stop planning.
fn emit(events: Option<&UnboundedSender<PlanEvent>>, event: PlanEvent) {
    if let Some(events) = events {
        let _ = events.send(event);
    }
}
