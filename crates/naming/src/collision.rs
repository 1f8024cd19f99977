//! Duplicate and conflict resolution for a batch of candidate names.
//!
//! Two kinds of clash are resolved, in this order:
//!
//! 1. **Duplicates**: a candidate already produced earlier in the same batch
//!    gets `_001`, `_002`, … inserted before its extension until the name is
//!    unused in the batch.
//! 2. **Conflicts**: a name (after step 1) that already exists on disk gets
//!    `_c1`, `_c2`, … inserted before its extension until it is neither on
//!    disk nor used in the batch.
//!
//! ```text
//! candidates: photo.jpg, photo.jpg, photo.jpg      existing: photo_001.jpg
//! resolved:   photo.jpg, photo_001_c1.jpg, photo_002.jpg
//! ```
//!
//! Resolution is a pure function of its inputs: the same candidates and
//! existing names always produce the same result.

use crate::filename::split_extension;
use std::collections::{HashMap, HashSet};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The candidate was used as-is.
    Unchanged,
    /// A duplicate suffix was added.
    Duplicate,
    /// A conflict suffix was added (possibly on top of a duplicate suffix).
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resolved {
    pub name: String,
    pub outcome: Outcome,
}

/// Produces a unique final name for every candidate, in input order.
///
/// `existing` holds the names already present in the target directory that
/// must not be overwritten.
pub fn resolve<S: AsRef<str>>(candidates: &[S], existing: &HashSet<String>) -> Vec<Resolved> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
    let mut used: HashSet<String> = HashSet::with_capacity(candidates.len());
    // Counters are scoped per base name so that unrelated names each start at 1.
    let mut duplicates: HashMap<&str, u32> = HashMap::new();
    let mut conflicts: HashMap<String, u32> = HashMap::new();

    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .map(|candidate| {
            let mut name = candidate.to_string();
            let mut outcome = Outcome::Unchanged;

            if !seen.insert(candidate) || used.contains(&name) {
                let (stem, ext) = split_extension(candidate);
                let counter = duplicates.entry(candidate).or_insert(0);
                name = next_free(counter, |n| format!("{stem}_{n:03}{ext}"), |name| !used.contains(name));
                outcome = Outcome::Duplicate;
            }

            if existing.contains(&name) {
                let (stem, ext) = split_extension(&name);
                let counter = conflicts.entry(name.clone()).or_insert(0);
                let next = next_free(
                    counter,
                    |n| format!("{stem}_c{n}{ext}"),
                    |name| !existing.contains(name) && !used.contains(name),
                );
                name = next;
                outcome = Outcome::Conflict;
            }

            if outcome != Outcome::Unchanged {
                trace!(candidate, name = name.as_str(), ?outcome, "Resolved name collision");
            }
            used.insert(name.clone());
            Resolved { name, outcome }
        })
        .collect()
}

/// Advances `counter` until `format(counter)` is accepted by `is_free`.
fn next_free(counter: &mut u32, format: impl Fn(u32) -> String, is_free: impl Fn(&str) -> bool) -> String {
    loop {
        // Overflow would need four billion clashes on one name.
        debug_assert!(*counter < u32::MAX, "collision counter exhausted");
        *counter += 1;
        let name = format(*counter);
        if is_free(&name) {
            return name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn names(resolved: &[Resolved]) -> Vec<&str> {
        resolved.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_unique_candidates_are_unchanged() {
        let resolved = resolve(&["a.jpg", "b.jpg"], &existing(&["c.jpg"]));
        assert_eq!(names(&resolved), ["a.jpg", "b.jpg"]);
        assert!(resolved.iter().all(|r| r.outcome == Outcome::Unchanged));
    }

    #[test]
    fn test_intra_batch_duplicates() {
        let resolved = resolve(&["2024.03.14-11.56.10.jpg", "2024.03.14-11.56.10.jpg"], &HashSet::new());
        assert_eq!(names(&resolved), ["2024.03.14-11.56.10.jpg", "2024.03.14-11.56.10_001.jpg"]);
        assert_eq!(resolved[1].outcome, Outcome::Duplicate);
    }

    #[test]
    fn test_conflict_with_existing() {
        let resolved = resolve(&["photo.jpg"], &existing(&["photo.jpg"]));
        assert_eq!(resolved, [Resolved { name: "photo_c1.jpg".into(), outcome: Outcome::Conflict }]);
    }

    #[test]
    fn test_conflict_skips_taken_suffixes() {
        let resolved = resolve(&["photo.jpg"], &existing(&["photo.jpg", "photo_c1.jpg", "photo_c2.jpg"]));
        assert_eq!(names(&resolved), ["photo_c3.jpg"]);
    }

    #[test]
    fn test_second_copy_of_conflicting_candidate_is_a_duplicate() {
        let resolved = resolve(&["photo.jpg", "photo.jpg"], &existing(&["photo.jpg"]));
        // The second is a duplicate first ("photo_001.jpg"), which is free on disk.
        assert_eq!(names(&resolved), ["photo_c1.jpg", "photo_001.jpg"]);
        assert_eq!(resolved[1].outcome, Outcome::Duplicate);
    }

    #[test]
    fn test_duplicate_then_conflict() {
        let resolved = resolve(&["photo.jpg", "photo.jpg", "photo.jpg"], &existing(&["photo_001.jpg"]));
        assert_eq!(names(&resolved), ["photo.jpg", "photo_001_c1.jpg", "photo_002.jpg"]);
        assert_eq!(resolved[1].outcome, Outcome::Conflict);
        assert_eq!(resolved[2].outcome, Outcome::Duplicate);
    }

    #[test]
    fn test_duplicate_suffix_avoids_names_already_used() {
        let resolved = resolve(&["a.jpg", "a_001.jpg", "a.jpg"], &HashSet::new());
        assert_eq!(names(&resolved), ["a.jpg", "a_001.jpg", "a_002.jpg"]);
    }

    #[test]
    fn test_candidate_matching_an_earlier_resolution_is_a_duplicate() {
        let resolved = resolve(&["a.jpg", "a.jpg", "a_001.jpg"], &HashSet::new());
        assert_eq!(names(&resolved), ["a.jpg", "a_001.jpg", "a_001_001.jpg"]);
    }

    #[test]
    fn test_names_without_extension() {
        let resolved = resolve(&["README", "README", ".hidden", ".hidden"], &HashSet::new());
        assert_eq!(names(&resolved), ["README", "README_001", ".hidden", ".hidden_001"]);
    }

    #[test]
    fn test_counters_are_per_base_name() {
        let resolved = resolve(&["a.jpg", "b.jpg", "a.jpg", "b.jpg", "a.jpg"], &HashSet::new());
        assert_eq!(names(&resolved), ["a.jpg", "b.jpg", "a_001.jpg", "b_001.jpg", "a_002.jpg"]);
    }

    #[test]
    fn test_output_is_unique_and_deterministic() {
        let candidates: Vec<String> = (0..200).map(|i| format!("{}.jpg", i % 7)).collect();
        let on_disk = existing(&["0.jpg", "1_001.jpg", "2_c1.jpg", "3_002.jpg"]);
        let first = resolve(&candidates, &on_disk);
        let second = resolve(&candidates, &on_disk);
        assert_eq!(first, second);

        let unique: HashSet<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(unique.len(), candidates.len());
        assert!(first.iter().all(|r| !on_disk.contains(&r.name)));
    }
}
