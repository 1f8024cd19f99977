use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How a file's final name came about.
///
/// When more than one applies, the first listed here wins:
/// `no-metadata`, `conflict-resolved`, `duplicate-resolved`, `ok`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanStatus {
    /// The rendered candidate was used as-is.
    #[display("ok")]
    Ok,
    /// Another file in the batch produced the same candidate first.
    #[display("duplicate-resolved")]
    DuplicateResolved,
    /// The candidate already exists in the target directory.
    #[display("conflict-resolved")]
    ConflictResolved,
    /// Nothing to name the file after; it keeps its name behind the marker.
    #[display("no-metadata")]
    NoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub original_name: String,
    /// Name produced before collision resolution.
    pub candidate_name: String,
    pub final_name: String,
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}
impl PlanEntry {
    /// Whether applying this entry would rename anything.
    pub fn is_rename(&self) -> bool {
        self.original_name != self.final_name
    }
}

/// Per-status counts for a [`RenamePlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub duplicate_resolved: usize,
    pub conflict_resolved: usize,
    pub no_metadata: usize,
    pub excluded: usize,
}

/// The ordered outcome of planning one batch. Nothing on disk has changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlan {
    pub entries: Vec<PlanEntry>,
    /// Files left out entirely because they already carry the no-metadata
    /// marker.
    #[serde(default)]
    pub excluded: Vec<String>,
    /// Set when planning stopped early; `entries` covers only the files
    /// processed before that.
    #[serde(default)]
    pub cancelled: bool,
}
impl RenamePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        self.entries.iter().fold(Summary { excluded: self.excluded.len(), ..Summary::default() }, |mut summary, entry| {
            match entry.status {
                PlanStatus::Ok => summary.ok += 1,
                PlanStatus::DuplicateResolved => summary.duplicate_resolved += 1,
                PlanStatus::ConflictResolved => summary.conflict_resolved += 1,
                PlanStatus::NoMetadata => summary.no_metadata += 1,
            }
            summary
        })
    }

    /// `(original, final)` pairs for the entries that actually change a name.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|entry| entry.is_rename())
            .map(|entry| (entry.original_name.as_str(), entry.final_name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(original: &str, final_name: &str, status: PlanStatus) -> PlanEntry {
        PlanEntry {
            original_name: original.into(),
            candidate_name: final_name.into(),
            final_name: final_name.into(),
            status,
            city: None,
        }
    }

    #[rstest]
    #[case(PlanStatus::Ok, "ok")]
    #[case(PlanStatus::DuplicateResolved, "duplicate-resolved")]
    #[case(PlanStatus::ConflictResolved, "conflict-resolved")]
    #[case(PlanStatus::NoMetadata, "no-metadata")]
    fn test_status_names(#[case] status: PlanStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
        assert_eq!(serde_json::to_value(status).unwrap(), expected);
    }

    #[test]
    fn test_summary_and_renames() {
        let plan = RenamePlan {
            entries: vec![
                entry("a.jpg", "2024.jpg", PlanStatus::Ok),
                entry("b.jpg", "2024_001.jpg", PlanStatus::DuplicateResolved),
                entry("c.jpg", "c.jpg", PlanStatus::Ok),
                entry("d.png", "_d.png", PlanStatus::NoMetadata),
            ],
            excluded: vec!["_e.png".into()],
            cancelled: false,
        };
        assert_eq!(
            plan.summary(),
            Summary { ok: 2, duplicate_resolved: 1, conflict_resolved: 0, no_metadata: 1, excluded: 1 }
        );
        let renames: Vec<_> = plan.renames().collect();
        assert_eq!(renames, [("a.jpg", "2024.jpg"), ("b.jpg", "2024_001.jpg"), ("d.png", "_d.png")]);
    }

    #[test]
    fn test_entry_json_shape() {
        let mut entry = entry("a.jpg", "2024.jpg", PlanStatus::Ok);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "originalName": "a.jpg",
                "candidateName": "2024.jpg",
                "finalName": "2024.jpg",
                "status": "ok",
            })
        );
        entry.city = Some("Athens".into());
        assert_eq!(serde_json::to_value(&entry).unwrap()["city"], "Athens");
    }
}
