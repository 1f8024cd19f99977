//! Metadata providers.
//!
//! Extraction from binary containers happens outside this crate. Each
//! extractor is wrapped as a [`MetadataProvider`], and a [`ProviderChain`]
//! asks them in priority order until one of them knows something.

use crate::error::Result;
use crate::record::{MediaFile, MetadataRecord, MetadataSource};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A source of [`MetadataRecord`]s, such as an EXIF or XMP reader.
#[async_trait]
pub trait MetadataProvider {
    /// Identifies the provider in logs.
    fn name(&self) -> &str;

    /// Cheap pre-check, usually on the extension, before [`read`](Self::read).
    fn supports(&self, _path: &Path) -> bool {
        true
    }

    /// Returns `Ok(None)` when the file simply has nothing this provider
    /// understands; errors are for files it should have been able to read.
    async fn read(&self, path: &Path) -> Result<Option<MetadataRecord>>;
}

pub type ProviderHandle = Arc<dyn MetadataProvider + Send + Sync>;

/// Providers in priority order.
///
/// The first record that carries metadata wins. If none does, the first
/// record without metadata (typically a filesystem timestamp) is used, and if
/// no provider returns anything the file gets an empty record. Provider
/// errors are logged and skipped; they never fail the file.
#[derive(Default, Clone)]
pub struct ProviderChain {
    providers: Vec<ProviderHandle>,
}
impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider with lower priority than those already added.
    pub fn with(mut self, provider: ProviderHandle) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn read(&self, path: &Path) -> MetadataRecord {
        let mut fallback = None;
        for provider in self.providers.iter().filter(|p| p.supports(path)) {
            match provider.read(path).await {
                Ok(Some(record)) if record.has_metadata => {
                    debug!(provider = provider.name(), "Metadata found");
                    return record;
                },
                Ok(Some(record)) => {
                    fallback.get_or_insert(record);
                },
                Ok(None) => {},
                Err(err) => warn!(provider = provider.name(), error = ?err, "Metadata provider failed; trying next"),
            }
        }
        fallback.unwrap_or_else(|| MetadataRecord::empty(MetadataSource::Filesystem))
    }

    /// Reads metadata for every path, in order. Paths without a final
    /// component (`..`, `/`) are skipped.
    pub async fn media_files(&self, paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<MediaFile> {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let Some(name) = path.file_name() else {
                warn!(path = %path.display(), "Skipping path without a file name");
                continue;
            };
            let metadata = self.read(path).await;
            files.push(MediaFile::new(name.to_string_lossy(), metadata));
        }
        files
    }
}
