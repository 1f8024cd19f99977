use derive_more::Display;
use snapname_coords::RawCoordinate;
use time::PrimitiveDateTime;

/// Which extractor produced a [`MetadataRecord`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataSource {
    #[display("exif")]
    Exif,
    #[display("xmp")]
    Xmp,
    #[display("video")]
    Video,
    /// Timestamps taken from the filesystem (modification time and the like).
    #[display("filesystem")]
    Filesystem,
    /// Values recovered from the filename itself.
    #[display("filename")]
    Filename,
}

/// Already-extracted metadata for one file. Read-only to the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub captured_at: Option<PrimitiveDateTime>,
    pub gps: Option<RawCoordinate>,
    /// Whether the file carried real embedded metadata. Filesystem-only
    /// records set this to `false` even when they hold a timestamp.
    pub has_metadata: bool,
    pub source: MetadataSource,
}
impl MetadataRecord {
    /// A record that carries metadata if it holds either a timestamp or a
    /// coordinate.
    pub fn new(captured_at: Option<PrimitiveDateTime>, gps: Option<RawCoordinate>, source: MetadataSource) -> Self {
        let has_metadata = captured_at.is_some() || gps.is_some();
        Self { captured_at, gps, has_metadata, source }
    }

    /// A record for a file nothing could be read from.
    pub fn empty(source: MetadataSource) -> Self {
        Self { captured_at: None, gps: None, has_metadata: false, source }
    }
}

/// One file of a batch: its current name and what is known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub metadata: MetadataRecord,
}
impl MediaFile {
    pub fn new(name: impl Into<String>, metadata: MetadataRecord) -> Self {
        Self { name: name.into(), metadata }
    }
}
