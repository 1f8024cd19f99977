use crate::cache::{CityCache, LoadStatus};
use crate::error::{ErrorKind, Result};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

const BACKUP_TIMESTAMP: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]_[hour][minute][second]");

/// A [`CityCache`] persisted as a single JSON file.
///
/// The cache is loaded once at the start of a batch and saved once at the
/// end. Saves go through a temporary sibling file and a rename, so a crash
/// mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}
impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the contents of `cache` with the file's entries.
    ///
    /// A missing file is an empty cache ([`LoadStatus::Missing`]). A file that
    /// fails to parse is left where it is, a byte-for-byte copy is written to
    /// [`backup_path`](Self::backup_path), and the cache starts empty. Nothing
    /// here is fatal to the caller.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn load_into(&self, cache: &mut CityCache) -> LoadStatus {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No city cache file yet");
                cache.clear();
                return LoadStatus::Missing;
            },
            Err(err) => {
                warn!(error = %err, "Unable to read city cache; starting empty");
                cache.clear();
                return LoadStatus::Corrupted;
            },
        };
        let status = cache.load(&bytes);
        match status {
            LoadStatus::Corrupted => {
                match self.write_backup(OffsetDateTime::now_utc(), &bytes).await {
                    Ok(backup) => warn!(backup = %backup.display(), "Preserved corrupted city cache"),
                    Err(err) => error!(error = %err, "Failed to back up corrupted city cache"),
                }
            },
            LoadStatus::Loaded { entries, skipped } => info!(entries, skipped, "City cache loaded"),
            LoadStatus::Missing => {},
        }
        status
    }

    /// Where a corrupted file is copied to: `<stem>_corrupted_<YYYYMMDD_HHMMSS>.json`
    /// in the same directory. Later backups within the same second get `_1`,
    /// `_2`, … appended to the timestamp.
    pub fn backup_path(&self, at: OffsetDateTime) -> PathBuf {
        self.numbered_backup_path(at, 0)
    }

    fn numbered_backup_path(&self, at: OffsetDateTime, counter: u32) -> PathBuf {
        let stem = self.path.file_stem().map_or_else(|| "city_cache".into(), |s| s.to_string_lossy());
        // Infallible: the format only uses components every OffsetDateTime has.
        let stamp = at.format(BACKUP_TIMESTAMP).unwrap_or_default();
        match counter {
            0 => self.path.with_file_name(format!("{stem}_corrupted_{stamp}.json")),
            n => self.path.with_file_name(format!("{stem}_corrupted_{stamp}_{n}.json")),
        }
    }

    /// Writes `bytes` to the first backup path that does not exist yet, never
    /// replacing an earlier backup.
    async fn write_backup(&self, at: OffsetDateTime, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let mut counter = 0;
        loop {
            let path = self.numbered_backup_path(at, counter);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(path);
                },
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists && counter < u32::MAX => counter += 1,
                Err(err) => return Err(err),
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        path.into()
    }

    /// Atomically writes all entries of `cache` to the file, creating parent
    /// directories as needed.
    #[instrument(skip_all, fields(path = %self.path.display(), entries = cache.len()))]
    pub async fn save(&self, cache: &CityCache) -> Result<()> {
        let bytes = cache.save()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, parent))?;
        }
        let temp = self.temp_path();
        fs::write(&temp, &bytes).await.map_err(|e| Self::map_io_error(e, &temp))?;
        if let Err(err) = fs::rename(&temp, &self.path).await {
            // Best effort; the rename failure is the error worth reporting.
            let _ = fs::remove_file(&temp).await;
            exn::bail!(Self::map_io_error(err, &self.path));
        }
        info!("City cache saved");
        Ok(())
    }

    fn map_io_error(e: IoError, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}
