//! Layered configuration for snapname.
//!
//! Values are merged, later sources winning, from:
//!
//! 1. Built-in defaults.
//! 2. An optional configuration file, parsed according to its extension
//!    (`.toml`, `.yaml`/`.yml` or `.json`).
//! 3. Environment variables prefixed with `SNAPNAME_`, using `__` to reach
//!    nested keys: `SNAPNAME_CACHE__MAX_ENTRIES=500` sets `cache.max_entries`.
//!
//! ```toml
//! [cache]
//! max_entries = 1000
//! tolerance = 0.001
//! path = "/home/me/.cache/snapname/city_cache.json"
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//! multiplier = 2
//!
//! [naming]
//! pattern = "{{ year }}.{{ month }}.{{ day }}-{{ hour }}.{{ minute }}.{{ second }}"
//! no_metadata_marker = "_"
//! ```
//!
//! Everything is validated on load, so a [`Config`] converts into each
//! component's settings without further checks.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use snapname_cache::{CacheFile, CacheSettings, DEFAULT_MAX_ENTRIES, DEFAULT_TOLERANCE};
use snapname_naming::{DEFAULT_PATTERN, NameGenerator, validate_filename};
use snapname_retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MULTIPLIER, RetryPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

pub const ENV_PREFIX: &str = "SNAPNAME_";
pub const ENV_SEPARATOR: &str = "__";
pub const CONFIG_FILE_NAME: &str = "snapname.toml";
pub const CACHE_FILE_NAME: &str = "city_cache.json";
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MARKER: &str = "_";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "snapname")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    /// Per-axis proximity tolerance in degrees.
    pub tolerance: f64,
    pub path: PathBuf,
}
impl Default for CacheConfig {
    fn default() -> Self {
        let path = project_dirs()
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME));
        Self { max_entries: DEFAULT_MAX_ENTRIES, tolerance: DEFAULT_TOLERANCE, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: u32,
}
impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub pattern: String,
    /// Prefix for files that have no usable metadata.
    pub no_metadata_marker: String,
}
impl Default for NamingConfig {
    fn default() -> Self {
        Self { pattern: DEFAULT_PATTERN.to_string(), no_metadata_marker: DEFAULT_MARKER.to_string() }
    }
}

impl Config {
    /// The merged sources, before extraction. `file`, when given, must exist.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(extension)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)))
    }

    /// Loads and validates the configuration.
    #[instrument(skip_all, fields(file = ?file))]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(file)?)
    }

    /// Loads using [`default_file`](Self::default_file) when it exists.
    pub fn load_default() -> Result<Self> {
        let file = Self::default_file().filter(|path| path.is_file());
        Self::load(file.as_deref())
    }

    /// `snapname.toml` in the platform configuration directory.
    pub fn default_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            exn::bail!(ErrorKind::Invalid("cache.max_entries"));
        }
        if !self.cache.tolerance.is_finite() || self.cache.tolerance < 0.0 {
            exn::bail!(ErrorKind::Invalid("cache.tolerance"));
        }
        if self.retry.max_attempts == 0 {
            exn::bail!(ErrorKind::Invalid("retry.max_attempts"));
        }
        if self.retry.multiplier == 0 {
            exn::bail!(ErrorKind::Invalid("retry.multiplier"));
        }
        self.naming.pattern.parse::<NameGenerator>().or_raise(|| ErrorKind::Invalid("naming.pattern"))?;
        validate_filename(&self.naming.no_metadata_marker).or_raise(|| ErrorKind::Invalid("naming.no_metadata_marker"))?;
        Ok(())
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings::new(self.cache.max_entries, self.cache.tolerance)
    }

    pub fn cache_file(&self) -> CacheFile {
        CacheFile::new(&self.cache.path)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.max_attempts, Duration::from_millis(self.retry.base_delay_ms))
            .with_multiplier(self.retry.multiplier)
    }

    pub fn name_generator(&self) -> Result<NameGenerator> {
        self.naming.pattern.parse().or_raise(|| ErrorKind::Invalid("naming.pattern"))
    }
}
