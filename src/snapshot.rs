//! Snapshot acquisition and the raw status document schema.
//!
//! The rest of the crate never talks to Juju directly: it consumes one
//! immutable [`StatusSnapshot`] per invocation, obtained through a
//! [`SnapshotProvider`]. Two providers exist: a plain file reader and a
//! caching provider that shells out to `juju status --format=json` when the
//! cached document is older than the configured freshness window.

use chrono::{DateTime, Duration, Local};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot cache '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run 'juju status': {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
    #[error("'juju status' exited with {status}: {stderr}")]
    Command { status: ExitStatus, stderr: String },
    #[error("snapshot is not valid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("no cache directory available on this platform")]
    NoCacheDir,
}

/// Source of the raw status document text.
pub trait SnapshotProvider {
    fn fetch(&self) -> Result<String, SnapshotError>;
}

/// Reads the snapshot from a local JSON file (`--file`).
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotProvider for FileProvider {
    fn fetch(&self) -> Result<String, SnapshotError> {
        fs::read_to_string(&self.path).map_err(|source| SnapshotError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Serves the snapshot from an on-disk cache of `juju status --format=json`,
/// refreshing it when stale or when a refresh is forced.
pub struct CacheProvider {
    cache_file: PathBuf,
    max_age: Duration,
    refresh: bool,
}

impl CacheProvider {
    pub fn new(cache_file: impl Into<PathBuf>, max_age_minutes: i64, refresh: bool) -> Self {
        Self {
            cache_file: cache_file.into(),
            max_age: Duration::minutes(max_age_minutes),
            refresh,
        }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Age of the cached document, if one exists.
    pub fn cache_age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.cache_file).ok()?.modified().ok()?;
        let modified: DateTime<Local> = modified.into();
        Some(Local::now() - modified)
    }

    fn is_fresh(&self) -> bool {
        self.cache_age().is_some_and(|age| age <= self.max_age)
    }

    fn refresh_cache(&self) -> Result<String, SnapshotError> {
        let output = Command::new("juju")
            .args(["status", "--format=json"])
            .output()
            .map_err(|source| SnapshotError::Spawn { source })?;

        if !output.status.success() {
            return Err(SnapshotError::Command {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        if let Some(parent) = self.cache_file.parent() {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
                path: self.cache_file.clone(),
                source,
            })?;
        }
        fs::write(&self.cache_file, &text).map_err(|source| SnapshotError::Write {
            path: self.cache_file.clone(),
            source,
        })?;

        Ok(text)
    }
}

impl SnapshotProvider for CacheProvider {
    fn fetch(&self) -> Result<String, SnapshotError> {
        if !self.refresh && self.is_fresh() {
            return fs::read_to_string(&self.cache_file).map_err(|source| SnapshotError::Read {
                path: self.cache_file.clone(),
                source,
            });
        }
        self.refresh_cache()
    }
}

/// Default location of the snapshot cache file.
pub fn default_cache_file() -> Result<PathBuf, SnapshotError> {
    let base = dirs::cache_dir().ok_or(SnapshotError::NoCacheDir)?;
    Ok(base.join("juju-query").join("status.json"))
}

/// Parse the raw document text into the typed snapshot schema.
pub fn parse_snapshot(text: &str) -> Result<StatusSnapshot, SnapshotError> {
    Ok(serde_json::from_str(text)?)
}

/// Top level of a `juju status --format=json` document.
///
/// Maps are kept as ordered key/value vectors: the document's own ordering is
/// the enumeration order every downstream query preserves.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, deserialize_with = "ordered_map")]
    pub applications: Vec<(String, RawApplication)>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub machines: Vec<(String, RawMachine)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawApplication {
    pub charm_name: String,
    #[serde(default)]
    pub charm_rev: i64,
    /// Present (and non-empty) only for subordinate applications
    #[serde(default)]
    pub subordinate_to: Vec<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub units: Vec<(String, RawUnit)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawUnit {
    /// Assigned machine id; absent on subordinate units
    #[serde(default)]
    pub machine: Option<String>,
    #[serde(default)]
    pub workload_status: Option<RawStatusInfo>,
    #[serde(default)]
    pub juju_status: Option<RawStatusInfo>,
    #[serde(default)]
    pub public_address: Option<String>,
    #[serde(default)]
    pub leader: bool,
    #[serde(default, deserialize_with = "ordered_map")]
    pub subordinates: Vec<(String, RawUnit)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatusInfo {
    #[serde(default)]
    pub current: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawMachine {
    #[serde(default)]
    pub hostname: Option<String>,
    /// Legacy base descriptor, e.g. "focal"
    #[serde(default)]
    pub series: Option<String>,
    /// Structured base descriptor, e.g. {"name": "ubuntu", "channel": "22.04"}
    #[serde(default)]
    pub base: Option<RawBase>,
    #[serde(default)]
    pub hardware: Option<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub containers: Vec<(String, RawMachine)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBase {
    pub name: String,
    pub channel: String,
}

/// Deserialize a JSON object into a vector of entries, preserving the order
/// the document declares them in.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedMap<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMap<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedMap(PhantomData))
}
