//! Key-value cache used by the geocode resolver.
//!
//! Two implementations ship with the library: [`MemoryGeocodeCache`] for
//! tests and single-process use, and [`JsonFileGeocodeCache`], which keeps
//! entries in a JSON file under the user's cache directory so that repeated
//! CLI invocations do not re-query the providers.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Lifetime of a cached geocode result.
pub const GEOCODE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const CACHE_DIR_NAME: &str = "pathfinder";
const CACHE_FILE_NAME: &str = "geocode-cache.json";

/// Cache key for `address`: trimmed, lower-cased, prefixed with `geocode:`.
pub fn cache_key(address: &str) -> String {
    format!("geocode:{}", address.trim().to_lowercase())
}

/// String-valued cache with per-entry expiry.
pub trait GeocodeCache: Send + Sync {
    /// Return the live value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Process-local cache. Last write wins.
#[derive(Debug, Default)]
pub struct MemoryGeocodeCache {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeocodeCache for MemoryGeocodeCache {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let (value, expires) = entries.get(key)?;
        match expires {
            Some(at) if Instant::now() >= *at => None,
            _ => Some(value.clone()),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires = Instant::now().checked_add(ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    value: String,
    /// Expiry as seconds since the Unix epoch.
    expires_at: u64,
}

/// Cache persisted as a single JSON object on disk.
///
/// Every `set` re-reads the file, merges the new entry into what is on disk
/// and rewrites it atomically, so processes sharing the file only ever
/// replace each other's values key by key.
#[derive(Debug)]
pub struct JsonFileGeocodeCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, FileEntry>>,
}

impl JsonFileGeocodeCache {
    /// Open the cache at `path`, loading live entries when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load_live_entries(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "loaded geocode cache");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Open the cache at its default location, honouring `override_dir`.
    pub fn open_default(override_dir: Option<&Path>) -> Result<Self> {
        Self::open(default_cache_path(override_dir)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, FileEntry>) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer(tmp.as_file_mut(), entries)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl GeocodeCache for JsonFileGeocodeCache {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > unix_now())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match load_live_entries(&self.path) {
            Ok(on_disk) => *entries = on_disk,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "rewriting unreadable geocode cache");
            }
        }
        entries.insert(
            key.to_string(),
            FileEntry {
                value: value.to_string(),
                expires_at: unix_now().saturating_add(ttl.as_secs()),
            },
        );
        self.persist(&entries)
    }
}

/// Location of the geocode cache file.
///
/// `override_dir` (normally `PATHFINDER_CACHE_DIR`) wins over the platform
/// cache directory.
pub fn default_cache_path(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.join(CACHE_FILE_NAME));
    }

    let dirs = BaseDirs::new().ok_or(Error::CacheDirsUnavailable)?;
    Ok(dirs.cache_dir().join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

/// Entries in the file at `path` that have not expired. A missing file is empty.
fn load_live_entries(path: &Path) -> Result<HashMap<String, FileEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(path)?;
    let mut entries: HashMap<String, FileEntry> =
        serde_json::from_str(&raw).map_err(|err| Error::CacheLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let now = unix_now();
    entries.retain(|_, entry| entry.expires_at > now);
    Ok(entries)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_normalised() {
        assert_eq!(cache_key("  Austin, TX "), "geocode:austin, tx");
        assert_eq!(cache_key("AUSTIN, tx"), cache_key("austin, TX"));
    }

    #[test]
    fn memory_cache_round_trips_and_overwrites() {
        let cache = MemoryGeocodeCache::new();
        assert!(cache.get("k").is_none());
        cache.set("k", "[1.0,2.0]", GEOCODE_TTL).unwrap();
        cache.set("k", "[3.0,4.0]", GEOCODE_TTL).unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("[3.0,4.0]"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn memory_cache_expires_entries() {
        let cache = MemoryGeocodeCache::new();
        cache.set("k", "v", Duration::ZERO).unwrap();
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_cache_path(Some(dir.path())).unwrap();

        let cache = JsonFileGeocodeCache::open(&path).unwrap();
        assert_eq!(cache.path(), path.as_path());
        cache.set("geocode:austin", "[-97.74,30.27]", GEOCODE_TTL).unwrap();
        cache.set("geocode:gone", "[0.0,0.0]", Duration::ZERO).unwrap();
        drop(cache);

        let reopened = JsonFileGeocodeCache::open(&path).unwrap();
        assert_eq!(
            reopened.get("geocode:austin").as_deref(),
            Some("[-97.74,30.27]")
        );
        assert!(reopened.get("geocode:gone").is_none());
    }

    #[test]
    fn writers_sharing_a_file_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let first = JsonFileGeocodeCache::open(&path).unwrap();
        let second = JsonFileGeocodeCache::open(&path).unwrap();

        first.set("geocode:austin", "[-97.74,30.27]", GEOCODE_TTL).unwrap();
        second.set("geocode:waco", "[-97.15,31.55]", GEOCODE_TTL).unwrap();
        // Same key from both: the later write wins.
        first.set("geocode:temple", "[0.0,0.0]", GEOCODE_TTL).unwrap();
        second.set("geocode:temple", "[-97.34,31.1]", GEOCODE_TTL).unwrap();

        assert_eq!(second.get("geocode:austin").as_deref(), Some("[-97.74,30.27]"));
        let reopened = JsonFileGeocodeCache::open(&path).unwrap();
        assert_eq!(reopened.get("geocode:austin").as_deref(), Some("[-97.74,30.27]"));
        assert_eq!(reopened.get("geocode:waco").as_deref(), Some("[-97.15,31.55]"));
        assert_eq!(reopened.get("geocode:temple").as_deref(), Some("[-97.34,31.1]"));
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        let err = JsonFileGeocodeCache::open(&path).unwrap_err();
        assert!(matches!(err, Error::CacheLoad { .. }));
    }
}
