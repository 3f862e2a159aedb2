//! Read-through cache for raw source documents
//!
//! Entries are keyed by (team, season, document kind) and timestamped at
//! fetch time. An entry older than the configured TTL is a miss regardless
//! of payload validity; writes are idempotent overwrites, so concurrent
//! sessions can share a store without coordination.

use crate::error::{Error, Result};
use crate::types::{Season, TeamId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Kind of raw source document held in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    /// Per-match history for a competition season
    Matches,
    /// Team metadata and squad list
    Team,
}

impl DocKind {
    fn as_str(&self) -> &'static str {
        match self {
            DocKind::Matches => "matches",
            DocKind::Team => "team",
        }
    }
}

/// Cache key: one raw document per (team, season, kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Team the document belongs to
    pub team: TeamId,
    /// Season the document covers
    pub season: Season,
    /// Document kind
    pub doc: DocKind,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(team: TeamId, season: Season, doc: DocKind) -> Self {
        Self { team, season, doc }
    }
}

/// Timestamped cache entry holding a raw source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Raw JSON payload as returned by the source
    pub payload: serde_json::Value,
    /// Time the payload was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry fetched now
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            payload,
            fetched_at: Utc::now(),
        }
    }

    /// Create an entry with an explicit fetch timestamp
    pub fn fetched_at(payload: serde_json::Value, fetched_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            fetched_at,
        }
    }

    /// Whether the entry is still within its TTL at `now`
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age.num_seconds() >= 0 && age.to_std().map(|a| a <= ttl).unwrap_or(false)
    }
}

/// Pluggable backing store for cached source documents
pub trait CacheStore: Send + Sync {
    /// Look up an entry; freshness is the caller's concern
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    /// Store an entry, overwriting any previous one for the key
    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<()>;
}

/// In-memory cache store backed by a concurrent map
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl MemoryCache {
    /// Create an empty in-memory cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<()> {
        self.entries.insert(*key, entry);
        Ok(())
    }
}

/// Disk-resident cache store: one JSON file per key
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Create a file cache rooted at `dir`, creating it if missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::cache(format!("cannot create cache dir {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!(
            "team_{}_{}_season_{}.json",
            key.team,
            key.doc.as_str(),
            key.season.start_year()
        ))
    }
}

impl CacheStore for JsonFileCache {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::cache(format!("cannot read {}: {e}", path.display())))?;
        let entry = serde_json::from_str(&raw)
            .map_err(|e| Error::cache(format!("corrupt cache file {}: {e}", path.display())))?;
        Ok(Some(entry))
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<()> {
        let path = self.path_for(key);
        let raw = serde_json::to_string_pretty(&entry)?;
        std::fs::write(&path, raw)
            .map_err(|e| Error::cache(format!("cannot write {}: {e}", path.display())))?;
        Ok(())
    }
}
