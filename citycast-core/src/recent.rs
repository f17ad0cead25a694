//! Most-recently-searched cities, persisted through a small key-value seam.

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::Mutex,
};
use tracing::{debug, warn};

/// Storage key holding the JSON-encoded list.
pub const RECENT_CITIES_KEY: &str = "recentCities";

pub const MAX_RECENT_CITIES: usize = 5;

/// Synchronous string storage keyed by name.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key, `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries =
            self.entries.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Trimmed, lowercased form used for comparison and storage.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Bounded list of city names, newest first, written through on every change.
#[derive(Debug)]
pub struct RecentCitiesStore<S: KeyValueStore> {
    backend: S,
    cities: Vec<String>,
}

impl<S: KeyValueStore> RecentCitiesStore<S> {
    /// Read the persisted list. Missing, unreadable or malformed data yields
    /// an empty list.
    pub fn load(backend: S) -> Self {
        let cities = match backend.get(RECENT_CITIES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(mut cities) => {
                    cities.truncate(MAX_RECENT_CITIES);
                    cities
                }
                Err(err) => {
                    warn!(error = %err, "Discarding malformed recent-city list");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "Could not read recent-city list");
                Vec::new()
            }
        };

        debug!(count = cities.len(), "Loaded recent cities");
        Self { backend, cities }
    }

    /// Insert `city` at the front unless it is already listed. Returns whether
    /// the list changed.
    pub fn add(&mut self, city: &str) -> Result<bool> {
        let city = normalize_city(city);
        if city.is_empty() || self.cities.contains(&city) {
            return Ok(false);
        }

        self.cities.insert(0, city);
        self.cities.truncate(MAX_RECENT_CITIES);
        self.save()?;
        Ok(true)
    }

    pub fn list(&self) -> &[String] {
        &self.cities
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn save(&self) -> Result<()> {
        let encoded =
            serde_json::to_string(&self.cities).context("Failed to encode recent cities")?;
        self.backend.set(RECENT_CITIES_KEY, &encoded)
    }
}
