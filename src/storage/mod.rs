//! Persistence layer.
//!
//! Keeps the last fetched item list, its timestamp and the favourite
//! brands as three JSON files in a data directory. Loads are best
//! effort: a missing or unreadable file is logged and treated as empty.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::state::FavoriteBrands;
use crate::types::Item;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "data";

const ITEMS_FILE: &str = "discountFinder_items.json";
const TIMESTAMP_FILE: &str = "discountFinder_timestamp.json";
const FAVORITES_FILE: &str = "discountFinder_favoriteBrands.json";

/// Everything restored at startup.
#[derive(Debug, Clone, Default)]
pub struct CachedData {
    pub items: Vec<Item>,
    pub timestamp: Option<String>,
    pub favorites: FavoriteBrands,
}

/// File-backed cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    // -- Writes ----------------------------------------------------------

    /// Save the item list and its timestamp.
    pub fn save_items(&self, items: &[Item], timestamp: &str) -> Result<()> {
        write_json(&self.path(ITEMS_FILE), &items)?;
        write_json(&self.path(TIMESTAMP_FILE), &timestamp)?;
        debug!(dir = %self.dir.display(), count = items.len(), "Items cached");
        Ok(())
    }

    pub fn save_favorites(&self, favorites: &FavoriteBrands) -> Result<()> {
        write_json(&self.path(FAVORITES_FILE), favorites)?;
        debug!(dir = %self.dir.display(), count = favorites.len(), "Favourites saved");
        Ok(())
    }

    // -- Reads -----------------------------------------------------------

    pub fn load_items(&self) -> Result<Option<Vec<Item>>> {
        read_json(&self.path(ITEMS_FILE))
    }

    pub fn load_timestamp(&self) -> Result<Option<String>> {
        read_json(&self.path(TIMESTAMP_FILE))
    }

    pub fn load_favorites(&self) -> Result<Option<FavoriteBrands>> {
        // Re-run through from_vec so a hand-edited file cannot smuggle in duplicates.
        Ok(read_json::<Vec<String>>(&self.path(FAVORITES_FILE))?.map(FavoriteBrands::from_vec))
    }

    /// Load all three files, substituting defaults for anything that
    /// is missing or fails to parse.
    pub fn load_all(&self) -> CachedData {
        let items = self.load_items().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load cached items");
            None
        });
        let timestamp = self.load_timestamp().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load cache timestamp");
            None
        });
        let favorites = self.load_favorites().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load favourite brands");
            None
        });

        let data = CachedData {
            items: items.unwrap_or_default(),
            timestamp,
            favorites: favorites.unwrap_or_default(),
        };
        info!(
            dir = %self.dir.display(),
            items = data.items.len(),
            favorites = data.favorites.len(),
            "Cache loaded from disk"
        );
        data
    }

    /// Delete every cache file (for testing or reset).
    pub fn clear(&self) -> Result<()> {
        for file in [ITEMS_FILE, TIMESTAMP_FILE, FAVORITES_FILE] {
            let path = self.path(file);
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
            }
        }
        Ok(())
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string(value).context("Failed to serialise cache entry")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "No cache file");
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
