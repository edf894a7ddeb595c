//! Local persistence for anonymous sessions.
//!
//! This module stores the anonymous cart and favorites as JSON files under a
//! data directory, one file per key — the durable key-value store a visitor
//! has before signing in. Reads tolerate missing or corrupt payloads by
//! degrading to an empty collection; writes are fire-and-forget from the
//! caller's perspective. There is no transactional guarantee across keys.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key under which the anonymous cart is persisted.
pub const ANONYMOUS_CART_KEY: &str = "anonymous_cart";
/// Key under which favorites are persisted.
pub const FAVORITES_KEY: &str = "favorites";

/// Errors raised by the local store.
///
/// These never cross the `load`/`save` contract; they are logged and
/// degraded. They surface only from `open`, where a missing data directory
/// that cannot be created is unrecoverable.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The data directory could not be created.
    #[error("cannot create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable key-value store backed by JSON files.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CreateDir` if the directory cannot be
    /// created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PersistenceError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Load the collection stored under `key`.
    ///
    /// A missing file yields the empty collection. A corrupt payload also
    /// yields the empty collection, with a warning logged; it never raises.
    #[must_use]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let path = self.key_path(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted collection, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt persisted collection, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist `items` under `key`, replacing any previous value.
    ///
    /// Fire-and-forget: failures are logged, never returned.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) {
        let path = self.key_path(key);
        let payload = match serde_json::to_string(items) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize collection, not persisted");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, payload) {
            tracing::error!(key, error = %e, "failed to write persisted collection");
        }
    }

    /// Remove the value stored under `key`, if any.
    pub fn clear(&self, key: &str) {
        let path = self.key_path(key);
        if let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(key, error = %e, "failed to clear persisted collection");
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// The directory this store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CartItem;
    use crate::testutil::product;
    use souq_core::CartLineId;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let (_dir, store) = temp_store();
        let items: Vec<CartItem> = store.load(ANONYMOUS_CART_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = temp_store();
        let items = vec![
            CartItem {
                id: CartLineId::synthetic(product(1, 10).id, 1),
                product: product(1, 10),
                quantity: 2,
            },
            CartItem {
                id: CartLineId::synthetic(product(2, 15).id, 2),
                product: product(2, 15),
                quantity: 1,
            },
        ];
        store.save(ANONYMOUS_CART_KEY, &items);
        let loaded: Vec<CartItem> = store.load(ANONYMOUS_CART_KEY);
        assert_eq!(loaded, items);
    }

    #[test]
    fn test_corrupt_payload_degrades_to_empty() {
        let (_dir, store) = temp_store();
        std::fs::write(store.dir().join("favorites.json"), "{not json[").unwrap();
        let items: Vec<CartItem> = store.load(FAVORITES_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_wrong_shape_degrades_to_empty() {
        let (_dir, store) = temp_store();
        std::fs::write(store.dir().join("favorites.json"), r#"{"a": 1}"#).unwrap();
        let items: Vec<CartItem> = store.load(FAVORITES_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_clear_removes_key() {
        let (_dir, store) = temp_store();
        store.save(FAVORITES_KEY, &[product(1, 10)]);
        store.clear(FAVORITES_KEY);
        let items: Vec<crate::models::Product> = store.load(FAVORITES_KEY);
        assert!(items.is_empty());
        // Clearing an absent key is a no-op
        store.clear(FAVORITES_KEY);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_dir, store) = temp_store();
        store.save(FAVORITES_KEY, &[product(1, 10)]);
        store.save(ANONYMOUS_CART_KEY, &Vec::<CartItem>::new());
        let favorites: Vec<crate::models::Product> = store.load(FAVORITES_KEY);
        assert_eq!(favorites.len(), 1);
    }
}
