//! Bounded most-recently-used list of favorite currency pairs.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use converter_types::{FavoritePair, KeyValueStore, StoreError};
use serde_json::Value;
use tracing::{debug, warn};

/// Favorites ordered most recent first, at most `capacity` long, no duplicates.
///
/// Every mutation is written through to the store as a JSON array of pair ids.
pub struct FavoritesStore<S: KeyValueStore> {
    store: Arc<S>,
    key: String,
    capacity: usize,
    pairs: RwLock<VecDeque<FavoritePair>>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            store,
            key: key.into(),
            capacity: capacity.max(1),
            pairs: RwLock::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current favorites, most recent first.
    pub fn list(&self) -> Vec<FavoritePair> {
        self.pairs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    pub fn contains(&self, pair: &FavoritePair) -> bool {
        self.pairs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(pair)
    }

    /// Adds `pair` at the front, or removes it if it is already a favorite.
    ///
    /// Returns whether the pair is a favorite afterwards. The in-memory list
    /// is updated even if persisting fails.
    pub async fn toggle(&self, pair: FavoritePair) -> Result<bool, StoreError> {
        let (added, snapshot) = {
            let mut pairs = self.pairs.write().unwrap_or_else(PoisonError::into_inner);
            let added = match pairs.iter().position(|p| *p == pair) {
                Some(index) => {
                    pairs.remove(index);
                    false
                }
                None => {
                    pairs.push_front(pair);
                    pairs.truncate(self.capacity);
                    true
                }
            };
            (added, pairs.iter().copied().collect::<Vec<_>>())
        };

        debug!(pair = %pair, added, "Toggled favorite");
        self.save(&snapshot).await?;
        Ok(added)
    }

    /// Moves an existing favorite to the front. Returns false if `pair` is
    /// not a favorite.
    pub async fn touch(&self, pair: FavoritePair) -> Result<bool, StoreError> {
        let snapshot = {
            let mut pairs = self.pairs.write().unwrap_or_else(PoisonError::into_inner);
            match pairs.iter().position(|p| *p == pair) {
                Some(0) => return Ok(true),
                Some(index) => {
                    pairs.remove(index);
                    pairs.push_front(pair);
                }
                None => return Ok(false),
            }
            pairs.iter().copied().collect::<Vec<_>>()
        };

        self.save(&snapshot).await?;
        Ok(true)
    }

    /// Replaces the in-memory list with the persisted one.
    ///
    /// Unknown ids and duplicates are skipped, and the list is cut to
    /// capacity. Anything other than an array is ignored.
    pub async fn load(&self) -> Result<Vec<FavoritePair>, StoreError> {
        let loaded = match self.store.get(&self.key).await? {
            Some(Value::Array(items)) => self.sanitize(items),
            Some(other) => {
                warn!(key = %self.key, value = %other, "Discarding malformed favorites");
                Vec::new()
            }
            None => Vec::new(),
        };

        *self.pairs.write().unwrap_or_else(PoisonError::into_inner) =
            loaded.iter().copied().collect();
        debug!(key = %self.key, count = loaded.len(), "Loaded favorites");
        Ok(loaded)
    }

    fn sanitize(&self, items: Vec<Value>) -> Vec<FavoritePair> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for item in items {
            match serde_json::from_value::<FavoritePair>(item) {
                Ok(pair) if seen.insert(pair) => pairs.push(pair),
                Ok(_) => {}
                Err(e) => warn!(key = %self.key, error = %e, "Skipping invalid favorite"),
            }
            if pairs.len() == self.capacity {
                break;
            }
        }
        pairs
    }

    async fn save(&self, pairs: &[FavoritePair]) -> Result<(), StoreError> {
        let value = serde_json::to_value(pairs)?;
        self.store.set(&self.key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converter_store::MemoryStore;
    use converter_types::CurrencyCode::{self, *};
    use serde_json::json;

    const KEY: &str = "test.favorites";

    fn pair(from: CurrencyCode, to: CurrencyCode) -> FavoritePair {
        FavoritePair::new(from, to)
    }

    fn favorites() -> (Arc<MemoryStore>, FavoritesStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let favorites = FavoritesStore::new(store.clone(), KEY, 5);
        (store, favorites)
    }

    #[tokio::test]
    async fn test_toggle_adds_to_front() {
        let (store, favorites) = favorites();
        assert!(favorites.toggle(pair(USD, EUR)).await.unwrap());
        assert!(favorites.toggle(pair(GBP, JPY)).await.unwrap());

        assert_eq!(favorites.list(), vec![pair(GBP, JPY), pair(USD, EUR)]);
        assert_eq!(
            store.get(KEY).await.unwrap(),
            Some(json!(["GBP-JPY", "USD-EUR"]))
        );
    }

    #[tokio::test]
    async fn test_toggle_existing_removes() {
        let (store, favorites) = favorites();
        favorites.toggle(pair(USD, EUR)).await.unwrap();
        favorites.toggle(pair(GBP, JPY)).await.unwrap();

        assert!(!favorites.toggle(pair(USD, EUR)).await.unwrap());

        assert!(!favorites.contains(&pair(USD, EUR)));
        assert_eq!(store.get(KEY).await.unwrap(), Some(json!(["GBP-JPY"])));
    }

    #[tokio::test]
    async fn test_sixth_favorite_evicts_oldest() {
        let (_, favorites) = favorites();
        let pairs = [
            pair(USD, EUR),
            pair(USD, GBP),
            pair(USD, JPY),
            pair(USD, CHF),
            pair(USD, CAD),
            pair(USD, AUD),
        ];
        for p in pairs {
            favorites.toggle(p).await.unwrap();
        }

        let list = favorites.list();
        assert_eq!(list.len(), 5);
        assert_eq!(list[0], pair(USD, AUD));
        assert!(!favorites.contains(&pair(USD, EUR)));
    }

    #[tokio::test]
    async fn test_touch_moves_to_front() {
        let (_, favorites) = favorites();
        favorites.toggle(pair(USD, EUR)).await.unwrap();
        favorites.toggle(pair(GBP, JPY)).await.unwrap();

        assert!(favorites.touch(pair(USD, EUR)).await.unwrap());
        assert_eq!(favorites.list(), vec![pair(USD, EUR), pair(GBP, JPY)]);

        assert!(!favorites.touch(pair(INR, USD)).await.unwrap());
        assert_eq!(favorites.list().len(), 2);
    }

    #[tokio::test]
    async fn test_load_skips_invalid_and_duplicates() {
        let (store, _) = favorites();
        store
            .set(
                KEY,
                json!(["EUR-GBP", "USD-XYZ", 7, "EUR-GBP", "JPY-USD", "a", "CAD-AUD", "SEK-NOK", "MXN-BRL", "INR-KRW"]),
            )
            .await
            .unwrap();

        let favorites = FavoritesStore::new(store, KEY, 5);
        let loaded = favorites.load().await.unwrap();

        assert_eq!(
            loaded,
            vec![
                pair(EUR, GBP),
                pair(JPY, USD),
                pair(CAD, AUD),
                pair(SEK, NOK),
                pair(MXN, BRL),
            ]
        );
        assert_eq!(favorites.list(), loaded);
    }

    #[tokio::test]
    async fn test_load_ignores_non_array() {
        let (store, favorites) = favorites();
        store.set(KEY, json!({ "oops": true })).await.unwrap();
        assert!(favorites.load().await.unwrap().is_empty());
    }
}
