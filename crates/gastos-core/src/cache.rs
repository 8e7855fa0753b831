//! Query cache keyed by typed query identities
//!
//! Entries hold the raw backend JSON. Mutations invalidate whole families
//! (every cached listing page, every total) or single keys; the lock is
//! never held across an `.await`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::filter::{DespesaFiltro, PageRequest};

/// Identity of a cached backend query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Despesas { filtro: DespesaFiltro, page: PageRequest },
    Despesa(String),
    CustoTotal(DespesaFiltro),
    /// Empty term means the full list
    Origens(String),
    Pagadores(String),
}

impl QueryKey {
    /// Family name used for bulk invalidation
    pub fn family(&self) -> &'static str {
        match self {
            QueryKey::Despesas { .. } => "despesas",
            QueryKey::Despesa(_) => "despesa",
            QueryKey::CustoTotal(_) => "custo-total",
            QueryKey::Origens(_) => "origens",
            QueryKey::Pagadores(_) => "pagadores",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Bumped by every invalidation touching the family
    generations: HashMap<&'static str, u64>,
    /// Bumped by `clear`
    epoch: u64,
}

impl CacheState {
    fn generation(&self, family: &str) -> u64 {
        self.epoch + self.generations.get(family).copied().unwrap_or(0)
    }

    fn bump(&mut self, family: &'static str) {
        *self.generations.entry(family).or_insert(0) += 1;
    }
}

/// TTL cache of backend responses
///
/// A fetch records the family generation before it awaits the backend and
/// stores its result only if no invalidation happened meanwhile, so a slow
/// response can never resurrect data a mutation just dropped.
#[derive(Debug)]
pub struct QueryCache {
    state: RwLock<CacheState>,
    ttl: Duration,
}

impl QueryCache {
    /// A zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            ttl,
        }
    }

    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // A poisoned lock only means a panic elsewhere; the map itself is still usable.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Fresh value for a key, if any
    pub fn get(&self, key: &QueryKey) -> Option<serde_json::Value> {
        if !self.is_enabled() {
            return None;
        }
        let state = self.read();
        state
            .entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Current generation of the key's family, to pass to `insert_if_generation`
    pub fn generation(&self, key: &QueryKey) -> u64 {
        self.read().generation(key.family())
    }

    /// Store a value unconditionally
    pub fn insert(&self, key: QueryKey, value: serde_json::Value) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.write();
        Self::store(&mut state, self.ttl, key, value);
    }

    /// Store a value fetched under `generation`; returns false and drops the
    /// value when the family was invalidated since
    pub fn insert_if_generation(&self, key: QueryKey, generation: u64, value: serde_json::Value) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut state = self.write();
        if state.generation(key.family()) != generation {
            return false;
        }
        Self::store(&mut state, self.ttl, key, value);
        true
    }

    fn store(state: &mut CacheState, ttl: Duration, key: QueryKey, value: serde_json::Value) {
        state.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry of a family, returning how many were removed
    pub fn invalidate_family(&self, family: &'static str) -> usize {
        let mut state = self.write();
        state.bump(family);
        let before = state.entries.len();
        state.entries.retain(|key, _| key.family() != family);
        let removed = before - state.entries.len();
        log::debug!("Cache: invalidated {} entries of family '{}'", removed, family);
        removed
    }

    pub fn invalidate_key(&self, key: &QueryKey) -> bool {
        let mut state = self.write();
        state.bump(key.family());
        state.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.epoch += 1;
        state.entries.clear();
    }

    /// Number of stored entries, expired ones included until the next insert
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing_key(page: u32) -> QueryKey {
        QueryKey::Despesas {
            filtro: DespesaFiltro::default(),
            page: PageRequest::new(page, 11),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = QueryCache::from_secs(30);
        assert!(cache.get(&listing_key(0)).is_none());

        cache.insert(listing_key(0), json!({"content": []}));
        assert_eq!(cache.get(&listing_key(0)), Some(json!({"content": []})));
        assert!(cache.get(&listing_key(1)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_filters_are_part_of_the_key() {
        let cache = QueryCache::from_secs(30);
        let pago = DespesaFiltro {
            descricao: Some("luz".to_string()),
            ..Default::default()
        };
        cache.insert(QueryKey::CustoTotal(pago.clone()), json!(10));
        assert!(cache.get(&QueryKey::CustoTotal(DespesaFiltro::default())).is_none());
        assert_eq!(cache.get(&QueryKey::CustoTotal(pago)), Some(json!(10)));
    }

    #[test]
    fn test_entries_expire() {
        let cache = QueryCache::new(Duration::from_millis(20));
        cache.insert(QueryKey::Origens(String::new()), json!([]));
        assert!(cache.get(&QueryKey::Origens(String::new())).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&QueryKey::Origens(String::new())).is_none());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = QueryCache::from_secs(0);
        cache.insert(QueryKey::Pagadores(String::new()), json!([]));
        assert!(cache.is_empty());
        assert!(cache.get(&QueryKey::Pagadores(String::new())).is_none());
    }

    #[test]
    fn test_invalidate_family_keeps_other_families() {
        let cache = QueryCache::from_secs(30);
        cache.insert(listing_key(0), json!(1));
        cache.insert(listing_key(1), json!(2));
        cache.insert(QueryKey::CustoTotal(DespesaFiltro::default()), json!(3));
        cache.insert(QueryKey::Despesa("d-1".to_string()), json!(4));

        assert_eq!(cache.invalidate_family("despesas"), 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&QueryKey::Despesa("d-1".to_string())).is_some());

        assert!(cache.invalidate_key(&QueryKey::Despesa("d-1".to_string())));
        assert!(!cache.invalidate_key(&QueryKey::Despesa("d-1".to_string())));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_family_names() {
        assert_eq!(listing_key(0).family(), "despesas");
        assert_eq!(QueryKey::Despesa("x".into()).family(), "despesa");
        assert_eq!(QueryKey::CustoTotal(DespesaFiltro::default()).family(), "custo-total");
        assert_eq!(QueryKey::Origens("a".into()).family(), "origens");
        assert_eq!(QueryKey::Pagadores("a".into()).family(), "pagadores");
    }

    #[test]
    fn test_insert_after_invalidation_is_dropped() {
        let cache = QueryCache::from_secs(30);
        let generation = cache.generation(&listing_key(0));

        cache.invalidate_family("despesas");
        assert!(!cache.insert_if_generation(listing_key(0), generation, json!("stale")));
        assert!(cache.get(&listing_key(0)).is_none());

        let generation = cache.generation(&listing_key(0));
        cache.invalidate_family("origens");
        assert!(cache.insert_if_generation(listing_key(0), generation, json!("fresh")));
        assert_eq!(cache.get(&listing_key(0)), Some(json!("fresh")));

        let generation = cache.generation(&QueryKey::Despesa("d-1".into()));
        cache.invalidate_key(&QueryKey::Despesa("d-1".into()));
        assert!(!cache.insert_if_generation(QueryKey::Despesa("d-1".into()), generation, json!(1)));

        let generation = cache.generation(&QueryKey::Origens(String::new()));
        cache.clear();
        assert!(!cache.insert_if_generation(QueryKey::Origens(String::new()), generation, json!([])));
    }
}
