//! In-memory store implementation for dev/tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use mercado_core::TenantId;

use crate::kv::{Page, RangeQuery, StoreError, TenantKvStore, Versioned};

/// In-memory tenant-isolated store.
///
/// A `BTreeMap` per `(tenant, partition)` keeps records ordered by sort key,
/// which is what the range query contract requires.
#[derive(Debug)]
pub struct InMemoryKvStore<V> {
    inner: RwLock<HashMap<(TenantId, String), BTreeMap<String, Versioned<V>>>>,
}

impl<V> InMemoryKvStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for InMemoryKvStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

impl<V> TenantKvStore<V> for InMemoryKvStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Versioned<V>>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .get(&(tenant_id.clone(), partition.to_string()))
            .and_then(|p| p.get(sort))
            .cloned())
    }

    fn insert(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let part = map
            .entry((tenant_id.clone(), partition.to_string()))
            .or_default();
        if part.contains_key(sort) {
            return Err(StoreError::AlreadyExists);
        }
        part.insert(sort.to_string(), Versioned { value, version: 1 });
        Ok(())
    }

    fn update(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let record = map
            .get_mut(&(tenant_id.clone(), partition.to_string()))
            .and_then(|p| p.get_mut(sort))
            .ok_or(StoreError::NotFound)?;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found: record.version,
            });
        }

        record.value = value;
        record.version += 1;
        Ok(record.version)
    }

    fn query(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        query: &RangeQuery,
    ) -> Result<Page<V>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let Some(part) = map.get(&(tenant_id.clone(), partition.to_string())) else {
            return Ok(Page {
                items: Vec::new(),
                next_cursor: None,
            });
        };

        let after = query.start_after.as_deref();
        let in_range = |key: &str| match (query.descending, after) {
            (true, Some(cursor)) => key < cursor,
            (false, Some(cursor)) => key > cursor,
            (_, None) => true,
        };

        let mut selected: Vec<(&String, &Versioned<V>)> = if query.descending {
            part.iter()
                .rev()
                .filter(|(k, _)| in_range(k.as_str()))
                .take(query.limit + 1)
                .collect()
        } else {
            part.iter()
                .filter(|(k, _)| in_range(k.as_str()))
                .take(query.limit + 1)
                .collect()
        };

        let next_cursor = if selected.len() > query.limit {
            selected.truncate(query.limit);
            selected.last().map(|(k, _)| (*k).clone())
        } else {
            None
        };

        Ok(Page {
            items: selected.into_iter().map(|(_, v)| v.clone()).collect(),
            next_cursor,
        })
    }
}
