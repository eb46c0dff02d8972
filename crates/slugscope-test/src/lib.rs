//! Shared fixtures for slugscope integration tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use slugscope_core::constants::STORE_ID;
use slugscope_core::types::{EntityId, RecordId, ScopeId};
use slugscope_service::ServiceResult;
use slugscope_service::entity::DataObject;
use slugscope_service::index::{MemoryPathIndex, PathIndex};
use slugscope_service::path::{Criterion, PathCriteria, PathField, PathRecord, PathValue, ProjectedPath};
use slugscope_service::scope::{StaticScopeRegistry, StoreScope};

pub const PRODUCT: &str = "catalog_product";
pub const CATEGORY: &str = "catalog_category";
pub const URL_KEY: &str = "url_key";
pub const HTML: &str = ".html";

/// Two websites: `base` with scopes 1 and 2, `outlet` with scope 3 and the
/// disabled scope 4.
#[must_use]
pub fn two_websites() -> StaticScopeRegistry {
    StaticScopeRegistry::new()
        .with_website("base", &[ScopeId(1), ScopeId(2)])
        .with_website("outlet", &[ScopeId(3)])
        .with_store(StoreScope {
            id: ScopeId(4),
            website: Some("outlet".to_string()),
            enabled: false,
        })
}

/// Entity carrying `url_key`, optionally saved and submitted under a scope.
#[must_use]
pub fn entity(id: Option<u64>, store: Option<u32>, url_key: &str) -> DataObject {
    let object = DataObject::new(id.map(EntityId)).with(URL_KEY, url_key);
    match store {
        Some(store) => object.with(STORE_ID, store),
        None => object,
    }
}

#[must_use]
pub fn path(store: u32, entity: u64, entity_type: &str, request_path: &str) -> ProjectedPath {
    ProjectedPath {
        store_id: ScopeId(store),
        entity_id: Some(EntityId(entity)),
        entity_type: entity_type.to_string(),
        request_path: request_path.to_string(),
    }
}

/// Memory index that remembers every query it served.
#[derive(Debug, Default)]
pub struct RecordingIndex {
    pub inner: MemoryPathIndex,
    exact: Mutex<Vec<PathCriteria>>,
    broad: Mutex<Vec<PathCriteria>>,
}

impl RecordingIndex {
    #[must_use]
    pub fn new(inner: MemoryPathIndex) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn exact_queries(&self) -> Vec<PathCriteria> {
        self.exact.lock().map(|q| q.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn broad_queries(&self) -> Vec<PathCriteria> {
        self.broad.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Scope ids named by the most recent broad query.
    #[must_use]
    pub fn last_checked_scopes(&self) -> BTreeSet<ScopeId> {
        let Some(last) = self.broad_queries().pop() else {
            return BTreeSet::new();
        };
        match last.get(PathField::StoreId) {
            Some(Criterion::AnyOf(values)) => values.iter().filter_map(scope_from_value).collect(),
            Some(Criterion::Eq(value)) => scope_from_value(value).into_iter().collect(),
            None => BTreeSet::new(),
        }
    }
}

fn scope_from_value(value: &PathValue) -> Option<ScopeId> {
    match value {
        PathValue::Int(n) => u32::try_from(*n).ok().map(ScopeId),
        PathValue::Text(_) => None,
    }
}

impl PathIndex for RecordingIndex {
    fn find_one(&self, criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>> {
        if let Ok(mut queries) = self.exact.lock() {
            queries.push(criteria.clone());
        }
        self.inner.find_one(criteria)
    }

    fn find_all(&self, criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>> {
        if let Ok(mut queries) = self.broad.lock() {
            queries.push(criteria.clone());
        }
        self.inner.find_all(criteria)
    }
}

/// Index in which every request path belongs to another entity.
#[derive(Debug, Default)]
pub struct CollidingIndex;

impl PathIndex for CollidingIndex {
    fn find_one(&self, _criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>> {
        Ok(None)
    }

    fn find_all(&self, _criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>> {
        Ok(vec![PathRecord {
            id: RecordId(u64::MAX),
            path: path(1, u64::MAX, PRODUCT, "taken"),
        }])
    }
}
