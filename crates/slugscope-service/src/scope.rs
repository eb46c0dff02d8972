//! Store scope and configuration collaborators.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use slugscope_core::types::ScopeId;

use crate::error::{ServiceError, ServiceResult};

/// Knows which store scopes exist and how they group into websites.
pub trait ScopeRegistry {
    /// ## Summary
    /// Lists every store scope id, excluding the default scope.
    ///
    /// ## Errors
    /// Returns an error if the scopes cannot be loaded.
    fn list_scope_ids(&self, include_disabled: bool) -> ServiceResult<Vec<ScopeId>>;

    /// ## Summary
    /// Lists the scope ids of the website that contains `scope_id`.
    ///
    /// ## Errors
    /// Returns `ServiceError::ScopeNotFound` for an unknown scope and
    /// `ServiceError::WebsiteNotFound` if the scope has no website.
    fn website_scope_ids(&self, scope_id: ScopeId) -> ServiceResult<Vec<ScopeId>>;

    /// ## Summary
    /// Confirms that `scope_id` exists, enabled or not.
    ///
    /// ## Errors
    /// Returns `ServiceError::ScopeNotFound` for an unknown scope.
    fn require_scope(&self, scope_id: ScopeId) -> ServiceResult<ScopeId> {
        if self.list_scope_ids(true)?.contains(&scope_id) {
            Ok(scope_id)
        } else {
            Err(ServiceError::ScopeNotFound(scope_id))
        }
    }
}

impl<T: ScopeRegistry + ?Sized> ScopeRegistry for &T {
    fn list_scope_ids(&self, include_disabled: bool) -> ServiceResult<Vec<ScopeId>> {
        (**self).list_scope_ids(include_disabled)
    }

    fn website_scope_ids(&self, scope_id: ScopeId) -> ServiceResult<Vec<ScopeId>> {
        (**self).website_scope_ids(scope_id)
    }
}

/// Reads scoped configuration values.
pub trait ConfigLookup {
    /// ## Summary
    /// Returns the value stored under `path` for the given scope.
    ///
    /// ## Errors
    /// Returns an error if the configuration source cannot be read.
    fn value(&self, path: &str, scope_type: &str, scope_id: ScopeId)
    -> ServiceResult<Option<String>>;
}

impl<T: ConfigLookup + ?Sized> ConfigLookup for &T {
    fn value(
        &self,
        path: &str,
        scope_type: &str,
        scope_id: ScopeId,
    ) -> ServiceResult<Option<String>> {
        (**self).value(path, scope_type, scope_id)
    }
}

/// One store scope of a static registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreScope {
    pub id: ScopeId,
    /// Website code; a store without one cannot be fanned out by website.
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

/// Scope registry built from a fixed list of stores.
#[derive(Debug, Clone, Default)]
pub struct StaticScopeRegistry {
    stores: BTreeMap<ScopeId, StoreScope>,
}

impl StaticScopeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_stores(stores: impl IntoIterator<Item = StoreScope>) -> Self {
        Self {
            stores: stores.into_iter().map(|store| (store.id, store)).collect(),
        }
    }

    /// Adds enabled stores under a website.
    #[must_use]
    pub fn with_website(mut self, code: &str, scope_ids: &[ScopeId]) -> Self {
        for id in scope_ids {
            self.stores.insert(
                *id,
                StoreScope {
                    id: *id,
                    website: Some(code.to_string()),
                    enabled: true,
                },
            );
        }
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreScope) -> Self {
        self.stores.insert(store.id, store);
        self
    }
}

impl ScopeRegistry for StaticScopeRegistry {
    fn list_scope_ids(&self, include_disabled: bool) -> ServiceResult<Vec<ScopeId>> {
        Ok(self
            .stores
            .values()
            .filter(|store| !store.id.is_default())
            .filter(|store| include_disabled || store.enabled)
            .map(|store| store.id)
            .collect())
    }

    fn website_scope_ids(&self, scope_id: ScopeId) -> ServiceResult<Vec<ScopeId>> {
        let store = self
            .stores
            .get(&scope_id)
            .ok_or(ServiceError::ScopeNotFound(scope_id))?;
        let website = store
            .website
            .as_deref()
            .ok_or(ServiceError::WebsiteNotFound(scope_id))?;

        Ok(self
            .stores
            .values()
            .filter(|s| s.website.as_deref() == Some(website))
            .map(|s| s.id)
            .collect())
    }
}

/// Config lookup backed by a map, counting every read.
#[derive(Debug, Default)]
pub struct MapConfigLookup {
    values: HashMap<(String, String, ScopeId), String>,
    reads: AtomicUsize,
}

impl MapConfigLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(
        mut self,
        path: &str,
        scope_type: &str,
        scope_id: ScopeId,
        value: &str,
    ) -> Self {
        self.values.insert(
            (path.to_string(), scope_type.to_string(), scope_id),
            value.to_string(),
        );
        self
    }

    /// Number of lookups served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl ConfigLookup for MapConfigLookup {
    fn value(
        &self,
        path: &str,
        scope_type: &str,
        scope_id: ScopeId,
    ) -> ServiceResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .values
            .get(&(path.to_string(), scope_type.to_string(), scope_id))
            .cloned())
    }
}
