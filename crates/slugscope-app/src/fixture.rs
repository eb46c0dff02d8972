//! JSON fixture describing a store topology, existing paths and requests.
//!
//! ```json
//! {
//!   "stores": [{ "id": 1, "website": "base" }],
//!   "config": [{ "path": "catalog/seo/product_url_suffix", "scope_id": 1, "value": ".html" }],
//!   "paths": [{ "url_rewrite_id": 1, "store_id": 1, "entity_id": 7,
//!               "entity_type": "catalog_product", "request_path": "shoes.html" }],
//!   "requests": [{
//!     "attribute": { "entity_type": "catalog_product", "code": "url_key", "scope": "store" },
//!     "entity": { "id": 42, "data": { "store_id": 1, "url_key": "shoes" } },
//!     "persist": true
//!   }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use slugscope_core::constants::SCOPE_TYPE_STORE;
use slugscope_core::types::ScopeId;
use slugscope_core::validation::{FieldValidationError, RequiredFields, ValidatorOutcome};
use slugscope_service::entity::{Attribute, AttributeDescriptor, DataObject};
use slugscope_service::index::MemoryPathIndex;
use slugscope_service::path::PathRecord;
use slugscope_service::scope::{MapConfigLookup, StaticScopeRegistry, StoreScope};

use crate::error::AppResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntry {
    pub path: String,
    #[serde(default = "store_scope_type")]
    pub scope_type: String,
    pub scope_id: ScopeId,
    pub value: String,
}

fn store_scope_type() -> String {
    SCOPE_TYPE_STORE.to_string()
}

/// One value to resolve.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub attribute: Attribute,
    pub entity: DataObject,
    /// Read the scope id from the extensible scope field.
    #[serde(default)]
    pub extensible: bool,
    /// Record the accepted paths so later requests see them.
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub stores: Vec<StoreScope>,
    #[serde(default)]
    pub config: Vec<ConfigEntry>,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
    #[serde(default)]
    pub requests: Vec<Request>,
}

impl Fixture {
    /// ## Summary
    /// Reads and validates a fixture file.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// ## Summary
    /// Parses and validates a fixture document.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid JSON or fails validation.
    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let fixture: Self = serde_json::from_str(raw)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// ## Summary
    /// Checks that every request carries a value for its attribute.
    ///
    /// ## Errors
    /// Returns a `FieldValidationError` listing each incomplete request.
    pub fn validate(&self) -> Result<(), FieldValidationError> {
        let outcomes: Vec<RequiredFields> = self
            .requests
            .iter()
            .map(|request| {
                RequiredFields::check(&[request.attribute.attribute_code()], &request.entity.data)
            })
            .collect();

        if outcomes.iter().all(RequiredFields::is_valid) {
            Ok(())
        } else {
            Err(FieldValidationError::from_outcomes("requests", &outcomes))
        }
    }

    #[must_use]
    pub fn registry(&self) -> StaticScopeRegistry {
        StaticScopeRegistry::from_stores(self.stores.iter().cloned())
    }

    #[must_use]
    pub fn config_lookup(&self) -> MapConfigLookup {
        self.config.iter().fold(MapConfigLookup::new(), |lookup, entry| {
            lookup.with_value(&entry.path, &entry.scope_type, entry.scope_id, &entry.value)
        })
    }

    #[must_use]
    pub fn index(&self) -> MemoryPathIndex {
        MemoryPathIndex::from_records(self.paths.clone())
    }
}
