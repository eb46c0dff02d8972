//! Projected paths, stored path records and the criteria used to query them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use slugscope_core::constants::{ENTITY_ID, ENTITY_TYPE, REQUEST_PATH, STORE_ID};
use slugscope_core::types::{EntityId, RecordId, ScopeId};

/// Queryable fields of a path record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathField {
    StoreId,
    EntityId,
    EntityType,
    RequestPath,
}

impl PathField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoreId => STORE_ID,
            Self::EntityId => ENTITY_ID,
            Self::EntityType => ENTITY_TYPE,
            Self::RequestPath => REQUEST_PATH,
        }
    }
}

impl std::fmt::Display for PathField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value of a path record field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathValue {
    Int(u64),
    Text(String),
}

impl From<ScopeId> for PathValue {
    fn from(id: ScopeId) -> Self {
        Self::Int(u64::from(id.0))
    }
}

impl From<EntityId> for PathValue {
    fn from(id: EntityId) -> Self {
        Self::Int(id.0)
    }
}

impl From<&str> for PathValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PathValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Match rule for one field: equality or set membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Eq(PathValue),
    AnyOf(BTreeSet<PathValue>),
}

impl Criterion {
    #[must_use]
    pub fn matches(&self, value: &PathValue) -> bool {
        match self {
            Self::Eq(expected) => expected == value,
            Self::AnyOf(set) => set.contains(value),
        }
    }
}

/// Field-to-criterion mapping. A record matches when every field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCriteria {
    fields: BTreeMap<PathField, Criterion>,
}

impl PathCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: PathField, value: impl Into<PathValue>) -> Self {
        self.fields.insert(field, Criterion::Eq(value.into()));
        self
    }

    #[must_use]
    pub fn with_any<V>(mut self, field: PathField, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<PathValue>,
    {
        let set = values.into_iter().map(Into::into).collect();
        self.fields.insert(field, Criterion::AnyOf(set));
        self
    }

    #[must_use]
    pub fn get(&self, field: PathField) -> Option<&Criterion> {
        self.fields.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PathField, &Criterion)> {
        self.fields.iter().map(|(field, criterion)| (*field, criterion))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Records missing a constrained field never match.
    #[must_use]
    pub fn matches(&self, path: &ProjectedPath) -> bool {
        self.fields.iter().all(|(field, criterion)| {
            path.field(*field)
                .is_some_and(|value| criterion.matches(&value))
        })
    }
}

/// A candidate path as it would be recorded for one scope.
///
/// Empty fields are omitted both from serialized records and from the
/// criteria built for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedPath {
    pub store_id: ScopeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_path: String,
}

impl ProjectedPath {
    #[must_use]
    pub fn field(&self, field: PathField) -> Option<PathValue> {
        match field {
            PathField::StoreId => Some(self.store_id.into()),
            PathField::EntityId => self.entity_id.map(Into::into),
            PathField::EntityType => {
                (!self.entity_type.is_empty()).then(|| self.entity_type.as_str().into())
            }
            PathField::RequestPath => {
                (!self.request_path.is_empty()).then(|| self.request_path.as_str().into())
            }
        }
    }

    /// ## Summary
    /// Exact-match criteria for this path, built from its non-empty fields.
    #[must_use]
    pub fn criteria(&self) -> PathCriteria {
        [
            PathField::StoreId,
            PathField::EntityId,
            PathField::EntityType,
            PathField::RequestPath,
        ]
        .into_iter()
        .fold(PathCriteria::new(), |criteria, field| match self.field(field) {
            Some(value) => criteria.with(field, value),
            None => criteria,
        })
    }

    /// Whether `other` targets the same path slot (scope and request path).
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.store_id == other.store_id && self.request_path == other.request_path
    }

    /// Whether `other` belongs to the same entity.
    ///
    /// Paths without an entity id belong to nobody, not even each other.
    #[must_use]
    pub fn same_owner(&self, other: &Self) -> bool {
        self.entity_id.is_some()
            && self.entity_id == other.entity_id
            && self.entity_type == other.entity_type
    }
}

/// A path stored in a path index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    #[serde(rename = "url_rewrite_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub path: ProjectedPath,
}
