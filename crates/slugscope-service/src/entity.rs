//! Entities and attributes the resolver reads from.

use serde::Deserialize;
use serde_json::{Map, Value};

use slugscope_core::constants::{EXTENSIBLE_SCOPE_ID, STORE_ID};
use slugscope_core::types::{AttributeScope, EntityId, ScopeId};

/// Read-only view of an entity carrying a candidate value.
pub trait EntityObject {
    /// Identifier of the entity, absent until it is first saved.
    fn id(&self) -> Option<EntityId>;

    /// Name of the field holding the scope id the entity was submitted under.
    fn scope_field(&self) -> &str {
        STORE_ID
    }

    fn data(&self, field: &str) -> Option<&Value>;

    /// Scope id read from `scope_field()`; non-numeric values count as absent.
    fn scope_id(&self) -> Option<ScopeId> {
        self.data(self.scope_field()).and_then(scope_id_from_value)
    }

    /// Candidate value stored under `attribute_code`, as text.
    fn value(&self, attribute_code: &str) -> Option<String> {
        match self.data(attribute_code)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

fn scope_id_from_value(value: &Value) -> Option<ScopeId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .map(ScopeId),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Plain entity backed by a field map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataObject {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl DataObject {
    #[must_use]
    pub fn new(id: Option<EntityId>) -> Self {
        Self {
            id,
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }
}

impl EntityObject for DataObject {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn data(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Entity whose scope id lives under the extensible scope field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtensibleObject {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ExtensibleObject {
    #[must_use]
    pub fn new(id: Option<EntityId>) -> Self {
        Self {
            id,
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }
}

impl EntityObject for ExtensibleObject {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn scope_field(&self) -> &str {
        EXTENSIBLE_SCOPE_ID
    }

    fn data(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Metadata of the attribute holding the candidate value.
pub trait AttributeDescriptor {
    fn entity_type_code(&self) -> &str;

    fn attribute_code(&self) -> &str;

    /// `None` for attributes that are not scope-aware.
    fn scope(&self) -> Option<AttributeScope>;

    fn is_global(&self) -> bool {
        self.scope() == Some(AttributeScope::Global)
    }

    fn is_website(&self) -> bool {
        self.scope() == Some(AttributeScope::Website)
    }

    fn is_store(&self) -> bool {
        self.scope() == Some(AttributeScope::Store)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    pub entity_type: String,
    pub code: String,
    #[serde(default)]
    pub scope: Option<AttributeScope>,
}

impl Attribute {
    #[must_use]
    pub fn new(entity_type: &str, code: &str, scope: Option<AttributeScope>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            code: code.to_string(),
            scope,
        }
    }

    #[must_use]
    pub fn global(entity_type: &str, code: &str) -> Self {
        Self::new(entity_type, code, Some(AttributeScope::Global))
    }

    #[must_use]
    pub fn website(entity_type: &str, code: &str) -> Self {
        Self::new(entity_type, code, Some(AttributeScope::Website))
    }

    #[must_use]
    pub fn store(entity_type: &str, code: &str) -> Self {
        Self::new(entity_type, code, Some(AttributeScope::Store))
    }

    #[must_use]
    pub fn unscoped(entity_type: &str, code: &str) -> Self {
        Self::new(entity_type, code, None)
    }
}

impl AttributeDescriptor for Attribute {
    fn entity_type_code(&self) -> &str {
        &self.entity_type
    }

    fn attribute_code(&self) -> &str {
        &self.code
    }

    fn scope(&self) -> Option<AttributeScope> {
        self.scope
    }
}
