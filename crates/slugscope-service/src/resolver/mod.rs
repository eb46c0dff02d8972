//! Scope-aware URL-key resolution.
//!
//! ## Summary
//! `ScopedSlugResolver` projects a candidate value into one request path per
//! affected store scope, checks those paths against a `PathIndex`, and keeps
//! appending a short token to the candidate until no other entity owns any
//! of them.
//!
//! The resolver never writes to the index. Callers persist the accepted
//! paths themselves, so two concurrent resolutions of the same value can both
//! succeed; a unique constraint in the index is the place to catch that.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use tracing::{debug, warn};

use slugscope_core::config::ResolverConfig;
use slugscope_core::constants::{SCOPE_TYPE_STORE, TOKEN_LENGTH, TOKEN_SEPARATOR};
use slugscope_core::error::CoreError;
use slugscope_core::types::{AttributeScope, EntityId, RecordId, ScopeId};

use crate::entity::{AttributeDescriptor, EntityObject};
use crate::error::{ServiceError, ServiceResult};
use crate::index::PathIndex;
use crate::path::{PathCriteria, PathField, PathValue, ProjectedPath};
use crate::scope::{ConfigLookup, ScopeRegistry};
use crate::token::{RandomTokenSource, TokenSource};

/// Per-scope suffixes read from configuration.
///
/// Entries are never invalidated; a configuration change needs a new resolver.
#[derive(Debug, Default)]
pub struct SuffixCache {
    entries: RwLock<HashMap<ScopeId, Option<String>>>,
}

impl SuffixCache {
    /// ## Summary
    /// Returns the cached suffix for `scope_id`, loading it on first use.
    ///
    /// ## Errors
    /// Propagates errors from `load`, or an invariant violation if the cache
    /// lock is poisoned.
    pub fn get_or_load<F>(&self, scope_id: ScopeId, load: F) -> ServiceResult<Option<String>>
    where
        F: FnOnce() -> ServiceResult<Option<String>>,
    {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_err| CoreError::InvariantViolation("suffix cache lock poisoned"))?;
            if let Some(suffix) = entries.get(&scope_id) {
                return Ok(suffix.clone());
            }
        }

        let loaded = load()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_err| CoreError::InvariantViolation("suffix cache lock poisoned"))?;
        Ok(entries.entry(scope_id).or_insert(loaded).clone())
    }

    /// Number of scopes with a cached entry.
    ///
    /// ## Errors
    /// Returns an invariant violation if the cache lock is poisoned.
    pub fn len(&self) -> ServiceResult<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_err| CoreError::InvariantViolation("suffix cache lock poisoned"))?;
        Ok(entries.len())
    }

    /// ## Errors
    /// Returns an invariant violation if the cache lock is poisoned.
    pub fn is_empty(&self) -> ServiceResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Removes one trailing, case-insensitive occurrence of `suffix`.
fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() || value.len() < suffix.len() {
        return value;
    }
    let start = value.len() - suffix.len();
    if value.is_char_boundary(start) && value[start..].eq_ignore_ascii_case(suffix) {
        &value[..start]
    } else {
        value
    }
}

/// ## Summary
/// Normalizes `value` to end with exactly one `suffix`.
///
/// A value that already carries the suffix, in any letter case, comes back
/// with the suffix in its configured case.
#[must_use]
pub fn apply_suffix(value: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}{suffix}", strip_suffix_ignore_case(value, suffix)),
        None => value.to_string(),
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Final value, carrying the suffix of the scope it was submitted under.
    pub value: String,
    /// Paths the caller should record for the value.
    pub paths: Vec<ProjectedPath>,
    /// Number of mutated candidates tried.
    pub attempts: u32,
    /// False only when every attempt collided.
    pub available: bool,
}

pub struct ScopedSlugResolver<I, R, C, T = RandomTokenSource> {
    index: I,
    registry: R,
    config_lookup: C,
    tokens: T,
    default_suffix: Option<String>,
    suffix_config_path: Option<String>,
    max_attempts: u32,
    fail_on_exhaustion: bool,
    suffixes: SuffixCache,
}

impl<I, R, C> ScopedSlugResolver<I, R, C, RandomTokenSource>
where
    I: PathIndex,
    R: ScopeRegistry,
    C: ConfigLookup,
{
    /// Resolver with random tokens and no suffix.
    #[must_use]
    pub fn new(index: I, registry: R, config_lookup: C) -> Self {
        Self::with_tokens(index, registry, config_lookup, RandomTokenSource)
    }
}

impl<I, R, C, T> ScopedSlugResolver<I, R, C, T>
where
    I: PathIndex,
    R: ScopeRegistry,
    C: ConfigLookup,
    T: TokenSource,
{
    #[must_use]
    pub fn with_tokens(index: I, registry: R, config_lookup: C, tokens: T) -> Self {
        let defaults = ResolverConfig::default();
        Self {
            index,
            registry,
            config_lookup,
            tokens,
            default_suffix: defaults.default_suffix,
            suffix_config_path: defaults.suffix_config_path,
            max_attempts: defaults.max_attempts,
            fail_on_exhaustion: defaults.fail_on_exhaustion,
            suffixes: SuffixCache::default(),
        }
    }

    /// ## Summary
    /// Builds a resolver from loaded settings.
    ///
    /// ## Errors
    /// Returns an error if the configuration is invalid.
    pub fn from_config(
        config: &ResolverConfig,
        index: I,
        registry: R,
        config_lookup: C,
        tokens: T,
    ) -> ServiceResult<Self> {
        config.validate()?;
        Ok(Self::with_tokens(index, registry, config_lookup, tokens)
            .with_default_suffix(config.default_suffix.clone())
            .with_suffix_config_path(config.suffix_config_path.clone())
            .with_max_attempts(config.max_attempts)
            .with_fail_on_exhaustion(config.fail_on_exhaustion))
    }

    #[must_use]
    pub fn with_default_suffix(mut self, suffix: Option<String>) -> Self {
        self.default_suffix = suffix;
        self
    }

    #[must_use]
    pub fn with_suffix_config_path(mut self, path: Option<String>) -> Self {
        self.suffix_config_path = path;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_fail_on_exhaustion(mut self, fail: bool) -> Self {
        self.fail_on_exhaustion = fail;
        self
    }

    #[must_use]
    pub fn index(&self) -> &I {
        &self.index
    }

    #[must_use]
    pub fn suffix_cache(&self) -> &SuffixCache {
        &self.suffixes
    }

    /// ## Summary
    /// Suffix used for paths in `scope_id`.
    ///
    /// With a suffix config path set and a scope given, the per-scope value
    /// is read once and cached; it may be empty or absent. Otherwise the
    /// default suffix applies.
    ///
    /// ## Errors
    /// Propagates config lookup failures.
    pub fn resolve_suffix(&self, scope_id: Option<ScopeId>) -> ServiceResult<Option<String>> {
        match (self.suffix_config_path.as_deref(), scope_id) {
            (Some(path), Some(scope_id)) => self.suffixes.get_or_load(scope_id, || {
                self.config_lookup.value(path, SCOPE_TYPE_STORE, scope_id)
            }),
            _ => Ok(self.default_suffix.clone()),
        }
    }

    /// ## Summary
    /// One suffixed path per scope id, in input order.
    ///
    /// ## Errors
    /// Propagates suffix lookup failures.
    pub fn project_paths(
        &self,
        entity_id: Option<EntityId>,
        entity_type: &str,
        value: &str,
        scope_ids: &[ScopeId],
    ) -> ServiceResult<Vec<ProjectedPath>> {
        scope_ids
            .iter()
            .map(|scope_id| {
                let suffix = self.resolve_suffix(Some(*scope_id))?;
                Ok(ProjectedPath {
                    store_id: *scope_id,
                    entity_id,
                    entity_type: entity_type.to_string(),
                    request_path: apply_suffix(value, suffix.as_deref()),
                })
            })
            .collect()
    }

    /// ## Summary
    /// Whether no other entity owns any of `paths`.
    ///
    /// Records that exactly match a path, entity included, are the entity's
    /// own and do not count as collisions. Everything else sharing a request
    /// path and scope with the projection does.
    ///
    /// ## Errors
    /// Propagates path index failures.
    pub fn is_available(&self, paths: &[ProjectedPath]) -> ServiceResult<bool> {
        let mut owned: BTreeSet<RecordId> = BTreeSet::new();
        let mut request_paths: BTreeSet<PathValue> = BTreeSet::new();
        let mut store_ids: BTreeSet<PathValue> = BTreeSet::new();

        for path in paths {
            // a path without an entity id belongs to an entity that owns nothing yet
            if path.entity_id.is_some()
                && let Some(record) = self.index.find_one(&path.criteria())?
            {
                owned.insert(record.id);
            }
            if let Some(request_path) = path.field(PathField::RequestPath) {
                request_paths.insert(request_path);
            }
            store_ids.insert(path.store_id.into());
        }

        if request_paths.is_empty() {
            return Ok(true);
        }

        let criteria = PathCriteria::new()
            .with_any(PathField::RequestPath, request_paths)
            .with_any(PathField::StoreId, store_ids);

        let conflicts: Vec<_> = self
            .index
            .find_all(&criteria)?
            .into_iter()
            .filter(|record| !owned.contains(&record.id))
            .collect();

        if let Some(conflict) = conflicts.first() {
            debug!(
                record_id = %conflict.id,
                store_id = %conflict.path.store_id,
                request_path = %conflict.path.request_path,
                conflicts = conflicts.len(),
                "Request path already taken"
            );
        }

        Ok(conflicts.is_empty())
    }

    /// ## Summary
    /// Scope ids whose paths must be free for the attribute.
    ///
    /// Global attributes, attributes without a scope, and submissions without
    /// a scope (or under the default scope) fan out to every enabled scope.
    ///
    /// ## Errors
    /// Returns a lookup failure for an unknown scope or a scope without a
    /// website.
    pub fn scope_ids_for<A>(
        &self,
        attribute: &A,
        scope_id: Option<ScopeId>,
    ) -> ServiceResult<Vec<ScopeId>>
    where
        A: AttributeDescriptor + ?Sized,
    {
        let current = scope_id.filter(|id| !id.is_default());

        match (attribute.scope(), current) {
            (Some(AttributeScope::Website), Some(id)) => self.registry.website_scope_ids(id),
            (Some(AttributeScope::Store), Some(id)) => Ok(vec![self.registry.require_scope(id)?]),
            _ => self.registry.list_scope_ids(false),
        }
    }

    fn mutate(&self, base: &str) -> String {
        let token: String = self.tokens.next_token().chars().take(TOKEN_LENGTH).collect();
        format!("{base}{TOKEN_SEPARATOR}{token}")
    }

    /// ## Summary
    /// Resolves a free value for `attribute` on `object` and returns the
    /// paths to record for it.
    ///
    /// Colliding candidates are retried as `<value>-<token>` up to the
    /// configured number of attempts. Each retry starts again from the
    /// submitted value without its suffix, so a new token replaces the
    /// previous one instead of being appended to it. When every attempt collides the last
    /// candidate is returned with `available` unset, unless the resolver is
    /// set to fail on exhaustion.
    ///
    /// ## Errors
    /// Returns lookup failures for unknown scopes, propagates index and
    /// config errors, and returns `ServiceError::CollisionExhausted` when
    /// attempts run out and failing on exhaustion is enabled.
    #[tracing::instrument(
        skip_all,
        fields(
            entity_type = attribute.entity_type_code(),
            attribute = attribute.attribute_code(),
        )
    )]
    pub fn generate_projected<O, A>(&self, object: &O, attribute: &A) -> ServiceResult<Generated>
    where
        O: EntityObject + ?Sized,
        A: AttributeDescriptor + ?Sized,
    {
        let value = object.value(attribute.attribute_code()).unwrap_or_default();
        let scope_id = object.scope_id();
        let entity_id = object.id();
        let entity_type = attribute.entity_type_code();

        let scope_ids = self.scope_ids_for(attribute, scope_id)?;
        debug!(
            value = %value,
            scope_id = ?scope_id,
            scope_ids = ?scope_ids,
            "Resolving request path"
        );

        let suffix = self.resolve_suffix(scope_id)?;
        let base = suffix
            .as_deref()
            .map_or(value.as_str(), |suffix| strip_suffix_ignore_case(&value, suffix))
            .to_string();

        let mut candidate = value;
        let mut paths = self.project_paths(entity_id, entity_type, &candidate, &scope_ids)?;
        let mut available = self.is_available(&paths)?;
        let mut attempts = 0;

        while !available && attempts < self.max_attempts {
            attempts += 1;
            candidate = self.mutate(&base);
            debug!(attempt = attempts, candidate = %candidate, "Retrying with new candidate");

            paths = self.project_paths(entity_id, entity_type, &candidate, &scope_ids)?;
            available = self.is_available(&paths)?;
        }

        let value = apply_suffix(&candidate, suffix.as_deref());

        if !available {
            if self.fail_on_exhaustion {
                return Err(ServiceError::CollisionExhausted { value, attempts });
            }
            warn!(
                value = %value,
                attempts,
                "No free request path found, returning last candidate"
            );
        }

        Ok(Generated {
            value,
            paths,
            attempts,
            available,
        })
    }

    /// ## Summary
    /// Resolves a free value for `attribute` on `object`.
    ///
    /// ## Errors
    /// See [`Self::generate_projected`].
    pub fn generate<O, A>(&self, object: &O, attribute: &A) -> ServiceResult<String>
    where
        O: EntityObject + ?Sized,
        A: AttributeDescriptor + ?Sized,
    {
        self.generate_projected(object, attribute)
            .map(|generated| generated.value)
    }
}
