//! Path index collaborator and an in-memory implementation.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use slugscope_core::error::CoreError;
use slugscope_core::types::RecordId;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::path::{PathCriteria, PathRecord, ProjectedPath};

/// Read access to the stored request paths.
pub trait PathIndex {
    /// ## Summary
    /// Returns the first record matching `criteria`, if any.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be queried.
    fn find_one(&self, criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>>;

    /// ## Summary
    /// Returns every record matching `criteria`.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be queried.
    fn find_all(&self, criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>>;
}

impl<T: PathIndex + ?Sized> PathIndex for &T {
    fn find_one(&self, criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>> {
        (**self).find_one(criteria)
    }

    fn find_all(&self, criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>> {
        (**self).find_all(criteria)
    }
}

impl<T: PathIndex + ?Sized> PathIndex for Arc<T> {
    fn find_one(&self, criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>> {
        (**self).find_one(criteria)
    }

    fn find_all(&self, criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>> {
        (**self).find_all(criteria)
    }
}

#[derive(Debug)]
struct IndexState {
    records: Vec<PathRecord>,
    next_id: u64,
}

impl Default for IndexState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl IndexState {
    fn push(&mut self, path: ProjectedPath) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(PathRecord { id, path });
        id
    }
}

/// Path index held in memory.
///
/// `persist` refuses to record a path whose scope and request path already
/// belong to another entity, so a caller that lost a race can retry.
#[derive(Debug, Default)]
pub struct MemoryPathIndex {
    state: RwLock<IndexState>,
}

impl MemoryPathIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the index with existing records, keeping their ids.
    #[must_use]
    pub fn from_records(records: Vec<PathRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        Self {
            state: RwLock::new(IndexState { records, next_id }),
        }
    }

    fn read(&self) -> ServiceResult<RwLockReadGuard<'_, IndexState>> {
        self.state
            .read()
            .map_err(|_err| CoreError::InvariantViolation("path index lock poisoned").into())
    }

    fn write(&self) -> ServiceResult<RwLockWriteGuard<'_, IndexState>> {
        self.state
            .write()
            .map_err(|_err| CoreError::InvariantViolation("path index lock poisoned").into())
    }

    /// ## Summary
    /// Records a path unconditionally and returns its new id.
    ///
    /// ## Errors
    /// Returns an error if the index lock is poisoned.
    pub fn insert(&self, path: ProjectedPath) -> ServiceResult<RecordId> {
        Ok(self.write()?.push(path))
    }

    /// ## Summary
    /// Records accepted paths for one entity.
    ///
    /// A path already owned by the same entity in the same slot is kept in
    /// place. All paths are checked before any is written.
    ///
    /// ## Errors
    /// Returns `ServiceError::Conflict` if any path is owned by a different
    /// entity, or an error if the index lock is poisoned.
    pub fn persist(&self, paths: &[ProjectedPath]) -> ServiceResult<Vec<RecordId>> {
        let mut state = self.write()?;

        let mut plan = Vec::with_capacity(paths.len());
        for path in paths {
            match state.records.iter().find(|r| r.path.same_slot(path)) {
                Some(existing) if existing.path.same_owner(path) => plan.push(Some(existing.id)),
                Some(existing) => {
                    return Err(ServiceError::Conflict(format!(
                        "request path '{}' in scope {} is owned by record {}",
                        path.request_path, path.store_id, existing.id
                    )));
                }
                None => plan.push(None),
            }
        }

        let mut ids = Vec::with_capacity(paths.len());
        for (path, existing) in paths.iter().zip(plan) {
            let id = match existing {
                Some(id) => id,
                None => state.push(path.clone()),
            };
            ids.push(id);
        }

        debug!(count = ids.len(), "Persisted request paths");
        Ok(ids)
    }

    /// ## Summary
    /// Snapshot of every stored record.
    ///
    /// ## Errors
    /// Returns an error if the index lock is poisoned.
    pub fn records(&self) -> ServiceResult<Vec<PathRecord>> {
        Ok(self.read()?.records.clone())
    }
}

impl PathIndex for MemoryPathIndex {
    fn find_one(&self, criteria: &PathCriteria) -> ServiceResult<Option<PathRecord>> {
        Ok(self
            .read()?
            .records
            .iter()
            .find(|r| criteria.matches(&r.path))
            .cloned())
    }

    fn find_all(&self, criteria: &PathCriteria) -> ServiceResult<Vec<PathRecord>> {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|r| criteria.matches(&r.path))
            .cloned()
            .collect())
    }
}
