//! Generic typed CRUD over a storage backend.

use crate::backend::StorageBackend;
use crate::error::{AppError, StorageError};
use crate::record::Record;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// Type-parameterized CRUD operations, keyed by the record type. Create
/// guards against accidental overwrite; update copies only mutable business
/// fields onto the persisted record; delete is idempotent.
pub struct GenericStore {
    backend: Arc<dyn StorageBackend>,
}

impl GenericStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        GenericStore { backend }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Full fetch of all records of the type. No pagination; ordering is
    /// whatever the backend yields.
    pub async fn find_all<T: Record>(&self) -> Result<Vec<T>, AppError> {
        let rows = self.backend.select_all(T::META).await?;
        rows.into_iter().map(from_row::<T>).collect()
    }

    pub async fn find_one<T: Record>(&self, id: i64) -> Result<Option<T>, AppError> {
        let row = self.backend.select_one(T::META, id).await?;
        row.map(from_row::<T>).transpose()
    }

    /// Persist a new record. The input must not carry an identifier; the
    /// backend assigns one. Fails with `AlreadyExists` otherwise, with no
    /// persistence side effect.
    pub async fn create<T: Record>(&self, mut rec: T) -> Result<T, AppError> {
        if let Some(id) = rec.id() {
            return Err(AppError::AlreadyExists(format!(
                "{} id {} was supplied; the id must be null to create a new record",
                T::META.name,
                id
            )));
        }
        rec.set_updated_at(Utc::now());
        let row = to_row(&rec)?;
        let stored = self.backend.insert(T::META, &row).await?;
        from_row(stored)
    }

    /// Update a persisted record. Only mutable business fields are taken from
    /// the caller's value; identifier and audit timestamp are managed here.
    pub async fn update<T: Record>(&self, rec: T) -> Result<T, AppError> {
        let id = rec
            .id()
            .ok_or_else(|| AppError::BadRequest("update requires an identifier".to_string()))?;
        let mut existing: T = self
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", T::META.name, id)))?;
        existing.merge_from(&rec);
        existing.set_updated_at(Utc::now());
        let row = to_row(&existing)?;
        let stored = self
            .backend
            .update(T::META, id, &row)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", T::META.name, id)))?;
        from_row(stored)
    }

    /// Remove a record. A missing id is a no-op, not an error.
    pub async fn delete<T: Record>(&self, id: i64) -> Result<(), AppError> {
        let removed = self.backend.delete(T::META, id).await?;
        if !removed {
            tracing::debug!(entity = T::META.name, id, "delete on absent id");
        }
        Ok(())
    }

    pub async fn count<T: Record>(&self) -> Result<u64, AppError> {
        Ok(self.backend.count(T::META).await?)
    }
}

fn to_row<T: Record>(rec: &T) -> Result<Value, AppError> {
    serde_json::to_value(rec).map_err(|e| AppError::Storage(StorageError::Encoding(e)))
}

fn from_row<T: Record>(row: Value) -> Result<T, AppError> {
    serde_json::from_value(row).map_err(|e| AppError::Storage(StorageError::Encoding(e)))
}
