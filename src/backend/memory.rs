//! In-process storage backend.
//!
//! Default backend for tests and for the demo server when no database is
//! configured. Rows are JSON objects in an ordered map per table; identifiers
//! come from a per-table sequence starting at 1.

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::record::EntityMeta;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Value>,
}

impl Table {
    fn new() -> Self {
        Table {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock poisoning only happens after a panic in another request; recover
    // the guard rather than cascading the panic.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<&'static str, Table>> {
        self.tables.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<&'static str, Table>> {
        self.tables.write().unwrap_or_else(|p| p.into_inner())
    }

    fn with_row(row: &Value, id: i64) -> Result<Value, StorageError> {
        let mut stored = row.clone();
        match stored.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), Value::from(id));
            }
            None => {
                return Err(StorageError::InvalidRow(
                    "row must be a JSON object".to_string(),
                ))
            }
        }
        Ok(stored)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn prepare(&self, metas: &[&'static EntityMeta]) -> Result<(), StorageError> {
        let mut tables = self.write();
        for meta in metas {
            tables.entry(meta.table).or_insert_with(Table::new);
        }
        Ok(())
    }

    async fn select_all(&self, meta: &'static EntityMeta) -> Result<Vec<Value>, StorageError> {
        let tables = self.read();
        Ok(tables
            .get(meta.table)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn select_one(
        &self,
        meta: &'static EntityMeta,
        id: i64,
    ) -> Result<Option<Value>, StorageError> {
        let tables = self.read();
        Ok(tables.get(meta.table).and_then(|t| t.rows.get(&id).cloned()))
    }

    async fn insert(&self, meta: &'static EntityMeta, row: &Value) -> Result<Value, StorageError> {
        let mut tables = self.write();
        let table = tables.entry(meta.table).or_insert_with(Table::new);
        let id = table.next_id;
        let stored = Self::with_row(row, id)?;
        table.next_id += 1;
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        meta: &'static EntityMeta,
        id: i64,
        row: &Value,
    ) -> Result<Option<Value>, StorageError> {
        let mut tables = self.write();
        let Some(table) = tables.get_mut(meta.table) else {
            return Ok(None);
        };
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        let stored = Self::with_row(row, id)?;
        table.rows.insert(id, stored.clone());
        Ok(Some(stored))
    }

    async fn delete(&self, meta: &'static EntityMeta, id: i64) -> Result<bool, StorageError> {
        let mut tables = self.write();
        Ok(tables
            .get_mut(meta.table)
            .map(|t| t.rows.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn count(&self, meta: &'static EntityMeta) -> Result<u64, StorageError> {
        let tables = self.read();
        Ok(tables.get(meta.table).map(|t| t.rows.len() as u64).unwrap_or(0))
    }
}
