//! PostgreSQL storage backend over sqlx.
//!
//! One table per registered record variant, created at `prepare` time from
//! the variant's field schema. Mutating operations are single statements with
//! `RETURNING`, so each commits atomically; reads run outside any mutating
//! transaction.

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::record::{EntityMeta, FieldKind};
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{ConnectOptions, PgPool, Row};
use std::str::FromStr;

pub struct PostgresBackend {
    pool: PgPool,
    schema: String,
}

impl PostgresBackend {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PostgresBackend {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_query(&self, q: &QueryBuf) -> Result<Option<PgRow>, StorageError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl StorageBackend for PostgresBackend {
    async fn prepare(&self, metas: &[&'static EntityMeta]) -> Result<(), StorageError> {
        if self.schema != "public" {
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", self.schema))
                .execute(&self.pool)
                .await?;
        }
        // Referenced tables first, so REFERENCES clauses resolve. The
        // association graph is acyclic, so this terminates.
        let mut pending: Vec<&'static EntityMeta> = metas.to_vec();
        let mut created: Vec<&'static str> = Vec::new();
        while !pending.is_empty() {
            let ready: Vec<&'static EntityMeta> = pending
                .iter()
                .copied()
                .filter(|m| {
                    m.fields.iter().all(|f| match f.references {
                        Some(table) => {
                            created.contains(&table) || !metas.iter().any(|o| o.table == table)
                        }
                        None => true,
                    })
                })
                .collect();
            if ready.is_empty() {
                return Err(StorageError::InvalidRow(
                    "cyclic table references in registered entities".to_string(),
                ));
            }
            for meta in ready {
                let ddl = sql::create_table(meta, &self.schema);
                tracing::debug!(sql = %ddl, "prepare");
                sqlx::query(&ddl).execute(&self.pool).await?;
                created.push(meta.table);
                pending.retain(|m| m.table != meta.table);
            }
        }
        Ok(())
    }

    async fn select_all(&self, meta: &'static EntityMeta) -> Result<Vec<Value>, StorageError> {
        let sql = sql::select_all(meta, &self.schema);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_value(meta, r)).collect()
    }

    async fn select_one(
        &self,
        meta: &'static EntityMeta,
        id: i64,
    ) -> Result<Option<Value>, StorageError> {
        let sql = sql::select_by_id(meta, &self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(|r| row_to_value(meta, r)).transpose()
    }

    async fn insert(&self, meta: &'static EntityMeta, row: &Value) -> Result<Value, StorageError> {
        let q = sql::insert(meta, &self.schema, row);
        let stored = self.fetch_query(&q).await?.ok_or_else(|| {
            StorageError::InvalidRow(format!("insert into {} returned no row", meta.table))
        })?;
        row_to_value(meta, &stored)
    }

    async fn update(
        &self,
        meta: &'static EntityMeta,
        id: i64,
        row: &Value,
    ) -> Result<Option<Value>, StorageError> {
        let q = sql::update_by_id(meta, &self.schema, id, row);
        let stored = self.fetch_query(&q).await?;
        stored.as_ref().map(|r| row_to_value(meta, r)).transpose()
    }

    async fn delete(&self, meta: &'static EntityMeta, id: i64) -> Result<bool, StorageError> {
        let sql = sql::delete_by_id(meta, &self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, meta: &'static EntityMeta) -> Result<u64, StorageError> {
        let sql = sql::row_count(meta, &self.schema);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }
}

/// Decode a fetched row into the JSON snapshot shape the store layer speaks.
fn row_to_value(meta: &EntityMeta, row: &PgRow) -> Result<Value, StorageError> {
    let mut map = serde_json::Map::new();
    let id: i64 = row.try_get("id").map_err(StorageError::Db)?;
    map.insert("id".to_string(), Value::from(id));
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at").map_err(StorageError::Db)?;
    map.insert(
        "updated_at".to_string(),
        updated_at.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null),
    );
    for field in meta.fields {
        let v = match field.kind {
            FieldKind::Text => row
                .try_get::<Option<String>, _>(field.name)
                .map(|v| v.map(Value::String))?,
            FieldKind::BigInt => row
                .try_get::<Option<i64>, _>(field.name)
                .map(|v| v.map(Value::from))?,
            FieldKind::Double => row
                .try_get::<Option<f64>, _>(field.name)
                .map(|v| v.and_then(|n| serde_json::Number::from_f64(n).map(Value::Number)))?,
            FieldKind::Bool => row
                .try_get::<Option<bool>, _>(field.name)
                .map(|v| v.map(Value::Bool))?,
            FieldKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(field.name)
                .map(|v| v.map(|d| Value::String(d.to_rfc3339())))?,
            FieldKind::Json => row.try_get::<Option<Value>, _>(field.name)?,
        };
        map.insert(field.name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(Value::Object(map))
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StorageError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StorageError::InvalidRow(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        let quoted = quote_ident(&db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quoted))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StorageError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StorageError::InvalidRow("DATABASE_URL: no path".to_string()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
