//! Builds parameterized DDL and CRUD statements from a record's field schema.
//!
//! Every record table shares the same implicit layout: `id BIGSERIAL PRIMARY
//! KEY`, `updated_at TIMESTAMPTZ`, then the declared business fields. Bind
//! placeholders carry an explicit cast to the field's PostgreSQL type because
//! bind values travel through a single text-typed encoder.

use crate::record::{EntityMeta, FieldSpec};
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from static field schemas).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT / RETURNING column list: id, updated_at, then declared fields.
fn column_list(meta: &EntityMeta) -> String {
    let mut cols = vec!["id".to_string(), "updated_at".to_string()];
    cols.extend(meta.fields.iter().map(|f| quoted(f.name)));
    cols.join(", ")
}

fn cast_placeholder(n: usize, field: &FieldSpec) -> String {
    format!("${}::{}", n, field.kind.pg_type())
}

fn field_value(row: &Value, field: &FieldSpec) -> Value {
    row.get(field.name).cloned().unwrap_or(Value::Null)
}

/// CREATE TABLE IF NOT EXISTS for one record variant.
pub fn create_table(meta: &EntityMeta, schema: &str) -> String {
    let table = qualified_table(schema, meta.table);
    let mut cols = vec![
        "id BIGSERIAL PRIMARY KEY".to_string(),
        "updated_at TIMESTAMPTZ".to_string(),
    ];
    for field in meta.fields {
        let mut col = format!("{} {}", quoted(field.name), field.kind.pg_type());
        if !field.nullable {
            col.push_str(" NOT NULL");
        }
        if let Some(referenced) = field.references {
            col.push_str(&format!(
                " REFERENCES {}(id)",
                qualified_table(schema, referenced)
            ));
        }
        cols.push(col);
    }
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, cols.join(", "))
}

pub fn select_all(meta: &EntityMeta, schema: &str) -> String {
    format!(
        "SELECT {} FROM {}",
        column_list(meta),
        qualified_table(schema, meta.table)
    )
}

/// SELECT by primary key. Caller binds the id as sole param.
pub fn select_by_id(meta: &EntityMeta, schema: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1",
        column_list(meta),
        qualified_table(schema, meta.table)
    )
}

/// INSERT one row; the id comes from the table sequence. Returns the stored
/// row.
pub fn insert(meta: &EntityMeta, schema: &str, row: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec!["updated_at".to_string()];
    let n = q.push_param(row.get("updated_at").cloned().unwrap_or(Value::Null));
    let mut placeholders = vec![format!("${}::timestamptz", n)];
    for field in meta.fields {
        cols.push(quoted(field.name));
        let n = q.push_param(field_value(row, field));
        placeholders.push(cast_placeholder(n, field));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, meta.table),
        cols.join(", "),
        placeholders.join(", "),
        column_list(meta)
    );
    q
}

/// UPDATE the row with the given id, replacing audit timestamp and all
/// declared fields. Returns the stored row, or nothing when the id is gone.
pub fn update_by_id(meta: &EntityMeta, schema: &str, id: i64, row: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(row.get("updated_at").cloned().unwrap_or(Value::Null));
    let mut assignments = vec![format!("updated_at = ${}::timestamptz", n)];
    for field in meta.fields {
        let n = q.push_param(field_value(row, field));
        assignments.push(format!("{} = {}", quoted(field.name), cast_placeholder(n, field)));
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        qualified_table(schema, meta.table),
        assignments.join(", "),
        id_param,
        column_list(meta)
    );
    q
}

/// DELETE by primary key. Caller binds the id as sole param.
pub fn delete_by_id(meta: &EntityMeta, schema: &str) -> String {
    format!(
        "DELETE FROM {} WHERE id = $1",
        qualified_table(schema, meta.table)
    )
}

pub fn row_count(meta: &EntityMeta, schema: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualified_table(schema, meta.table))
}
