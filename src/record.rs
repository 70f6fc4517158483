//! The persisted record model: the `Record` trait and its static field schema.

use crate::validation::FieldViolation;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage type of one declared field. Drives DDL and SQL parameter casts for
/// the PostgreSQL backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    BigInt,
    Double,
    Bool,
    Timestamp,
    Json,
}

impl FieldKind {
    /// PostgreSQL type name for DDL and bind casts.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::BigInt => "bigint",
            FieldKind::Double => "double precision",
            FieldKind::Bool => "boolean",
            FieldKind::Timestamp => "timestamptz",
            FieldKind::Json => "jsonb",
        }
    }
}

/// One declared business field of a record variant. The identifier and audit
/// timestamp are implicit and never declared here.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Table referenced by this field (foreign relationship). The association
    /// graph must stay acyclic; referenced tables are prepared first.
    pub references: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            nullable: true,
            references: None,
        }
    }

    pub const fn not_null(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            nullable: false,
            references: None,
        }
    }

    pub const fn referencing(name: &'static str, table: &'static str) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::BigInt,
            nullable: true,
            references: Some(table),
        }
    }
}

/// Static descriptor of a record variant: its dynamic-routing name, storage
/// table and field schema. Declared once per type as `Record::META`.
#[derive(Debug)]
pub struct EntityMeta {
    /// Short logical name bound to the URL path segment.
    pub name: &'static str,
    /// Storage table name.
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
}

/// A persisted entity. Identity is the assigned identifier; a `None` id means
/// the record has not been created yet. The audit timestamp is managed by the
/// store layer and never taken from caller input.
pub trait Record:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const META: &'static EntityMeta;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);

    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Copy mutable business fields from `incoming` onto `self`. The
    /// identifier and audit timestamp of `self` are left untouched.
    fn merge_from(&mut self, incoming: &Self);

    /// Declared validation rules. Violations fail the request at the binder
    /// stage, before any handler logic runs.
    fn check(&self) -> Vec<FieldViolation> {
        Vec::new()
    }

    /// Persistence identity: two values denote the same record iff both carry
    /// the same assigned identifier. Unpersisted records have no identity.
    fn same_identity(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Note;
    use chrono::Utc;

    #[test]
    fn merge_from_keeps_id_and_timestamp() {
        let now = Utc::now();
        let mut persisted = Note {
            id: Some(7),
            updated_at: Some(now),
            description: Some("old".into()),
        };
        let incoming = Note {
            id: None,
            updated_at: None,
            description: Some("new".into()),
        };
        persisted.merge_from(&incoming);
        assert_eq!(persisted.id, Some(7));
        assert_eq!(persisted.updated_at, Some(now));
        assert_eq!(persisted.description.as_deref(), Some("new"));
    }

    #[test]
    fn identity_is_by_assigned_id_only() {
        let a = Note {
            id: Some(1),
            updated_at: None,
            description: Some("a".into()),
        };
        let b = Note {
            id: Some(1),
            updated_at: None,
            description: Some("b".into()),
        };
        let unpersisted = Note {
            id: None,
            updated_at: None,
            description: Some("a".into()),
        };
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&unpersisted));
        assert!(!unpersisted.same_identity(&unpersisted.clone()));
    }

    #[test]
    fn field_kind_pg_types() {
        assert_eq!(FieldKind::Text.pg_type(), "text");
        assert_eq!(FieldKind::Timestamp.pg_type(), "timestamptz");
        assert_eq!(FieldKind::Json.pg_type(), "jsonb");
    }

    #[test]
    fn referencing_field_is_a_nullable_bigint() {
        let f = FieldSpec::referencing("note_id", "notes");
        assert_eq!(f.kind, FieldKind::BigInt);
        assert!(f.nullable);
        assert_eq!(f.references, Some("notes"));
    }
}
