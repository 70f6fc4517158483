//! The demo record variants served by this binary.

use chrono::{DateTime, Utc};
use dynrest::{validation, EntityMeta, FieldKind, FieldSpec, FieldViolation, Record};
use serde::{Deserialize, Serialize};

/// Minimal record: one free-text description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemoRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for DemoRecord {
    const META: &'static EntityMeta = &EntityMeta {
        name: "demo",
        table: "demo_records",
        fields: &[FieldSpec::new("description", FieldKind::Text)],
    };

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn merge_from(&mut self, incoming: &Self) {
        self.description = incoming.description.clone();
    }

    fn check(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        validation::max_length(&mut out, "description", self.description.as_deref(), 255);
        out
    }
}

/// Second variant; may reference a demo record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecondRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra_property: Option<String>,
    #[serde(default)]
    pub demo_id: Option<i64>,
}

impl Record for SecondRecord {
    const META: &'static EntityMeta = &EntityMeta {
        name: "second",
        table: "second_records",
        fields: &[
            FieldSpec::new("extra_property", FieldKind::Text),
            FieldSpec::referencing("demo_id", "demo_records"),
        ],
    };

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn merge_from(&mut self, incoming: &Self) {
        self.extra_property = incoming.extra_property.clone();
        self.demo_id = incoming.demo_id;
    }

    fn check(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        validation::max_length(&mut out, "extra_property", self.extra_property.as_deref(), 255);
        out
    }
}
