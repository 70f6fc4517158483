//! Shared test fixtures: two record variants and a ready-made app state.

use crate::backend::MemoryBackend;
use crate::record::{EntityMeta, FieldSpec, Record};
use crate::registry::EntityRegistry;
use crate::state::AppState;
use crate::validation::{self, FieldViolation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Note {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Note {
    const META: &'static EntityMeta = &EntityMeta {
        name: "note",
        table: "notes",
        fields: &[FieldSpec::new("description", crate::record::FieldKind::Text)],
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

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Label {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note_id: Option<i64>,
}

impl Record for Label {
    const META: &'static EntityMeta = &EntityMeta {
        name: "label",
        table: "labels",
        fields: &[
            FieldSpec::new("name", crate::record::FieldKind::Text),
            FieldSpec::referencing("note_id", "notes"),
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
        self.name = incoming.name.clone();
        self.note_id = incoming.note_id;
    }

    fn check(&self) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        validation::max_length(&mut out, "name", self.name.as_deref(), 64);
        out
    }
}

pub(crate) fn note_with(description: &str) -> Note {
    Note {
        id: None,
        updated_at: None,
        description: Some(description.to_string()),
    }
}

pub(crate) fn test_registry() -> Arc<EntityRegistry> {
    Arc::new(
        EntityRegistry::builder()
            .register::<Note>()
            .register::<Label>()
            .build()
            .expect("test registry builds"),
    )
}

pub(crate) fn test_state() -> AppState {
    AppState::new(test_registry(), Arc::new(MemoryBackend::new()))
}
