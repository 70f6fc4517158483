//! The entity registry: the immutable name-to-type mapping built at startup.
//!
//! Record variants are registered explicitly through [`RegistryBuilder`];
//! there is no runtime type discovery. The registry must be fully built before
//! traffic is admitted and is never mutated afterwards, so request threads
//! read it without locking. Picking up new variants requires a restart.

use crate::dispatch::{parse_record, validate_record, DynRecord, EntityOps, TypedOps};
use crate::error::{AppError, RegistryError};
use crate::record::{EntityMeta, Record};
use crate::validation::FieldViolation;
use std::collections::HashMap;

/// One registered record variant: its static descriptor plus the
/// monomorphized parse/validate entry points and operation table.
pub struct RegisteredEntity {
    pub meta: &'static EntityMeta,
    parse_fn: fn(&[u8]) -> Result<DynRecord, serde_json::Error>,
    validate_fn: fn(&DynRecord) -> Vec<FieldViolation>,
    ops: Box<dyn EntityOps>,
}

impl RegisteredEntity {
    fn of<T: Record>() -> Self {
        RegisteredEntity {
            meta: T::META,
            parse_fn: parse_record::<T>,
            validate_fn: validate_record::<T>,
            ops: TypedOps::<T>::boxed(),
        }
    }

    /// Deserialize a request body against this variant's concrete type.
    pub fn parse(&self, bytes: &[u8]) -> Result<DynRecord, AppError> {
        (self.parse_fn)(bytes).map_err(|e| AppError::MalformedBody(e.to_string()))
    }

    /// Run the variant's declared validation rules against a parsed body.
    pub fn validate(&self, rec: &DynRecord) -> Vec<FieldViolation> {
        (self.validate_fn)(rec)
    }

    pub fn ops(&self) -> &dyn EntityOps {
        self.ops.as_ref()
    }
}

/// Immutable mapping from entity name to registered variant.
pub struct EntityRegistry {
    entities: HashMap<&'static str, RegisteredEntity>,
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &self.names())
            .finish()
    }
}

impl EntityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder { entries: Vec::new() }
    }

    /// Resolve an entity name from a URL path segment. Unknown names are a
    /// client error, never a crash.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredEntity, AppError> {
        self.entities
            .get(name)
            .ok_or_else(|| AppError::UnknownEntity(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredEntity> {
        self.entities.values()
    }

    /// All registered entity names, sorted for stable diagnostics output.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entities.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Static descriptors of all registered variants.
    pub fn metas(&self) -> Vec<&'static EntityMeta> {
        self.entities.values().map(|e| e.meta).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Collects registrations, then validates them as a whole. Duplicate names
/// fail `build` deterministically instead of one registration silently
/// shadowing another.
pub struct RegistryBuilder {
    entries: Vec<RegisteredEntity>,
}

impl RegistryBuilder {
    pub fn register<T: Record>(mut self) -> Self {
        self.entries.push(RegisteredEntity::of::<T>());
        self
    }

    pub fn build(self) -> Result<EntityRegistry, RegistryError> {
        if self.entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut entities = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            let name = entry.meta.name;
            if entities.insert(name, entry).is_some() {
                return Err(RegistryError::DuplicateEntityName(name.to_string()));
            }
        }
        tracing::info!(entities = entities.len(), "entity registry built");
        Ok(EntityRegistry { entities })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Label, Note};

    #[test]
    fn resolve_returns_registered_variant() {
        let registry = EntityRegistry::builder()
            .register::<Note>()
            .register::<Label>()
            .build()
            .expect("builds");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("note").expect("note").meta.table, "notes");
        assert_eq!(registry.resolve("label").expect("label").meta.name, "label");
    }

    #[test]
    fn resolve_unknown_name_is_a_client_error() {
        let registry = EntityRegistry::builder().register::<Note>().build().expect("builds");
        match registry.resolve("ghost") {
            Err(AppError::UnknownEntity(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected UnknownEntity, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn duplicate_names_fail_build() {
        let err = EntityRegistry::builder()
            .register::<Note>()
            .register::<Note>()
            .build()
            .expect_err("duplicate must fail");
        match err {
            RegistryError::DuplicateEntityName(name) => assert_eq!(name, "note"),
            other => panic!("expected DuplicateEntityName, got {other:?}"),
        }
    }

    #[test]
    fn empty_registry_fails_build() {
        assert!(matches!(
            EntityRegistry::builder().build(),
            Err(RegistryError::Empty)
        ));
    }

    #[test]
    fn names_are_sorted() {
        let registry = EntityRegistry::builder()
            .register::<Label>()
            .register::<Note>()
            .build()
            .expect("builds");
        assert_eq!(registry.names(), vec!["label", "note"]);
    }
}
