//! dynrest: registry-driven dynamic CRUD REST backend library.
//!
//! Applications define record types, register them by name, pick a storage
//! backend, and mount the router. A URL path segment selects the record type
//! at request time; the body binder deserializes payloads against the
//! resolved concrete type before handlers run.

pub mod backend;
pub mod binder;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod record;
pub mod registry;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::postgres::ensure_database_exists;
pub use backend::{MemoryBackend, PostgresBackend, StorageBackend};
pub use binder::{BoundRecord, EntityBody, MaybeEntityBody};
pub use config::Settings;
pub use dispatch::EntityOps;
pub use error::{AppError, RegistryError, StorageError};
pub use record::{EntityMeta, FieldKind, FieldSpec, Record};
pub use registry::{EntityRegistry, RegisteredEntity, RegistryBuilder};
pub use routes::{admin_routes, app_router, common_routes, entity_routes};
pub use service::RecordService;
pub use state::AppState;
pub use store::GenericStore;
pub use validation::FieldViolation;
