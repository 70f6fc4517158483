//! Shared application state for all routes.

use crate::backend::StorageBackend;
use crate::registry::EntityRegistry;
use crate::service::RecordService;
use std::sync::Arc;

/// Registry and service handles shared by every request. The registry is
/// immutable after startup; both are cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EntityRegistry>,
    pub service: Arc<RecordService>,
}

impl AppState {
    pub fn new(registry: Arc<EntityRegistry>, backend: Arc<dyn StorageBackend>) -> Self {
        AppState {
            registry,
            service: Arc::new(RecordService::new(backend)),
        }
    }
}
