//! Environment-based runtime settings.

/// Default request body cap: the binder buffers whole bodies before
/// deserializing.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PG_SCHEMA: &str = "public";

/// Runtime settings read from the environment. The record variants
/// themselves are registered in code, not configured; there is no scan root.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Listen address (`DYNREST_ADDR`).
    pub bind_addr: String,
    /// PostgreSQL backend when set (`DATABASE_URL`); in-memory otherwise.
    pub database_url: Option<String>,
    /// PostgreSQL schema holding record tables (`DYNREST_SCHEMA`).
    pub pg_schema: String,
    /// Request body cap in bytes (`DYNREST_MAX_BODY_BYTES`).
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            bind_addr: std::env::var("DYNREST_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            pg_schema: std::env::var("DYNREST_SCHEMA")
                .unwrap_or_else(|_| DEFAULT_PG_SCHEMA.to_string()),
            max_body_bytes: std::env::var("DYNREST_MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            pg_schema: DEFAULT_PG_SCHEMA.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
