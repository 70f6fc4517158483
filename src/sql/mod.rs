//! SQL generation and parameter binding for the PostgreSQL backend.

pub mod builder;
pub mod params;

pub use builder::{
    create_table, delete_by_id, insert, row_count, select_all, select_by_id, update_by_id,
    QueryBuf,
};
pub use params::PgBindValue;
