//! Request handlers: thin glue from HTTP verbs to the record service.

pub mod admin;
pub mod entity;
