//! Durable client storage.
//!
//! A single SQLite key/value table, accessed through SeaORM, holds:
//! - the local task list and its completed counterpart
//! - cached snapshots of the remote task slices
//! - the last sync cursor
//! - the bearer credential

pub mod db;
pub mod slots;

pub use db::LocalStorage;
