//! SQLite-backed named cache storage for response snapshots.
//!
//! This module provides a persistent cache using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Multiple named stores, enumerated in creation order
//! - Request-keyed snapshots (method + URL, SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-store deletion with cascading entry removal

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheStorage;
pub use entries::{Cache, CachedRequest, Snapshot};
