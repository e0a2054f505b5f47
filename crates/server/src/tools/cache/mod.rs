//! Cache inspection MCP tools.
//!
//! Read-only views of the SQLite-backed stores.

pub mod get;
pub mod keys;

pub use get::{CacheGetParams, get_impl};
pub use keys::{CacheKeysParams, keys_impl};
