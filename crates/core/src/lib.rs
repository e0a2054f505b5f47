//! Core types and shared functionality for precache.
//!
//! This crate provides:
//! - Named cache storage with SQLite backend
//! - Request/response model and the `Network` seam
//! - Unified error types
//! - Configuration structures and the asset manifest

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod manifest;
pub mod network;

pub use cache::{Cache, CacheStorage, Snapshot};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, Response, ResponseType};
pub use manifest::AssetManifest;
pub use network::Network;
