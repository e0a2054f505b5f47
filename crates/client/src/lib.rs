//! Client code for precache.
//!
//! This crate provides the production network collaborator: an HTTP fetch
//! pipeline over reqwest that implements `precache_core::Network`.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, resolve};
