//! The offline cache manager.
//!
//! A [`CacheManager`] owns one cache version and walks it through
//! install → activate, then answers intercepted fetches through an
//! interceptor [`Pipeline`]. A [`Registration`] hands control from one
//! version to the next and tracks the clients each version controls.

pub mod clients;
pub mod context;
pub mod manager;
pub mod message;
pub mod pipeline;
pub mod registration;
pub mod state;
mod strategy;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use clients::{ClientInfo, ClientRegistry};
pub use context::WorkerContext;
pub use manager::{ActivationReport, CacheManager, FetchOutcome, ResponseSource, Served};
pub use message::ControlMessage;
pub use pipeline::{DeclineReason, Pipeline, Route, Stage, Strategy};
pub use registration::{Registration, RegistrationStatus, WorkerInfo};
pub use state::WorkerState;
pub use writer::{BackgroundWriter, WriteFailure};
