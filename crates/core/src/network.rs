//! The network collaborator seam.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Error, Request, Response};

/// Anything that can turn a request into a live response.
///
/// Errors mean no response was obtained at all (DNS, connection, timeout).
/// HTTP error statuses are successful fetches with a non-2xx `Response`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[async_trait]
impl<N: Network + ?Sized> Network for Arc<N> {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        (**self).fetch(request).await
    }
}
