//! Interceptor pipeline deciding how an intercepted request is answered.
//!
//! Stages run in order: origin filter → method filter → content router.
//! The first stage to return a [`Route`] wins.

use serde::Serialize;
use url::{Origin, Url};

use precache_core::Request;

/// Why a request was handed back to default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    CrossOrigin,
    NonGet,
    /// The manager is not active (or no active manager controls the client).
    NotActive,
    /// No stage produced a route.
    Unrouted,
}

/// Caching policy applied to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Decline(DeclineReason),
    Handle(Strategy),
}

/// One step of the pipeline. `None` passes the request to the next stage.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn decide(&self, request: &Request) -> Option<Route>;
}

/// Declines requests to any origin other than the manager's own.
pub struct OriginFilter {
    origin: Origin,
}

impl OriginFilter {
    pub fn new(origin: &Url) -> Self {
        Self { origin: origin.origin() }
    }
}

impl Stage for OriginFilter {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn decide(&self, request: &Request) -> Option<Route> {
        (request.url.origin() != self.origin).then_some(Route::Decline(DeclineReason::CrossOrigin))
    }
}

/// Declines everything but GET.
pub struct MethodFilter;

impl Stage for MethodFilter {
    fn name(&self) -> &'static str {
        "method"
    }

    fn decide(&self, request: &Request) -> Option<Route> {
        (!request.is_get()).then_some(Route::Decline(DeclineReason::NonGet))
    }
}

/// HTML documents go network-first, everything else cache-first.
pub struct ContentRouter;

impl Stage for ContentRouter {
    fn name(&self) -> &'static str {
        "content"
    }

    fn decide(&self, request: &Request) -> Option<Route> {
        let strategy = if request.accepts_html() { Strategy::NetworkFirst } else { Strategy::CacheFirst };
        Some(Route::Handle(strategy))
    }
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Origin filter, method filter, content router.
    pub fn standard(origin: &Url) -> Self {
        Self::new(vec![Box::new(OriginFilter::new(origin)), Box::new(MethodFilter), Box::new(ContentRouter)])
    }

    pub fn route(&self, request: &Request) -> Route {
        for stage in &self.stages {
            if let Some(route) = stage.decide(request) {
                tracing::debug!(stage = stage.name(), url = %request.url, ?route, "routed request");
                return route;
            }
        }
        Route::Decline(DeclineReason::Unrouted)
    }
}
