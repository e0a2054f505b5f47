//! Scripted network and fixtures shared by the worker tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use precache_core::{AssetManifest, CacheStorage, Error, Network, Request, Response};

use crate::WorkerContext;

pub(crate) const ORIGIN: &str = "http://localhost:3000";

pub(crate) const ASSETS: &[&str] = &["/", "/index.html", "/offline.html", "/css/header.css", "/js/main.js"];

pub(crate) fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

/// Sub-resource GET with no `Accept` header.
pub(crate) fn get(path: &str) -> Request {
    Request::get(url(path))
}

/// Navigation-style GET accepting HTML.
pub(crate) fn page(path: &str) -> Request {
    Request::get(url(path)).with_header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
}

/// Network double answering from a route table.
#[derive(Default)]
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Network serving every manifest asset with a 200.
    pub(crate) fn serving_site() -> Arc<Self> {
        let network = Self::new();
        for path in ASSETS {
            network.serve(path, 200, &format!("asset {path}"));
        }
        network
    }

    pub(crate) fn serve(&self, path: &str, status: u16, body: &str) {
        let response = Response::new(url(path).as_str(), status, body.to_string());
        self.serve_response(path, response);
    }

    pub(crate) fn serve_response(&self, path: &str, response: Response) {
        self.routes.lock().unwrap().insert(url(path).to_string(), response);
    }

    pub(crate) fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(url(path).to_string());
    }

    pub(crate) fn recover(&self, path: &str) {
        self.failing.lock().unwrap().remove(&url(path).to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn clear_delay(&self) {
        *self.delay.lock().unwrap() = None;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let key = request.url.to_string();
        self.calls.lock().unwrap().push(key.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&key) {
            return Err(Error::Network(format!("unreachable: {key}")));
        }

        let routed = self.routes.lock().unwrap().get(&key).cloned();
        Ok(routed.unwrap_or_else(|| Response::new(key, 404, "404 Not Found")))
    }
}

pub(crate) fn manifest() -> AssetManifest {
    AssetManifest::new(ASSETS.iter().copied(), "/offline.html").unwrap()
}

pub(crate) async fn context(network: Arc<MockNetwork>, cache_name: &str) -> WorkerContext {
    let storage = CacheStorage::open_in_memory().await.unwrap();
    WorkerContext::new(storage, cache_name, Url::parse(ORIGIN).unwrap(), manifest(), network)
}
