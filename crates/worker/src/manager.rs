//! The offline cache manager for one cache version.
//!
//! Lifecycle phases (install, activate) are serialised by a phase lock;
//! fetch interceptions run concurrently with each other and with phases.

use futures_util::future::{join_all, try_join_all};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use precache_core::{Error, Request, Response};

use crate::message::ControlMessage;
use crate::pipeline::{DeclineReason, Pipeline, Route, Strategy};
use crate::{BackgroundWriter, WorkerContext, WorkerState, strategy};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    OfflineFallback,
}

/// A response produced by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

/// Result of offering a request to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller should perform default handling.
    Declined(DeclineReason),
    Served(Served),
}

/// What activation cleaned up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// Stale stores that were deleted.
    pub deleted: Vec<String>,
    /// Stale stores whose deletion failed and was skipped.
    pub failed: Vec<String>,
    /// Clients newly brought under control.
    pub claimed: usize,
}

pub struct CacheManager {
    ctx: WorkerContext,
    pipeline: Pipeline,
    writer: BackgroundWriter,
    state: RwLock<WorkerState>,
    phase: Mutex<()>,
    skip_waiting: AtomicBool,
}

impl CacheManager {
    pub fn new(ctx: WorkerContext) -> Self {
        let pipeline = Pipeline::standard(&ctx.origin);
        Self::with_pipeline(ctx, pipeline)
    }

    pub fn with_pipeline(ctx: WorkerContext, pipeline: Pipeline) -> Self {
        Self {
            ctx,
            pipeline,
            writer: BackgroundWriter::new(),
            state: RwLock::new(WorkerState::Installing),
            phase: Mutex::new(()),
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// Name of this version's cache store.
    pub fn version(&self) -> &str {
        &self.ctx.cache_name
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    pub fn writer(&self) -> &BackgroundWriter {
        &self.writer
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether this version asked to skip waiting for older clients.
    pub fn wants_skip_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Request activation without waiting for the previous version's
    /// clients to close.
    pub fn skip_waiting(&self) {
        if !self.skip_waiting.swap(true, Ordering::SeqCst) {
            tracing::info!(version = %self.ctx.cache_name, "skip waiting requested");
        }
    }

    /// Handle a control message. Returns whether it was recognised.
    pub fn post_message(&self, payload: &serde_json::Value) -> bool {
        match ControlMessage::parse(payload) {
            Some(ControlMessage::SkipWaiting) => {
                self.skip_waiting();
                true
            }
            None => {
                tracing::debug!(version = %self.ctx.cache_name, "ignoring unrecognised message");
                false
            }
        }
    }

    /// Precache every manifest entry into this version's store.
    ///
    /// All-or-nothing: every entry is fetched first and must answer 2xx, then
    /// all snapshots are written in one transaction. On failure the manager
    /// stays `Installing` and install may be retried.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` unless the manager is `Installing`
    /// - `Error::InstallFailed` if any manifest entry fails to fetch
    /// - storage errors from opening the store or writing snapshots
    pub async fn install(&self) -> Result<(), Error> {
        let _phase = self.phase.lock().await;
        self.expect_state(WorkerState::Installing, "install").await?;

        tracing::info!(version = %self.ctx.cache_name, assets = self.ctx.manifest.len(), "installing");

        match self.precache().await {
            Ok(()) => {
                if self.ctx.skip_waiting_on_install {
                    self.skip_waiting();
                }
                *self.state.write().await = WorkerState::Installed;
                tracing::info!(version = %self.ctx.cache_name, "installed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(version = %self.ctx.cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<(), Error> {
        let cache = self.ctx.storage.open_store(&self.ctx.cache_name).await?;
        let urls = self.ctx.manifest.resolve(&self.ctx.origin)?;
        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_asset(url))).await?;
        cache.put_all(&entries).await
    }

    async fn fetch_asset(&self, url: Url) -> Result<(Request, Response), Error> {
        let request = Request::get(url);
        let response = self
            .ctx
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed { url: request.url.to_string(), reason: e.to_string() })?;

        if !response.ok() {
            return Err(Error::InstallFailed {
                url: request.url.to_string(),
                reason: format!("status {}", response.status),
            });
        }

        Ok((request, response))
    }

    /// Delete every store but this version's and claim all open clients.
    ///
    /// Deletion is best-effort per store; failures are logged and reported,
    /// never fatal.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless the manager is `Installed`
    /// (or resuming an interrupted `Activating`).
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let _phase = self.phase.lock().await;
        {
            let mut state = self.state.write().await;
            match *state {
                WorkerState::Installed | WorkerState::Activating => *state = WorkerState::Activating,
                other => {
                    return Err(Error::InvalidState(format!(
                        "cannot activate {} while {other}",
                        self.ctx.cache_name
                    )));
                }
            }
        }

        tracing::info!(version = %self.ctx.cache_name, "activating");

        let names = match self.ctx.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "failed to enumerate stores; skipping cleanup");
                Vec::new()
            }
        };

        let storage = &self.ctx.storage;
        let deletions = names
            .into_iter()
            .filter(|name| name != &self.ctx.cache_name)
            .map(|name| async move {
                let result = storage.delete(&name).await;
                (name, result)
            });

        let mut report = ActivationReport::default();
        for (name, result) in join_all(deletions).await {
            match result {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted stale cache store");
                    report.deleted.push(name);
                }
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete stale cache store");
                    report.failed.push(name);
                }
            }
        }

        report.claimed = self.ctx.clients.claim(&self.ctx.cache_name).await;
        *self.state.write().await = WorkerState::Active;

        tracing::info!(
            version = %self.ctx.cache_name,
            deleted = report.deleted.len(),
            claimed = report.claimed,
            "active"
        );

        Ok(report)
    }

    /// Retire this version after a newer one took over.
    pub async fn mark_redundant(&self) {
        *self.state.write().await = WorkerState::Redundant;
        tracing::info!(version = %self.ctx.cache_name, "redundant");
    }

    /// Offer an outgoing request to the manager.
    ///
    /// # Errors
    ///
    /// Returns the network error when no response can be produced: a
    /// cache-first miss whose fetch failed, or a network-first request with
    /// neither a cached copy nor a cached offline page.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !self.state().await.handles_fetch() {
            return Ok(FetchOutcome::Declined(DeclineReason::NotActive));
        }

        let served = match self.pipeline.route(request) {
            Route::Decline(reason) => return Ok(FetchOutcome::Declined(reason)),
            Route::Handle(Strategy::NetworkFirst) => strategy::network_first(&self.ctx, &self.writer, request).await?,
            Route::Handle(Strategy::CacheFirst) => strategy::cache_first(&self.ctx, &self.writer, request).await?,
        };

        Ok(FetchOutcome::Served(served))
    }

    async fn expect_state(&self, expected: WorkerState, operation: &str) -> Result<(), Error> {
        let current = self.state().await;
        if current != expected {
            return Err(Error::InvalidState(format!(
                "cannot {operation} {} while {current}",
                self.ctx.cache_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ASSETS, MockNetwork, ORIGIN, context, get, manifest, page, url};
    use precache_core::{CacheStorage, ResponseType};
    use std::sync::Arc;
    use std::time::Duration;

    async fn active_manager(network: Arc<MockNetwork>) -> CacheManager {
        let manager = CacheManager::new(context(network, "v1").await);
        manager.install().await.unwrap();
        manager.activate().await.unwrap();
        manager
    }

    fn served(outcome: FetchOutcome) -> Served {
        match outcome {
            FetchOutcome::Served(served) => served,
            FetchOutcome::Declined(reason) => panic!("expected a response, request was declined: {reason:?}"),
        }
    }

    #[tokio::test]
    async fn test_install_precaches_every_manifest_entry() {
        let network = MockNetwork::serving_site();
        let manager = CacheManager::new(context(network, "v1").await);

        manager.install().await.unwrap();

        assert_eq!(manager.state().await, WorkerState::Installed);
        assert!(manager.wants_skip_waiting());
        let cache = manager.context().storage.open_store("v1").await.unwrap();
        for path in ASSETS {
            let snapshot = cache.match_request(&get(path)).await.unwrap();
            assert!(snapshot.is_some(), "{path} missing after install");
        }
    }

    #[tokio::test]
    async fn test_install_failure_commits_nothing_and_can_retry() {
        let network = MockNetwork::serving_site();
        network.fail("/css/header.css");
        let manager = CacheManager::new(context(network.clone(), "v1").await);

        let result = manager.install().await;
        assert!(matches!(result, Err(Error::InstallFailed { url, .. }) if url.ends_with("/css/header.css")));
        assert_eq!(manager.state().await, WorkerState::Installing);
        assert!(!manager.wants_skip_waiting());

        let cache = manager.context().storage.open_store("v1").await.unwrap();
        assert!(cache.is_empty().await.unwrap());

        network.recover("/css/header.css");
        manager.install().await.unwrap();

        let keys = cache.keys().await.unwrap();
        let urls: Vec<String> = keys.into_iter().map(|k| k.url).collect();
        let expected: Vec<String> = ASSETS.iter().map(|p| url(p).to_string()).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let network = MockNetwork::serving_site();
        network.serve("/js/main.js", 404, "404 Not Found");
        let manager = CacheManager::new(context(network, "v1").await);

        let result = manager.install().await;
        assert!(matches!(result, Err(Error::InstallFailed { reason, .. }) if reason == "status 404"));
        assert_eq!(manager.state().await, WorkerState::Installing);
    }

    #[tokio::test]
    async fn test_install_twice_is_invalid() {
        let manager = CacheManager::new(context(MockNetwork::serving_site(), "v1").await);
        manager.install().await.unwrap();
        assert!(matches!(manager.install().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_install_without_skip_waiting_signal() {
        let ctx = context(MockNetwork::serving_site(), "v1")
            .await
            .with_skip_waiting_on_install(false);
        let manager = CacheManager::new(ctx);
        manager.install().await.unwrap();
        assert!(!manager.wants_skip_waiting());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_stores() {
        let network = MockNetwork::serving_site();
        let ctx = context(network, "v2").await;
        let stale = ctx.storage.open_store("v1").await.unwrap();
        stale
            .put(&get("/js/main.js"), &Response::new(url("/js/main.js").as_str(), 200, "old"))
            .await
            .unwrap();
        ctx.storage.open_store("scratch").await.unwrap();

        let manager = CacheManager::new(ctx);
        manager.install().await.unwrap();
        let report = manager.activate().await.unwrap();

        assert_eq!(manager.state().await, WorkerState::Active);
        assert_eq!(report.deleted, vec!["v1".to_string(), "scratch".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(manager.context().storage.keys().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_invalid() {
        let manager = CacheManager::new(context(MockNetwork::serving_site(), "v1").await);
        assert!(matches!(manager.activate().await, Err(Error::InvalidState(_))));
        assert_eq!(manager.state().await, WorkerState::Installing);
    }

    #[tokio::test]
    async fn test_activate_claims_open_clients() {
        let ctx = context(MockNetwork::serving_site(), "v1").await;
        ctx.clients.open("tab-1", None).await;
        ctx.clients.open("tab-2", Some("v0")).await;
        let manager = CacheManager::new(ctx);
        manager.install().await.unwrap();

        let report = manager.activate().await.unwrap();
        assert_eq!(report.claimed, 2);
        assert_eq!(manager.context().clients.controlled_by("v1").await, 2);
    }

    #[tokio::test]
    async fn test_inactive_manager_declines() {
        let network = MockNetwork::serving_site();
        let manager = CacheManager::new(context(network.clone(), "v1").await);
        let outcome = manager.handle_fetch(&get("/js/main.js")).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Declined(DeclineReason::NotActive));
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_get_and_cross_origin_are_declined() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        network.reset_calls();

        let post = Request::new("POST", url("/contact")).with_header("Accept", "text/html");
        let outcome = manager.handle_fetch(&post).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Declined(DeclineReason::NonGet));

        let cross = Request::get(Url::parse("https://fonts.example.net/inter.woff2").unwrap());
        let outcome = manager.handle_fetch(&cross).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Declined(DeclineReason::CrossOrigin));

        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_html_network_first_updates_store() {
        let network = MockNetwork::serving_site();
        network.serve("/about", 200, "<h1>About v1</h1>");
        let manager = active_manager(network.clone()).await;

        let first = served(manager.handle_fetch(&page("/about")).await.unwrap());
        assert_eq!(first.source, ResponseSource::Network);
        assert_eq!(first.response.body.as_ref(), b"<h1>About v1</h1>");
        manager.writer().flush().await;

        let cache = manager.context().storage.open_store("v1").await.unwrap();
        let stored = cache.match_request(&page("/about")).await.unwrap().unwrap();
        assert_eq!(stored.response, first.response);

        let again = served(manager.handle_fetch(&page("/about")).await.unwrap());
        manager.writer().flush().await;
        let restored = cache.match_request(&page("/about")).await.unwrap().unwrap();
        assert_eq!(restored.response, again.response);
        assert_eq!(restored.response, stored.response);
        assert_eq!(cache.len().await.unwrap(), ASSETS.len() + 1);
    }

    #[tokio::test]
    async fn test_html_network_first_overwrites_precached_copy() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        network.serve("/index.html", 200, "fresh index");

        let result = served(manager.handle_fetch(&page("/index.html")).await.unwrap());
        assert_eq!(result.source, ResponseSource::Network);
        manager.writer().flush().await;

        let cache = manager.context().storage.open_store("v1").await.unwrap();
        let stored = cache.match_request(&get("/index.html")).await.unwrap().unwrap();
        assert_eq!(stored.response.body.as_ref(), b"fresh index");
    }

    #[tokio::test]
    async fn test_html_offline_serves_cached_copy() {
        let network = MockNetwork::serving_site();
        network.serve("/about", 200, "<h1>About</h1>");
        let manager = active_manager(network.clone()).await;
        manager.handle_fetch(&page("/about")).await.unwrap();
        manager.writer().flush().await;

        network.set_offline(true);
        let result = served(manager.handle_fetch(&page("/about")).await.unwrap());
        assert_eq!(result.source, ResponseSource::Cache);
        assert_eq!(result.response.body.as_ref(), b"<h1>About</h1>");
    }

    #[tokio::test]
    async fn test_html_offline_falls_back_to_offline_page() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        network.set_offline(true);

        let result = served(manager.handle_fetch(&page("/never-visited")).await.unwrap());
        assert_eq!(result.source, ResponseSource::OfflineFallback);
        assert_eq!(result.response.body.as_ref(), b"asset /offline.html");
    }

    #[tokio::test]
    async fn test_html_offline_without_fallback_fails() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        let cache = manager.context().storage.open_store("v1").await.unwrap();
        assert!(cache.delete(&get("/offline.html")).await.unwrap());
        network.set_offline(true);

        let result = manager.handle_fetch(&page("/never-visited")).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        network.reset_calls();

        let result = served(manager.handle_fetch(&get("/css/header.css")).await.unwrap());
        assert_eq!(result.source, ResponseSource::Cache);
        assert_eq!(result.response.body.as_ref(), b"asset /css/header.css");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_stores_once() {
        let network = MockNetwork::serving_site();
        network.serve("/img/logo.png", 200, "png");
        let manager = active_manager(network.clone()).await;
        network.reset_calls();

        let first = served(manager.handle_fetch(&get("/img/logo.png")).await.unwrap());
        assert_eq!(first.source, ResponseSource::Network);
        assert_eq!(first.response.body.as_ref(), b"png");
        manager.writer().flush().await;

        let cache = manager.context().storage.open_store("v1").await.unwrap();
        assert_eq!(cache.len().await.unwrap(), ASSETS.len() + 1);
        let stored = cache.match_request(&get("/img/logo.png")).await.unwrap().unwrap();
        assert_eq!(stored.response, first.response);

        let second = served(manager.handle_fetch(&get("/img/logo.png")).await.unwrap());
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_invalid_responses() {
        let network = MockNetwork::serving_site();
        network.serve_response(
            "/redirected.js",
            Response::new("https://cdn.example.net/lib.js", 200, "lib").with_type(ResponseType::Cors),
        );
        let manager = active_manager(network.clone()).await;

        let missing = served(manager.handle_fetch(&get("/missing.js")).await.unwrap());
        assert_eq!(missing.response.status, 404);
        let cors = served(manager.handle_fetch(&get("/redirected.js")).await.unwrap());
        assert_eq!(cors.response.body.as_ref(), b"lib");
        manager.writer().flush().await;

        let cache = manager.context().storage.open_store("v1").await.unwrap();
        assert_eq!(cache.len().await.unwrap(), ASSETS.len());
        assert_eq!(manager.writer().pending().await, 0);
    }

    #[tokio::test]
    async fn test_cache_first_network_error_propagates() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network.clone()).await;
        network.set_offline(true);

        let result = manager.handle_fetch(&get("/img/uncached.png")).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_cache_key() {
        let network = MockNetwork::serving_site();
        network.serve("/js/main.js?v=2", 200, "v2 script");
        let manager = active_manager(network.clone()).await;
        network.reset_calls();

        let result = served(manager.handle_fetch(&get("/js/main.js?v=2")).await.unwrap());
        assert_eq!(result.source, ResponseSource::Network);
        assert_eq!(result.response.body.as_ref(), b"v2 script");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_first_completes_after_caller_drops() {
        let network = MockNetwork::serving_site();
        network.serve("/slow", 200, "slow page");
        let manager = active_manager(network.clone()).await;
        network.set_delay(Duration::from_millis(200));

        let request = page("/slow");
        let abandoned = tokio::time::timeout(Duration::from_millis(20), manager.handle_fetch(&request)).await;
        assert!(abandoned.is_err());

        manager.writer().flush().await;
        let cache = manager.context().storage.open_store("v1").await.unwrap();
        let stored = cache.match_request(&request).await.unwrap().unwrap();
        assert_eq!(stored.response.body.as_ref(), b"slow page");
    }

    #[tokio::test]
    async fn test_post_message() {
        let manager = CacheManager::new(context(MockNetwork::serving_site(), "v1").await);
        assert!(!manager.post_message(&serde_json::json!({"type": "PING"})));
        assert!(!manager.wants_skip_waiting());
        assert_eq!(manager.state().await, WorkerState::Installing);

        assert!(manager.post_message(&serde_json::json!({"type": "SKIP_WAITING"})));
        assert!(manager.wants_skip_waiting());
    }

    #[tokio::test]
    async fn test_redundant_manager_declines() {
        let network = MockNetwork::serving_site();
        let manager = active_manager(network).await;
        manager.mark_redundant().await;
        let outcome = manager.handle_fetch(&get("/js/main.js")).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Declined(DeclineReason::NotActive));
    }

    #[tokio::test]
    async fn test_store_write_failure_does_not_change_response() {
        let network = MockNetwork::serving_site();
        network.serve("/img/new.png", 200, "png");
        let manager = active_manager(network).await;
        let mut failures = manager.writer().subscribe();

        assert!(manager.context().storage.delete("v1").await.unwrap());

        let image = served(manager.handle_fetch(&get("/img/new.png")).await.unwrap());
        assert_eq!(image.source, ResponseSource::Network);
        assert_eq!(image.response.body.as_ref(), b"png");

        let index = served(manager.handle_fetch(&page("/index.html")).await.unwrap());
        assert_eq!(index.source, ResponseSource::Network);
        assert_eq!(index.response.body.as_ref(), b"asset /index.html");

        manager.writer().flush().await;

        let mut failed_urls = vec![failures.try_recv().unwrap(), failures.try_recv().unwrap()]
            .into_iter()
            .inspect(|f| assert!(f.error.contains("store not found: v1")))
            .map(|f| f.url)
            .collect::<Vec<_>>();
        failed_urls.sort();
        assert_eq!(failed_urls, vec![url("/img/new.png").to_string(), url("/index.html").to_string()]);

        // Late writes never recreate the deleted store.
        assert!(manager.context().storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activate_continues_past_failed_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        let storage = CacheStorage::open(&path).await.unwrap();
        for name in ["v1", "locked", "v2"] {
            storage.open_store(name).await.unwrap();
        }

        let admin = tokio_rusqlite::Connection::open(&path).await.unwrap();
        admin
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER keep_locked BEFORE DELETE ON cache_stores
                     WHEN old.name = 'locked'
                     BEGIN SELECT RAISE(ABORT, 'store is locked'); END;",
                )
            })
            .await
            .unwrap();

        let ctx = WorkerContext::new(
            storage,
            "v3",
            Url::parse(ORIGIN).unwrap(),
            manifest(),
            MockNetwork::serving_site(),
        );
        let manager = CacheManager::new(ctx);
        manager.install().await.unwrap();
        let report = manager.activate().await.unwrap();

        assert_eq!(manager.state().await, WorkerState::Active);
        assert_eq!(report.deleted, vec!["v1".to_string(), "v2".to_string()]);
        assert_eq!(report.failed, vec!["locked".to_string()]);
        assert_eq!(
            manager.context().storage.keys().await.unwrap(),
            vec!["locked".to_string(), "v3".to_string()]
        );
    }
}
