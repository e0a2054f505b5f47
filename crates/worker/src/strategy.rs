//! Network-first and cache-first strategies.

use tokio::sync::oneshot;

use precache_core::{Error, Request, Response};

use crate::manager::{ResponseSource, Served};
use crate::{BackgroundWriter, WorkerContext};

/// Try the network; store and return a live response. On network failure
/// fall back to the cached copy, then to the offline page, then fail with
/// the network error.
///
/// The fetch and its cache write run detached, so a caller that goes away
/// does not cancel them.
pub(crate) async fn network_first(
    ctx: &WorkerContext, writer: &BackgroundWriter, request: &Request,
) -> Result<Served, Error> {
    let (tx, rx) = oneshot::channel();
    let network = ctx.network.clone();
    let storage = ctx.storage.clone();
    let cache_name = ctx.cache_name.clone();
    let owned = request.clone();

    writer
        .spawn(request.url.to_string(), async move {
            match network.fetch(&owned).await {
                Ok(response) => {
                    let copy = response.clone();
                    let _ = tx.send(Ok(response));
                    storage.store(&cache_name).put(&owned, &copy).await
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    Ok(())
                }
            }
        })
        .await;

    let network_error = match rx.await {
        Ok(Ok(response)) => return Ok(Served { response, source: ResponseSource::Network }),
        Ok(Err(e)) => e,
        Err(_) => Error::Network(format!("fetch task for {} ended without a result", request.url)),
    };

    tracing::debug!(url = %request.url, error = %network_error, "network failed, trying cache");

    if let Some(response) = lookup(ctx, request).await {
        return Ok(Served { response, source: ResponseSource::Cache });
    }

    let offline = Request::get(ctx.manifest.offline_url(&ctx.origin)?);
    if let Some(response) = lookup(ctx, &offline).await {
        return Ok(Served { response, source: ResponseSource::OfflineFallback });
    }

    tracing::warn!(url = %request.url, "offline and no fallback page cached");
    Err(network_error)
}

/// Serve from cache without touching the network; on a miss fetch, and store
/// valid (200, basic) responses in the background.
pub(crate) async fn cache_first(
    ctx: &WorkerContext, writer: &BackgroundWriter, request: &Request,
) -> Result<Served, Error> {
    if let Some(response) = lookup(ctx, request).await {
        tracing::debug!(url = %request.url, "cache hit");
        return Ok(Served { response, source: ResponseSource::Cache });
    }

    tracing::debug!(url = %request.url, "cache miss");
    let response = ctx.network.fetch(request).await?;

    if !response.is_cacheable() {
        tracing::debug!(
            url = %request.url,
            status = response.status,
            response_type = response.response_type.as_str(),
            "not caching response"
        );
        return Ok(Served { response, source: ResponseSource::Network });
    }

    store_in_background(ctx, writer, request, &response).await;
    Ok(Served { response, source: ResponseSource::Network })
}

async fn store_in_background(ctx: &WorkerContext, writer: &BackgroundWriter, request: &Request, response: &Response) {
    let storage = ctx.storage.clone();
    let cache_name = ctx.cache_name.clone();
    let request = request.clone();
    let copy = response.clone();
    writer
        .spawn(request.url.to_string(), async move {
            storage.store(&cache_name).put(&request, &copy).await
        })
        .await;
}

/// Storage-wide lookup. A failing lookup is treated as a miss.
async fn lookup(ctx: &WorkerContext, request: &Request) -> Option<Response> {
    match ctx.storage.match_request(request).await {
        Ok(hit) => hit.map(|snapshot| snapshot.response),
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
            None
        }
    }
}
