//! Request-keyed cache identity.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// Only the method and URL participate; request headers never do, so `Vary`
/// is not honored.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
