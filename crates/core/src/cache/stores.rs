//! Named store operations.
//!
//! Mirrors the storage-wide half of a browser cache API: open (create if
//! absent), has, keys, delete, and matching across every store.

use super::connection::CacheStorage;
use super::entries::{Cache, Snapshot, read_snapshot};
use crate::{Error, Request};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

impl CacheStorage {
    /// Open the named store, creating it if absent.
    pub async fn open_store(&self, name: &str) -> Result<Cache, Error> {
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Cache::new(self.clone(), name))
    }

    /// Handle to the named store without creating it.
    ///
    /// Writes through the handle fail with `Error::StoreNotFound` once the
    /// store is gone, so a late write never brings a deleted store back.
    pub fn store(&self, name: &str) -> Cache {
        Cache::new(self.clone(), name)
    }

    /// Whether a store with this name exists.
    pub async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every store, in creation order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had this name.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Find a snapshot for `request` in any store, searching stores in
    /// creation order.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Snapshot>, Error> {
        let key = request.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let row = conn
                    .query_row(
                        "SELECT s.name, e.request_key, e.method, e.url, e.response_url, e.status,
                                e.response_type, e.headers_json, e.body, e.stored_at
                         FROM cache_entries e
                         JOIN cache_stores s ON s.id = e.store_id
                         WHERE e.request_key = ?1
                         ORDER BY s.id ASC
                         LIMIT 1",
                        params![key],
                        read_snapshot,
                    )
                    .optional()?;
                row.transpose()
            })
            .await
            .map_err(Error::from)
    }
}
