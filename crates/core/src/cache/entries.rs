//! Snapshot operations within one named store.
//!
//! A [`Cache`] handle is bound to a store name. Operations on a store that has
//! since been deleted see it as empty, and writes to it fail with
//! `Error::StoreNotFound`.

use super::connection::CacheStorage;
use crate::{Error, Request, Response, ResponseType};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Row};

const UPSERT_ENTRY: &str = "INSERT INTO cache_entries (
        store_id, request_key, method, url, response_url, status,
        response_type, headers_json, body, stored_at
    ) SELECT id, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10 FROM cache_stores WHERE name = ?1
    ON CONFLICT(store_id, request_key) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        response_url = excluded.response_url,
        status = excluded.status,
        response_type = excluded.response_type,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

const SELECT_SNAPSHOT: &str = "SELECT s.name, e.request_key, e.method, e.url, e.response_url, e.status,
        e.response_type, e.headers_json, e.body, e.stored_at
    FROM cache_entries e
    JOIN cache_stores s ON s.id = e.store_id
    WHERE s.name = ?1 AND e.request_key = ?2";

/// A stored response snapshot.
///
/// Immutable once written; a later write for the same request replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub store: String,
    pub request_key: String,
    pub method: String,
    pub url: String,
    pub response: Response,
    pub stored_at: String,
}

/// Identity of a stored request, as listed by [`Cache::keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedRequest {
    pub method: String,
    pub url: String,
}

/// Handle to one named store.
#[derive(Clone, Debug)]
pub struct Cache {
    storage: CacheStorage,
    name: String,
}

/// Row image of a snapshot ready to bind as statement parameters.
struct EntryRow {
    key: String,
    method: String,
    url: String,
    response_url: String,
    status: u16,
    response_type: &'static str,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::CorruptSnapshot(format!("failed to encode headers: {e}")))?;
        Ok(Self {
            key: request.cache_key(),
            method: request.method.clone(),
            url: request.cache_url(),
            response_url: response.url.clone(),
            status: response.status,
            response_type: response.response_type.as_str(),
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, store: &str, stored_at: &str) -> Result<usize, rusqlite::Error> {
        conn.execute(
            UPSERT_ENTRY,
            params![
                store,
                &self.key,
                &self.method,
                &self.url,
                &self.response_url,
                self.status,
                self.response_type,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )
    }
}

/// Decode a snapshot row selected in `SELECT_SNAPSHOT` column order.
pub(crate) fn read_snapshot(row: &Row<'_>) -> rusqlite::Result<Result<Snapshot, Error>> {
    let store: String = row.get(0)?;
    let request_key: String = row.get(1)?;
    let method: String = row.get(2)?;
    let url: String = row.get(3)?;
    let response_url: String = row.get(4)?;
    let status: u16 = row.get(5)?;
    let response_type: String = row.get(6)?;
    let headers_json: String = row.get(7)?;
    let body: Vec<u8> = row.get(8)?;
    let stored_at: String = row.get(9)?;

    let Some(response_type) = ResponseType::parse(&response_type) else {
        return Ok(Err(Error::CorruptSnapshot(format!("unknown response type {response_type} for {url}"))));
    };
    let headers: Vec<(String, String)> = match serde_json::from_str(&headers_json) {
        Ok(headers) => headers,
        Err(e) => return Ok(Err(Error::CorruptSnapshot(format!("bad headers for {url}: {e}")))),
    };

    Ok(Ok(Snapshot {
        store,
        request_key,
        method,
        url,
        response: Response { url: response_url, status, response_type, headers, body: Bytes::from(body) },
        stored_at,
    }))
}

impl Cache {
    pub(crate) fn new(storage: CacheStorage, name: &str) -> Self {
        Self { storage, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a snapshot of `response` under `request`, replacing any previous
    /// snapshot for the same request.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        let row = EntryRow::new(request, response)?;
        let name = self.name.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.storage
            .conn
            .call(move |conn| -> Result<(), Error> {
                if row.insert(conn, &name, &now)? == 0 {
                    return Err(Error::StoreNotFound(name));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store every pair in one transaction. Either all snapshots are written or
    /// none are.
    pub async fn put_all(&self, entries: &[(Request, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(req, resp)| EntryRow::new(req, resp))
            .collect::<Result<Vec<_>, _>>()?;
        let name = self.name.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.storage
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    if row.insert(&tx, &name, &now)? == 0 {
                        return Err(Error::StoreNotFound(name));
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Snapshot stored for exactly this request, if any.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Snapshot>, Error> {
        let name = self.name.clone();
        let key = request.cache_key();
        self.storage
            .conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let row = conn
                    .query_row(SELECT_SNAPSHOT, params![name, key], read_snapshot)
                    .optional()?;
                row.transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the snapshot for this request. Returns false if none existed.
    pub async fn delete(&self, request: &Request) -> Result<bool, Error> {
        let name = self.name.clone();
        let key = request.cache_key();
        self.storage
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries
                     WHERE request_key = ?2
                     AND store_id = (SELECT id FROM cache_stores WHERE name = ?1)",
                    params![name, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Stored requests in insertion order.
    pub async fn keys(&self) -> Result<Vec<CachedRequest>, Error> {
        let name = self.name.clone();
        self.storage
            .conn
            .call(move |conn| -> Result<Vec<CachedRequest>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.method, e.url FROM cache_entries e
                     JOIN cache_stores s ON s.id = e.store_id
                     WHERE s.name = ?1
                     ORDER BY e.rowid ASC",
                )?;
                let keys = stmt
                    .query_map(params![name], |row| Ok(CachedRequest { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> Result<usize, Error> {
        let name = self.name.clone();
        self.storage
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries e
                     JOIN cache_stores s ON s.id = e.store_id
                     WHERE s.name = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
