//! Registry of open clients and the cache version controlling each.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One open client and its controlling version, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub id: String,
    pub controller: Option<String>,
}

/// Shared set of open clients.
///
/// Cloning shares the underlying map, so every version of the manager and
/// the registration see the same clients.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<String, Option<String>>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a client (a navigation). Returns false if it was already open,
    /// in which case its controller is left unchanged.
    pub async fn open(&self, id: &str, controller: Option<&str>) -> bool {
        let mut clients = self.clients.write().await;
        if clients.contains_key(id) {
            return false;
        }
        clients.insert(id.to_string(), controller.map(str::to_string));
        tracing::debug!(client = id, controller = ?controller, "client opened");
        true
    }

    /// Remove a client (page unload). Returns false if it was not open.
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.clients.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(client = id, "client closed");
        }
        removed
    }

    /// Put every open client under `controller`. Returns how many clients
    /// changed controller.
    pub async fn claim(&self, controller: &str) -> usize {
        let mut clients = self.clients.write().await;
        let mut claimed = 0;
        for current in clients.values_mut() {
            if current.as_deref() != Some(controller) {
                *current = Some(controller.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.clients.read().await.contains_key(id)
    }

    pub async fn controller_of(&self, id: &str) -> Option<String> {
        self.clients.read().await.get(id).cloned().flatten()
    }

    /// Number of open clients controlled by `controller`.
    pub async fn controlled_by(&self, controller: &str) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|c| c.as_deref() == Some(controller))
            .count()
    }

    /// All open clients, ordered by id.
    pub async fn list(&self) -> Vec<ClientInfo> {
        let mut list: Vec<ClientInfo> = self
            .clients
            .read()
            .await
            .iter()
            .map(|(id, controller)| ClientInfo { id: id.clone(), controller: controller.clone() })
            .collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}
