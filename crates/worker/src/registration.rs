//! Version hand-over between cache managers.
//!
//! A registration holds at most one installing, one waiting and one active
//! manager. A waiting manager is promoted once it asked to skip waiting or
//! the active version controls no open client.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use precache_core::{Error, Request};

use crate::pipeline::DeclineReason;
use crate::{CacheManager, ClientInfo, ClientRegistry, FetchOutcome, WorkerState};

#[derive(Default)]
struct Slots {
    installing: Option<Arc<CacheManager>>,
    waiting: Option<Arc<CacheManager>>,
    active: Option<Arc<CacheManager>>,
    /// Superseded managers whose background writes may still be running.
    retired: Vec<Arc<CacheManager>>,
}

impl Slots {
    async fn retire(&mut self, manager: Arc<CacheManager>) {
        manager.mark_redundant().await;
        let mut kept = Vec::with_capacity(self.retired.len() + 1);
        for old in self.retired.drain(..) {
            if old.writer().pending().await > 0 {
                kept.push(old);
            }
        }
        kept.push(manager);
        self.retired = kept;
    }
}

/// Version and state of one registered manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerInfo {
    pub version: String,
    pub state: WorkerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationStatus {
    pub installing: Option<WorkerInfo>,
    pub waiting: Option<WorkerInfo>,
    pub active: Option<WorkerInfo>,
    pub clients: Vec<ClientInfo>,
}

pub struct Registration {
    clients: ClientRegistry,
    slots: RwLock<Slots>,
    /// Serialises updates and promotions.
    lifecycle: Mutex<()>,
}

impl Registration {
    pub fn new(clients: ClientRegistry) -> Self {
        Self { clients, slots: RwLock::new(Slots::default()), lifecycle: Mutex::new(()) }
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub async fn active(&self) -> Option<Arc<CacheManager>> {
        self.slots.read().await.active.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<CacheManager>> {
        self.slots.read().await.waiting.clone()
    }

    /// Install `manager` and promote it if nothing holds it back.
    ///
    /// A manager whose version is already active or waiting is not installed
    /// again; the existing one's state is returned.
    ///
    /// # Errors
    ///
    /// Returns the install error; the registration is left as it was and the
    /// same manager may be passed in again.
    pub async fn update(&self, manager: Arc<CacheManager>) -> Result<WorkerState, Error> {
        let _lifecycle = self.lifecycle.lock().await;

        let existing = {
            let slots = self.slots.read().await;
            [&slots.active, &slots.waiting]
                .into_iter()
                .flatten()
                .find(|m| m.version() == manager.version())
                .cloned()
        };
        if let Some(existing) = existing {
            tracing::info!(version = %manager.version(), "version already registered");
            return Ok(existing.state().await);
        }

        self.slots.write().await.installing = Some(manager.clone());
        let installed = manager.install().await;

        {
            let mut slots = self.slots.write().await;
            slots.installing = None;
            installed?;
            if let Some(previous) = slots.waiting.replace(manager.clone()) {
                slots.retire(previous).await;
            }
        }

        self.promote_locked().await?;
        Ok(manager.state().await)
    }

    /// Deliver a control message to the waiting (or installing) manager.
    /// Returns whether the message was recognised.
    ///
    /// # Errors
    ///
    /// Returns an activation error if the message triggered promotion.
    pub async fn post_message(&self, payload: &serde_json::Value) -> Result<bool, Error> {
        let target = {
            let slots = self.slots.read().await;
            slots.waiting.clone().or_else(|| slots.installing.clone())
        };
        let Some(target) = target else {
            tracing::debug!("no waiting or installing version to receive message");
            return Ok(false);
        };

        if !target.post_message(payload) {
            return Ok(false);
        }

        let _lifecycle = self.lifecycle.lock().await;
        self.promote_locked().await?;
        Ok(true)
    }

    /// Route a request from `client_id` to the version controlling it.
    ///
    /// A client seen for the first time is a navigation and comes under the
    /// active version's control. Requests without a client id go to the
    /// active version.
    pub async fn fetch(&self, client_id: Option<&str>, request: &Request) -> Result<FetchOutcome, Error> {
        let active = self.active().await;

        let controller = match client_id {
            Some(id) => {
                self.clients.open(id, active.as_ref().map(|m| m.version())).await;
                self.clients.controller_of(id).await
            }
            None => active.as_ref().map(|m| m.version().to_string()),
        };

        match active {
            Some(manager) if controller.as_deref() == Some(manager.version()) => manager.handle_fetch(request).await,
            _ => Ok(FetchOutcome::Declined(DeclineReason::NotActive)),
        }
    }

    /// Unload a client; the last client of the active version closing lets
    /// a waiting version take over.
    pub async fn close_client(&self, client_id: &str) -> Result<bool, Error> {
        let closed = self.clients.close(client_id).await;
        if closed {
            let _lifecycle = self.lifecycle.lock().await;
            self.promote_locked().await?;
        }
        Ok(closed)
    }

    pub async fn status(&self) -> RegistrationStatus {
        let (installing, waiting, active) = {
            let slots = self.slots.read().await;
            (slots.installing.clone(), slots.waiting.clone(), slots.active.clone())
        };
        RegistrationStatus {
            installing: info(installing).await,
            waiting: info(waiting).await,
            active: info(active).await,
            clients: self.clients.list().await,
        }
    }

    /// Wait for the background writes of every manager still held, including
    /// superseded ones.
    pub async fn flush(&self) {
        let managers: Vec<Arc<CacheManager>> = {
            let mut slots = self.slots.write().await;
            let held = [&slots.installing, &slots.waiting, &slots.active]
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>();
            held.into_iter().chain(slots.retired.drain(..)).collect()
        };
        for manager in managers {
            manager.writer().flush().await;
        }
    }

    /// Promote the waiting manager if allowed. Caller holds `lifecycle`.
    async fn promote_locked(&self) -> Result<(), Error> {
        let (waiting, active) = {
            let slots = self.slots.read().await;
            (slots.waiting.clone(), slots.active.clone())
        };
        let Some(waiting) = waiting else {
            return Ok(());
        };

        if !waiting.wants_skip_waiting()
            && let Some(active) = &active
        {
            let in_use = self.clients.controlled_by(active.version()).await;
            if in_use > 0 {
                tracing::info!(
                    waiting = %waiting.version(),
                    active = %active.version(),
                    clients = in_use,
                    "waiting for clients of the active version to close"
                );
                return Ok(());
            }
        }

        waiting.activate().await?;

        let mut slots = self.slots.write().await;
        slots.waiting = None;
        if let Some(previous) = slots.active.replace(waiting) {
            slots.retire(previous).await;
        }
        Ok(())
    }
}

async fn info(manager: Option<Arc<CacheManager>>) -> Option<WorkerInfo> {
    let manager = manager?;
    Some(WorkerInfo { version: manager.version().to_string(), state: manager.state().await })
}
