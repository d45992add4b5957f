//! Registry of live edit sessions.
//!
//! Each session owns one [`EditSession`] behind its own mutex, so calls
//! against one session are serialized while different sessions proceed
//! independently. Sessions left idle longer than the store's TTL are evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::Hierarchy;
use crate::reconcile::EditSession;

/// A shared reference to one registered session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub session: Arc<Mutex<EditSession>>,
}

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_touched: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_touched) > ttl
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a new session over a freshly loaded tree.
    pub async fn create(&self, tree: Hierarchy) -> SessionHandle {
        let handle = SessionHandle {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            session: Arc::new(Mutex::new(EditSession::new(tree))),
        };

        self.sessions.write().await.insert(
            handle.id,
            Entry {
                handle: handle.clone(),
                last_touched: Instant::now(),
            },
        );
        tracing::debug!("Created edit session {}", handle.id);
        handle
    }

    /// Look up a session and mark it as used. An expired session is removed
    /// and reported as missing.
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let entry = sessions.get_mut(id)?;
        if entry.is_expired(now, self.ttl) {
            sessions.remove(id);
            tracing::info!("Edit session {} expired", id);
            return None;
        }
        entry.last_touched = now;
        Some(entry.handle.clone())
    }

    /// Forget a session. Callers still holding its handle keep a working copy.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!("Removed edit session {}", id);
        }
        removed
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were dropped.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - sessions.len()
    }

    /// Run [`SessionStore::evict_expired`] periodically.
    pub fn spawn_eviction(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    tracing::info!("Evicted {} idle edit session(s)", evicted);
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
