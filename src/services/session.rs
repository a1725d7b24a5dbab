// src/services/session.rs
// DOCUMENTATION: In-memory admin sessions
// PURPOSE: Map opaque session cookies to authenticated admin users

use crate::models::AdminUserResponse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "portfolio_session";

#[derive(Clone, Debug)]
struct SessionEntry {
    user: AdminUserResponse,
    last_seen: Instant,
}

/// Thread-safe session store with an idle timeout
/// DOCUMENTATION: A session expires once it has been idle for `ttl`;
/// every successful lookup refreshes it
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for the user and return its id
    pub async fn create(&self, user: AdminUserResponse) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.write().await;
        log::debug!("Session created for user {}", user.username);
        sessions.insert(
            id.clone(),
            SessionEntry {
                user,
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Resolve a session id, refreshing its idle timer
    /// Expired sessions are removed on access
    pub async fn get(&self, id: &str) -> Option<AdminUserResponse> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                entry.last_seen = Instant::now();
                Some(entry.user.clone())
            }
            Some(_) => {
                sessions.remove(id);
                log::debug!("Session expired");
                None
            }
            None => None,
        }
    }

    /// End a session; returns whether it existed
    pub async fn destroy(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Remove idle sessions, returning how many were dropped
    pub async fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            log::info!("Session cleanup: removed {} expired sessions ({} active)", removed, sessions.len());
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Periodically purge expired sessions
pub fn start_cleanup_task(store: Arc<SessionStore>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            interval.tick().await;
            store.cleanup().await;
        }
    });
}
