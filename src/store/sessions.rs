use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use tokio::sync::RwLock;

/// Raw bytes of entropy in a session id (hex encoded to twice as many chars).
const SESSION_ID_BYTES: usize = 32;

/// A short-lived record of per-client state.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub data: HashMap<String, serde_json::Value>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Thread-safe store of [`Session`]s.
///
/// Expiry is advisory for [`SessionStore::get`]: an expired session is still
/// returned until something purges it. [`SessionStore::get_valid`] and
/// [`SessionStore::set`] purge expired sessions they come across.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Starts a new, empty session and returns its id.
    pub async fn create(&self) -> String {
        let id = generate_session_id();
        let session = Session { id: id.clone(), data: HashMap::new(), expires_at: Utc::now() + self.ttl };
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(id.clone(), session);
        id
    }

    /// Looks up a session, expired or not.
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Looks up a session, treating (and purging) expired ones as absent.
    pub async fn get_valid(&self, id: &str) -> Option<Session> {
        let session = self.get(id).await?;
        if Self::is_expired(&session) {
            self.purge_if_expired(id).await;
            return None;
        }
        Some(session)
    }

    /// Stores `key = value` in a live session. Returns `false` if the session is
    /// unknown or expired; an expired session is removed on the way.
    pub async fn set(&self, id: &str, key: impl Into<String>, value: serde_json::Value) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if !session.is_expired_at(Utc::now()) => {
                session.data.insert(key.into(), value);
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    pub fn is_expired(session: &Session) -> bool {
        session.is_expired_at(Utc::now())
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    async fn purge_if_expired(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        // Re-check under the write lock; the session may have been replaced meanwhile.
        if sessions.get(id).map(Self::is_expired).unwrap_or(false) {
            sessions.remove(id);
        }
    }
}

/// 32 bytes from the OS RNG, hex encoded.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
