use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

/// A thread-safe ban list keyed by client address.
///
/// An address is banned only if it maps to `true`; absent or `false` means allowed.
/// Nothing is persisted, the list starts over on every process start.
#[derive(Clone, Default)]
pub struct AccessControlStore {
    banned: Arc<RwLock<HashMap<String, bool>>>,
}

impl AccessControlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `addresses` already banned.
    pub fn with_banned<I, A>(addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let map = addresses.into_iter().map(|a| (a.into(), true)).collect();
        Self { banned: Arc::new(RwLock::new(map)) }
    }

    pub async fn ban(&self, address: impl Into<String>) {
        let address = address.into();
        tracing::info!("Banning client address {}", address);
        self.banned.write().await.insert(address, true);
    }

    /// Lifts a ban. Unknown addresses are a no-op.
    pub async fn unban(&self, address: &str) {
        if self.banned.write().await.remove(address).is_some() {
            tracing::info!("Unbanned client address {}", address);
        }
    }

    pub async fn is_banned(&self, address: &str) -> bool {
        self.banned.read().await.get(address).copied().unwrap_or(false)
    }

    /// Currently banned addresses, sorted.
    pub async fn banned(&self) -> Vec<String> {
        let mut items: Vec<String> =
            self.banned.read().await.iter().filter(|(_, banned)| **banned).map(|(a, _)| a.clone()).collect();
        items.sort();
        items
    }
}
