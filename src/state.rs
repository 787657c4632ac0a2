use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::config::AppConfig;
use crate::fs::{DirectoryScanner, EntryFilter, PathResolver, UploadManager};
use crate::metrics::Metrics;
use crate::render::{JsonListingRenderer, ListingRenderer};
use crate::store::{AccessControlStore, SessionStore};

/// The shared application state.
///
/// Cheap to clone: every field is either an `Arc` or a handle around one, so all
/// handlers and interceptors see the same stores.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Confines client paths to `storage.root`.
    pub resolver: PathResolver,
    pub scanner: Arc<DirectoryScanner>,
    pub uploads: Arc<UploadManager>,
    pub bans: AccessControlStore,
    pub sessions: SessionStore,
    pub metrics: Metrics,
    pub renderer: Arc<dyn ListingRenderer>,
}

impl AppState {
    /// Builds the state around `config.storage.root`, which should already be
    /// canonical (see [`crate::config::ensure_root_dir`]).
    ///
    /// Bans listed in `security.banned_ips` are applied right away.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let filter = EntryFilter::from_config(&config.listing).context("invalid listing.excludes")?;
        let resolver = PathResolver::new(&config.storage.root);
        let uploads = UploadManager::new(resolver.clone(), config.upload.max_bytes);
        let bans = AccessControlStore::with_banned(config.security.banned_ips.iter().cloned());
        let sessions = SessionStore::new(Duration::from_secs(config.session.ttl_secs));

        Ok(Self {
            config: Arc::new(config),
            resolver,
            scanner: Arc::new(DirectoryScanner::new(filter)),
            uploads: Arc::new(uploads),
            bans,
            sessions,
            metrics: Metrics::new(),
            renderer: Arc::new(JsonListingRenderer),
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ListingRenderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
