//! Shared session context
//!
//! [`MediaContext`] is the owning scope for everything the pipeline shares
//! across requests: the host collaborators, the resolved configuration, and
//! the two long-lived caches. One context corresponds to one hosting session;
//! clone the `Arc` and hand it to every request. The caches start empty and
//! need no teardown beyond dropping the context (dropping also removes any
//! temp files the session materialized).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use once_cell::sync::OnceCell;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::MediaConfig;
use crate::host::{
    AssetStore, ContentResolver, DirAssetStore, DisplayOracle, FixedDisplay, NullContentResolver,
    PermissionHost, StaticPermissions, TaskRunner, ThreadRunner,
};
use crate::{Error, Result};

/// Live-development session state.
///
/// During live development the bundled assets are mirrored into a local
/// directory by a companion tool; until that synchronization completes,
/// asset-classified paths keep resolving through the asset store.
#[derive(Debug)]
pub struct LiveSession {
    asset_dir: PathBuf,
    assets_synced: AtomicBool,
}

impl LiveSession {
    /// New live session with assets not yet synchronized.
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self { asset_dir: asset_dir.into(), assets_synced: AtomicBool::new(false) }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn assets_synced(&self) -> bool {
        self.assets_synced.load(Ordering::Acquire)
    }

    /// Record that the companion tool finished mirroring the assets.
    pub fn mark_assets_synced(&self) {
        self.assets_synced.store(true, Ordering::Release);
    }
}

/// Shared state for one hosting session.
pub struct MediaContext {
    assets: Arc<dyn AssetStore>,
    permissions: Arc<dyn PermissionHost>,
    content: Arc<dyn ContentResolver>,
    display: Arc<dyn DisplayOracle>,
    runner: Arc<dyn TaskRunner>,
    config: MediaConfig,
    live_session: Option<LiveSession>,

    /// requested asset name -> case-correct bundled name. Read-mostly,
    /// populated lazily, never invalidated (bundled names do not change at
    /// runtime).
    path_cache: RwLock<HashMap<String, String>>,

    /// requested path -> materialized temp file. An entry is only trusted
    /// while its file still exists on disk.
    temp_cache: Mutex<HashMap<String, NamedTempFile>>,

    /// Blocking HTTP client, built on first remote fetch. Transport-level
    /// redirect following is disabled; the resolver follows hops itself.
    http: OnceCell<reqwest::blocking::Client>,
}

impl MediaContext {
    pub fn builder() -> MediaContextBuilder {
        MediaContextBuilder::default()
    }

    pub fn assets(&self) -> &dyn AssetStore {
        self.assets.as_ref()
    }

    pub fn content(&self) -> &dyn ContentResolver {
        self.content.as_ref()
    }

    pub fn display(&self) -> &dyn DisplayOracle {
        self.display.as_ref()
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn live_session(&self) -> Option<&LiveSession> {
        self.live_session.as_ref()
    }

    /// The background runner, cloned for scheduling from a context that is
    /// itself about to move into the task.
    pub fn runner(&self) -> Arc<dyn TaskRunner> {
        Arc::clone(&self.runner)
    }

    /// Fail with the wire-protocol permission error unless the host has
    /// granted `capability`.
    pub fn assert_capability(&self, capability: &str) -> Result<()> {
        if self.permissions.has_capability(capability) {
            Ok(())
        } else {
            debug!("capability {capability} not granted");
            Err(Error::PermissionDenied(capability.to_string()))
        }
    }

    /// Local path of a live-session asset.
    pub(crate) fn live_asset_path(&self, path: &str) -> Result<PathBuf> {
        match &self.live_session {
            Some(live) => Ok(live.asset_dir().join(path)),
            None => Err(Error::MediaNotFound(path.to_string())),
        }
    }

    pub(crate) fn http_client(&self) -> Result<&reqwest::blocking::Client> {
        self.http.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .map_err(Error::from)
        })
    }

    pub(crate) fn cached_resolved_name(&self, requested: &str) -> Option<String> {
        let cache = self.path_cache.read().unwrap_or_else(|e| e.into_inner());
        cache.get(requested).cloned()
    }

    pub(crate) fn store_resolved_name(&self, requested: &str, resolved: &str) {
        let mut cache = self.path_cache.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(requested.to_string(), resolved.to_string());
    }

    /// Path of a cached temp file, if the mapping is still valid. A mapping
    /// whose file has vanished is treated as a miss and left for the next
    /// publish to overwrite.
    pub(crate) fn cached_temp_file(&self, path: &str) -> Option<PathBuf> {
        let cache = self.lock_temp_cache();
        let file = cache.get(path)?;
        if file.path().exists() {
            Some(file.path().to_path_buf())
        } else {
            None
        }
    }

    /// Publish a materialized temp file. Concurrent first requests for the
    /// same path race here; the last writer wins. A superseded file is kept
    /// on disk (not deleted) in case its path was already handed out.
    pub(crate) fn store_temp_file(&self, path: &str, file: NamedTempFile) {
        let mut cache = self.lock_temp_cache();
        if let Some(previous) = cache.insert(path.to_string(), file) {
            debug!("temp file for {path} superseded by a racing copy");
            let _ = previous.keep();
        }
    }

    fn lock_temp_cache(&self) -> MutexGuard<'_, HashMap<String, NamedTempFile>> {
        self.temp_cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for MediaContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaContext")
            .field("config", &self.config)
            .field("live_session", &self.live_session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`MediaContext`] with production defaults: a directory asset
/// store rooted at `assets/`, allow-all permissions, no content provider, a
/// fixed display, and a plain-thread runner.
pub struct MediaContextBuilder {
    assets: Arc<dyn AssetStore>,
    permissions: Arc<dyn PermissionHost>,
    content: Arc<dyn ContentResolver>,
    display: Arc<dyn DisplayOracle>,
    runner: Arc<dyn TaskRunner>,
    config: MediaConfig,
    live_session: Option<LiveSession>,
}

impl Default for MediaContextBuilder {
    fn default() -> Self {
        Self {
            assets: Arc::new(DirAssetStore::new("assets")),
            permissions: Arc::new(StaticPermissions::allow_all()),
            content: Arc::new(NullContentResolver),
            display: Arc::new(FixedDisplay::default()),
            runner: Arc::new(ThreadRunner),
            config: MediaConfig::default(),
            live_session: None,
        }
    }
}

impl MediaContextBuilder {
    pub fn assets(mut self, assets: impl AssetStore + 'static) -> Self {
        self.assets = Arc::new(assets);
        self
    }

    pub fn permissions(mut self, permissions: impl PermissionHost + 'static) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    pub fn content(mut self, content: impl ContentResolver + 'static) -> Self {
        self.content = Arc::new(content);
        self
    }

    pub fn display(mut self, display: impl DisplayOracle + 'static) -> Self {
        self.display = Arc::new(display);
        self
    }

    pub fn runner(mut self, runner: impl TaskRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    pub fn config(mut self, config: MediaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn live_session(mut self, live_session: LiveSession) -> Self {
        self.live_session = Some(live_session);
        self
    }

    pub fn build(self) -> Arc<MediaContext> {
        Arc::new(MediaContext {
            assets: self.assets,
            permissions: self.permissions,
            content: self.content,
            display: self.display,
            runner: self.runner,
            config: self.config,
            live_session: self.live_session,
            path_cache: RwLock::new(HashMap::new()),
            temp_cache: Mutex::new(HashMap::new()),
            http: OnceCell::new(),
        })
    }
}
