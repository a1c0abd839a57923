//! Host collaborator interfaces
//!
//! The pipeline never touches platform facilities directly; everything it
//! needs from its surroundings comes through the five small traits defined
//! here. A host embedding the library implements these once and hands them to
//! [`crate::MediaContext`]. Production implementations suitable for a plain
//! filesystem host (and for the CLI binary) live alongside the traits.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

/// A readable byte stream for resolved media. The caller owns the stream and
/// closes it by dropping it.
pub type MediaStream = Box<dyn Read + Send>;

/// Capability required to read removable/external storage.
pub const READ_EXTERNAL_STORAGE: &str = "ReadExternalStorage";

/// Store of bundled, read-only assets addressed by name.
pub trait AssetStore: Send + Sync {
    /// List all bundled names, in a stable order.
    fn list_names(&self) -> io::Result<Vec<String>>;

    /// Open an asset by exact name. Fails if the name does not match exactly;
    /// case-insensitive fallback is the resolver's job, not the store's.
    fn open(&self, name: &str) -> io::Result<MediaStream>;
}

/// Synchronous permission oracle.
pub trait PermissionHost: Send + Sync {
    /// Whether the named capability has been granted.
    fn has_capability(&self, capability: &str) -> bool;
}

/// Opens streams for opaque, provider-mediated content handles.
pub trait ContentResolver: Send + Sync {
    /// Open a stream for a content handle.
    fn open_stream(&self, handle: &str) -> io::Result<MediaStream>;

    /// Open the photo stream for a contact handle. `Ok(None)` means the
    /// contact exists but has no photo; that is expected, not exceptional.
    fn open_contact_photo(&self, handle: &str) -> io::Result<Option<MediaStream>>;
}

/// Display geometry and density, used to budget image decoding.
pub trait DisplayOracle: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn density_scale(&self) -> f32;
    fn compatibility_mode(&self) -> bool;
}

/// Fire-and-forget background execution.
pub trait TaskRunner: Send + Sync {
    /// Schedule a task on a background execution context. The pipeline never
    /// observes a return value and never cancels a scheduled task.
    fn schedule(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Asset store backed by a flat directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirAssetStore {
    fn list_names(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // read_dir order is platform-dependent; sort for a stable listing
        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<MediaStream> {
        let file = File::open(self.root.join(name))?;
        Ok(Box::new(file))
    }
}

/// Permission host holding a fixed set of granted capabilities.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<String>,
    allow_all: bool,
}

impl StaticPermissions {
    /// Grants everything. The default for standalone hosts that own their
    /// filesystem outright.
    pub fn allow_all() -> Self {
        Self { granted: HashSet::new(), allow_all: true }
    }

    /// Grants nothing until capabilities are added with [`Self::grant`].
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn grant(mut self, capability: &str) -> Self {
        self.granted.insert(capability.to_string());
        self
    }
}

impl PermissionHost for StaticPermissions {
    fn has_capability(&self, capability: &str) -> bool {
        self.allow_all || self.granted.contains(capability)
    }
}

/// Content resolver for hosts without a content provider: every handle is
/// absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullContentResolver;

impl ContentResolver for NullContentResolver {
    fn open_stream(&self, handle: &str) -> io::Result<MediaStream> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no content provider for {handle}"),
        ))
    }

    fn open_contact_photo(&self, _handle: &str) -> io::Result<Option<MediaStream>> {
        Ok(None)
    }
}

/// Display oracle reporting fixed values.
#[derive(Debug, Clone, Copy)]
pub struct FixedDisplay {
    pub width: u32,
    pub height: u32,
    pub density_scale: f32,
    pub compatibility_mode: bool,
}

impl Default for FixedDisplay {
    fn default() -> Self {
        Self { width: 1280, height: 800, density_scale: 1.0, compatibility_mode: false }
    }
}

impl DisplayOracle for FixedDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn density_scale(&self) -> f32 {
        self.density_scale
    }

    fn compatibility_mode(&self) -> bool {
        self.compatibility_mode
    }
}

/// Runner that detaches a plain OS thread per task. Usable without an async
/// runtime, which also makes it the default for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn schedule(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        std::thread::spawn(task);
    }
}

/// Runner that schedules onto a tokio runtime's blocking pool. The pipeline
/// body is blocking I/O, so `spawn_blocking` is the right lane.
#[derive(Debug, Clone)]
pub struct TokioRunner {
    handle: tokio::runtime::Handle,
}

impl TokioRunner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Runner for the runtime the caller is currently inside.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, same as
    /// [`tokio::runtime::Handle::current`].
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl TaskRunner for TokioRunner {
    fn schedule(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        debug!("scheduling media task on blocking pool");
        self.handle.spawn_blocking(task);
    }
}
