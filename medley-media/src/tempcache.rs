//! Temp-file materialization
//!
//! Playback sinks frequently need a local filesystem path rather than an
//! open stream, and content-handle or remote sources are not
//! path-addressable. Materializing copies the resolved stream into a
//! uniquely-named temp file once per path; subsequent requests reuse the
//! copy for as long as the file survives on disk. The session context keeps
//! the file handles, so cached copies are cleaned up when the session ends.
//!
//! Same-path first requests are deliberately not serialized: concurrent
//! misses may each copy the source, and the last published mapping wins.

use std::io;
use std::path::PathBuf;

use tempfile::{Builder, NamedTempFile};
use tracing::{error, info};

use crate::context::MediaContext;
use crate::resolver::open_media_as;
use crate::source::{classify, SourceKind};
use crate::Result;

/// Filename prefix for materialized media.
const TEMP_FILE_PREFIX: &str = "medley-media-";

/// Materialize `path` into the session temp-file cache and return the local
/// file path. Idempotent while the cached file exists; a file deleted behind
/// the cache's back is detected and recopied.
pub fn materialize(ctx: &MediaContext, path: &str) -> Result<PathBuf> {
    cache_temp_file(ctx, path, classify(ctx, path))
}

pub(crate) fn cache_temp_file(ctx: &MediaContext, path: &str, kind: SourceKind) -> Result<PathBuf> {
    if let Some(existing) = ctx.cached_temp_file(path) {
        return Ok(existing);
    }

    info!("copying media {path} to temp file");
    let file = copy_media_as(ctx, path, kind)?;
    let local = file.path().to_path_buf();
    info!("finished copying media {path} to temp file {}", local.display());
    ctx.store_temp_file(path, file);
    Ok(local)
}

/// One-shot copy of `path` into a fresh temp file, bypassing the cache. The
/// returned handle deletes the file when dropped; keep it alive for as long
/// as the copy is needed.
pub fn copy_media_to_temp_file(ctx: &MediaContext, path: &str) -> Result<NamedTempFile> {
    copy_media_as(ctx, path, classify(ctx, path))
}

fn copy_media_as(ctx: &MediaContext, path: &str, kind: SourceKind) -> Result<NamedTempFile> {
    let mut stream = open_media_as(ctx, path, kind)?;

    let mut file = match &ctx.config().temp_dir {
        Some(dir) => Builder::new().prefix(TEMP_FILE_PREFIX).tempfile_in(dir)?,
        None => Builder::new().prefix(TEMP_FILE_PREFIX).tempfile()?,
    };

    match io::copy(&mut stream, file.as_file_mut()) {
        Ok(_) => Ok(file),
        Err(e) => {
            error!(
                "could not copy media {path} to temp file {}: {e}",
                file.path().display()
            );
            // Dropping the handle removes the partially written file.
            Err(e.into())
        }
    }
}
