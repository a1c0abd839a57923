//! Playback sink loaders
//!
//! Sound, player, and video sinks are host-provided devices; the loaders
//! here only decide *what* to hand them for a given media path. Each sink
//! class has its own per-kind policy: sound sinks always need a local file,
//! players can stream a URL directly, video sinks need a file for anything
//! not provider-mediated. Contact paths are image-only and fail hard for
//! every sink.

use std::path::Path;

use tracing::debug;

use crate::context::MediaContext;
use crate::host::READ_EXTERNAL_STORAGE;
use crate::resolver::require_storage_capability_if_external;
use crate::source::{classify, file_url_to_path, SourceKind};
use crate::tempcache::cache_temp_file;
use crate::{Error, Result};

/// Sink that plays short sounds from local files (a sound pool).
pub trait SoundSink {
    /// Load a local audio file, returning the sink's id for the sound.
    fn load_file(&mut self, path: &Path) -> Result<i32>;
}

/// Sink that plays audio or video from a file, a streaming URL, or a
/// provider handle (a media player).
pub trait PlayerSink {
    fn set_source_file(&mut self, path: &Path) -> Result<()>;
    fn set_source_url(&mut self, url: &str) -> Result<()>;
    fn set_source_handle(&mut self, handle: &str) -> Result<()>;
}

/// Sink that renders video from a file or a provider handle.
pub trait VideoSink {
    fn set_video_file(&mut self, path: &Path) -> Result<()>;
    fn set_video_handle(&mut self, handle: &str) -> Result<()>;
}

/// Load `path` into a sound sink.
///
/// Sound sinks only accept local files, so assets, content handles, and
/// remote URLs are materialized through the temp-file cache first; this can
/// cost a copy on first use.
pub fn load_sound(ctx: &MediaContext, sink: &mut dyn SoundSink, path: &str) -> Result<i32> {
    let kind = classify(ctx, path);
    debug!("loading sound {path} ({kind})");
    match kind {
        SourceKind::Asset | SourceKind::ContentHandle | SourceKind::RemoteUrl => {
            let local = cache_temp_file(ctx, path, kind)?;
            sink.load_file(&local)
        }

        SourceKind::RemoteAsset => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.load_file(&ctx.live_asset_path(path)?)
        }

        SourceKind::RemovableStorage => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.load_file(Path::new(path))
        }

        SourceKind::FileUrl => {
            require_storage_capability_if_external(ctx, path)?;
            sink.load_file(&file_url_to_path(path)?)
        }

        SourceKind::ContactPhoto => {
            Err(Error::ContactUnsupported { what: "audio", path: path.to_string() })
        }
    }
}

/// Load `path` into a player sink.
///
/// Players stream remote URLs themselves, so no temp file is made for those;
/// assets still go through the cache because the player needs a path.
pub fn load_player(ctx: &MediaContext, sink: &mut dyn PlayerSink, path: &str) -> Result<()> {
    let kind = classify(ctx, path);
    debug!("loading player source {path} ({kind})");
    match kind {
        SourceKind::Asset => {
            let local = cache_temp_file(ctx, path, kind)?;
            sink.set_source_file(&local)
        }

        SourceKind::RemoteAsset => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.set_source_file(&ctx.live_asset_path(path)?)
        }

        SourceKind::RemovableStorage => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.set_source_file(Path::new(path))
        }

        SourceKind::FileUrl => {
            require_storage_capability_if_external(ctx, path)?;
            sink.set_source_file(&file_url_to_path(path)?)
        }

        // Works for both streaming and non-streaming sources.
        SourceKind::RemoteUrl => sink.set_source_url(path),

        SourceKind::ContentHandle => sink.set_source_handle(path),

        SourceKind::ContactPhoto => {
            Err(Error::ContactUnsupported { what: "audio or video", path: path.to_string() })
        }
    }
}

/// Load `path` into a video sink.
///
/// Video sinks can seek, so assets and remote URLs are materialized to a
/// local file; this can cost a copy on first use.
pub fn load_video(ctx: &MediaContext, sink: &mut dyn VideoSink, path: &str) -> Result<()> {
    let kind = classify(ctx, path);
    debug!("loading video {path} ({kind})");
    match kind {
        SourceKind::Asset | SourceKind::RemoteUrl => {
            let local = cache_temp_file(ctx, path, kind)?;
            sink.set_video_file(&local)
        }

        SourceKind::RemoteAsset => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.set_video_file(&ctx.live_asset_path(path)?)
        }

        SourceKind::RemovableStorage => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            sink.set_video_file(Path::new(path))
        }

        SourceKind::FileUrl => {
            require_storage_capability_if_external(ctx, path)?;
            sink.set_video_file(&file_url_to_path(path)?)
        }

        SourceKind::ContentHandle => sink.set_video_handle(path),

        SourceKind::ContactPhoto => {
            Err(Error::ContactUnsupported { what: "video", path: path.to_string() })
        }
    }
}
