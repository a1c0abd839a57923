//! Stream resolution
//!
//! Opens a readable byte stream for a classified media path. Each source
//! kind carries its own permission and transport rules:
//!
//! - local kinds check the storage capability before touching the filesystem
//! - remote HTTP(S) fetches follow redirects explicitly, hop by hop, with
//!   transport-level redirect following disabled so every hop is visible
//! - provider-mediated kinds delegate to the host's content resolver
//!
//! The returned stream is owned by the caller; dropping it releases the
//! underlying file or connection.

use std::fs::File;
use std::io::Cursor;

use reqwest::header::LOCATION;
use tracing::debug;
use url::Url;

use crate::assets::open_asset;
use crate::context::MediaContext;
use crate::data_url;
use crate::host::{MediaStream, READ_EXTERNAL_STORAGE};
use crate::source::{classify, file_url_to_path, is_external_file_url, SourceKind};
use crate::{Error, Result};

/// Classify `path` and open a stream for it.
pub fn open_media(ctx: &MediaContext, path: &str) -> Result<MediaStream> {
    open_media_as(ctx, path, classify(ctx, path))
}

/// Open a stream for a path whose source kind is already known.
pub fn open_media_as(ctx: &MediaContext, path: &str, kind: SourceKind) -> Result<MediaStream> {
    match kind {
        SourceKind::Asset => open_asset(ctx, path),

        SourceKind::RemoteAsset => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            let local = ctx.live_asset_path(path)?;
            Ok(Box::new(File::open(local)?))
        }

        SourceKind::RemovableStorage => {
            ctx.assert_capability(READ_EXTERNAL_STORAGE)?;
            Ok(Box::new(File::open(path)?))
        }

        SourceKind::FileUrl => {
            require_storage_capability_if_external(ctx, path)?;
            let local = file_url_to_path(path)?;
            Ok(Box::new(File::open(local)?))
        }

        SourceKind::RemoteUrl => open_url(ctx, path, 0),

        SourceKind::ContentHandle => Ok(ctx.content().open_stream(path)?),

        SourceKind::ContactPhoto => match ctx.content().open_contact_photo(path)? {
            Some(stream) => Ok(stream),
            // The contact exists but has no photo; image callers convert
            // this into a placeholder, everyone else sees the failure.
            None => Err(Error::ContactPhotoMissing(path.to_string())),
        },
    }
}

/// Demand the storage capability for file URLs that address external media;
/// app-private file URLs stay permission-free. Shared by every branch that
/// handles a `file:` URL.
pub(crate) fn require_storage_capability_if_external(ctx: &MediaContext, path: &str) -> Result<()> {
    if is_external_file_url(ctx, path) {
        ctx.assert_capability(READ_EXTERNAL_STORAGE)
    } else {
        Ok(())
    }
}

/// Open a remote URL, following HTTP redirects explicitly.
///
/// `hops` counts redirects already taken; the chain is bounded by
/// `max_redirect_hops` in the session config (the legacy behavior was
/// unbounded).
fn open_url(ctx: &MediaContext, raw_url: &str, hops: usize) -> Result<MediaStream> {
    let url = Url::parse(raw_url).map_err(|_| Error::MediaNotFound(raw_url.to_string()))?;

    match url.scheme() {
        "http" | "https" => {
            let response = ctx.http_client()?.get(raw_url).send()?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| Error::MediaNotFound(format!("{raw_url} ({status})")))?;
                // Location may be relative; resolve it against the hop we
                // just fetched before recursing.
                let next = match url.join(location) {
                    Ok(resolved) => resolved.to_string(),
                    Err(_) => location.to_string(),
                };
                debug!("redirecting to {next}");
                drop(response);

                let limit = ctx.config().max_redirect_hops;
                if hops + 1 > limit {
                    return Err(Error::RedirectLimit { url: raw_url.to_string(), limit });
                }
                return open_url(ctx, &next, hops + 1);
            }

            let response = response.error_for_status()?;
            Ok(Box::new(response))
        }

        // Non-HTTP schemes with a direct interpretation are opened in place.
        // file: URLs land here when a redirect points at one, so the
        // external-storage check applies the same as in the FileUrl branch.
        "file" => {
            require_storage_capability_if_external(ctx, raw_url)?;
            let local = file_url_to_path(raw_url)?;
            Ok(Box::new(File::open(local)?))
        }
        "data" => Ok(Box::new(Cursor::new(data_url::decode(raw_url)?))),

        scheme => Err(Error::UnsupportedScheme {
            scheme: scheme.to_string(),
            url: raw_url.to_string(),
        }),
    }
}
