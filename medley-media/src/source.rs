//! Media source classification
//!
//! Every media path entering the pipeline is first classified into exactly
//! one [`SourceKind`] by lexical inspection alone. Classification is total
//! and deterministic: no I/O, no errors, and the precedence order below is a
//! contract (the prefixes overlap, so order decides).
//!
//! 1. External-storage prefix, or the legacy `/sdcard/` prefix
//! 2. `content://contacts/` prefix
//! 3. any other `content://` prefix
//! 4. well-formed URL (`file` scheme vs. anything else)
//! 5. bundled asset (live-development variant once assets are mirrored)

use std::path::PathBuf;

use url::Url;

use crate::context::MediaContext;
use crate::{Error, Result};

/// Legacy removable-storage mount point, recognized alongside the configured
/// external-storage root.
pub const LEGACY_STORAGE_PREFIX: &str = "/sdcard/";

/// Prefix of contact-photo handles.
pub const CONTACT_HANDLE_PREFIX: &str = "content://contacts/";

/// Prefix of generic content handles.
pub const CONTENT_HANDLE_PREFIX: &str = "content://";

/// Where a media path points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Name of a bundled asset
    Asset,
    /// Bundled asset mirrored to local storage by a live-development session
    RemoteAsset,
    /// File on removable storage
    RemovableStorage,
    /// `file:` URL
    FileUrl,
    /// URL with any non-`file` scheme
    RemoteUrl,
    /// Provider-mediated content handle
    ContentHandle,
    /// Contact-photo handle
    ContactPhoto,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Asset => "asset",
            SourceKind::RemoteAsset => "remote-asset",
            SourceKind::RemovableStorage => "removable-storage",
            SourceKind::FileUrl => "file-url",
            SourceKind::RemoteUrl => "remote-url",
            SourceKind::ContentHandle => "content-handle",
            SourceKind::ContactPhoto => "contact-photo",
        };
        f.write_str(name)
    }
}

/// Classify a media path. First match wins; prefix checks run before URL
/// parsing, so a removable-storage path keeps its kind no matter what
/// URL-like text follows the prefix.
pub fn classify(ctx: &MediaContext, path: &str) -> SourceKind {
    if path.starts_with(&ctx.config().external_storage_root)
        || path.starts_with(LEGACY_STORAGE_PREFIX)
    {
        return SourceKind::RemovableStorage;
    }

    if path.starts_with(CONTACT_HANDLE_PREFIX) {
        return SourceKind::ContactPhoto;
    }

    if path.starts_with(CONTENT_HANDLE_PREFIX) {
        return SourceKind::ContentHandle;
    }

    if let Ok(url) = Url::parse(path) {
        if url.scheme() == "file" {
            return SourceKind::FileUrl;
        }
        return SourceKind::RemoteUrl;
    }
    // Not URL-shaped (typically: no scheme). Normal branch, not an error.

    match ctx.live_session() {
        Some(live) if live.assets_synced() => SourceKind::RemoteAsset,
        _ => SourceKind::Asset,
    }
}

/// Whether the path is a `file:` URL addressing external/removable storage.
pub fn is_external_file_url(ctx: &MediaContext, path: &str) -> bool {
    let external_prefix = format!("file://{}", ctx.config().external_storage_root);
    path.starts_with(&external_prefix) || path.starts_with("file:///sdcard")
}

/// Whether the path names a file on external/removable storage, either as a
/// plain pathname or as a `file:` URL.
pub fn is_external_file(ctx: &MediaContext, path: &str) -> bool {
    path.starts_with(&ctx.config().external_storage_root)
        || path.starts_with(LEGACY_STORAGE_PREFIX)
        || is_external_file_url(ctx, path)
}

/// Convert a `file:` URL to a local filesystem path.
pub fn file_url_to_path(path: &str) -> Result<PathBuf> {
    Url::parse(path)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| Error::BadFileUrl(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LiveSession;

    fn ctx() -> std::sync::Arc<MediaContext> {
        MediaContext::builder().build()
    }

    #[test]
    fn storage_prefixes_win_over_url_like_suffixes() {
        let ctx = ctx();
        assert_eq!(classify(&ctx, "/sdcard/song.mp3"), SourceKind::RemovableStorage);
        assert_eq!(
            classify(&ctx, "/storage/external/clips/http://x"),
            SourceKind::RemovableStorage
        );
    }

    #[test]
    fn content_handles_split_on_contacts_prefix() {
        let ctx = ctx();
        assert_eq!(classify(&ctx, "content://contacts/42/photo"), SourceKind::ContactPhoto);
        assert_eq!(classify(&ctx, "content://media/external/7"), SourceKind::ContentHandle);
    }

    #[test]
    fn urls_split_on_file_scheme() {
        let ctx = ctx();
        assert_eq!(classify(&ctx, "file:///tmp/a.png"), SourceKind::FileUrl);
        assert_eq!(classify(&ctx, "http://example.com/a.png"), SourceKind::RemoteUrl);
        assert_eq!(classify(&ctx, "https://example.com/a.png"), SourceKind::RemoteUrl);
        assert_eq!(classify(&ctx, "data:text/plain,hi"), SourceKind::RemoteUrl);
    }

    #[test]
    fn bare_names_are_assets() {
        let ctx = ctx();
        assert_eq!(classify(&ctx, "kitten.png"), SourceKind::Asset);
        assert_eq!(classify(&ctx, "sounds/meow.wav"), SourceKind::Asset);
    }

    #[test]
    fn live_session_reroutes_assets_only_after_sync() {
        let live = LiveSession::new("/tmp/live");
        let ctx = MediaContext::builder().live_session(live).build();
        assert_eq!(classify(&ctx, "kitten.png"), SourceKind::Asset);

        ctx.live_session().unwrap().mark_assets_synced();
        assert_eq!(classify(&ctx, "kitten.png"), SourceKind::RemoteAsset);
        // URL-shaped paths are unaffected by the live session
        assert_eq!(classify(&ctx, "http://example.com/x"), SourceKind::RemoteUrl);
    }

    #[test]
    fn external_file_helpers() {
        let ctx = ctx();
        assert!(is_external_file(&ctx, "/sdcard/a.png"));
        assert!(is_external_file(&ctx, "/storage/external/a.png"));
        assert!(is_external_file(&ctx, "file:///sdcard/a.png"));
        assert!(is_external_file_url(&ctx, "file:///storage/external/a.png"));
        assert!(!is_external_file(&ctx, "/home/user/a.png"));
        assert!(!is_external_file_url(&ctx, "file:///home/user/a.png"));
    }

    #[test]
    fn file_url_conversion() {
        assert_eq!(
            file_url_to_path("file:///tmp/a.png").unwrap(),
            PathBuf::from("/tmp/a.png")
        );
        assert!(matches!(
            file_url_to_path("file://host-with-no-path"),
            Err(Error::BadFileUrl(_))
        ));
    }
}
