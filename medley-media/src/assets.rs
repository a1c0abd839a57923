//! Bundled-asset opening with case-insensitive fallback
//!
//! Asset names are case-sensitive in the store but media paths authored by
//! hand frequently are not. An exact open is always attempted first; only on
//! failure is the full name listing scanned case-insensitively. Successful
//! resolutions land in the session path cache, so the listing scan happens at
//! most once per requested name.

use tracing::debug;

use crate::context::MediaContext;
use crate::host::MediaStream;
use crate::Result;

/// Open a bundled asset, falling back to case-insensitive name resolution.
///
/// If the fallback cannot produce a match (or the listing itself fails), the
/// error from the exact open is surfaced, so the caller sees what actually
/// went wrong rather than a secondhand "not found".
pub fn open_asset(ctx: &MediaContext, name: &str) -> Result<MediaStream> {
    match ctx.assets().open(name) {
        Ok(stream) => Ok(stream),
        Err(original) => match resolve_case_insensitive(ctx, name) {
            Ok(Some(resolved)) => {
                debug!("asset {name} resolved case-insensitively to {resolved}");
                Ok(ctx.assets().open(&resolved)?)
            }
            Ok(None) | Err(_) => Err(original.into()),
        },
    }
}

/// Resolve an asset name against the bundled names, ignoring case.
///
/// Consults the shared path cache first; on a miss, lists all bundled names
/// and scans linearly. A successful resolution is cached before returning
/// (bundled names never change at runtime, so entries are never invalidated).
pub fn resolve_case_insensitive(ctx: &MediaContext, name: &str) -> Result<Option<String>> {
    if let Some(cached) = ctx.cached_resolved_name(name) {
        return Ok(Some(cached));
    }

    let wanted = name.to_lowercase();
    let names = ctx.assets().list_names()?;
    let resolved = names.into_iter().find(|candidate| candidate.to_lowercase() == wanted);

    if let Some(resolved) = &resolved {
        ctx.store_resolved_name(name, resolved);
    }
    Ok(resolved)
}
