//! Asynchronous image pipeline
//!
//! Loads a media path as a raster image: resolve, buffer fully in memory,
//! decode bounds, downsample oversized sources against the display budget,
//! and apply density scaling. The result is delivered through a single
//! continuation, exactly once, from a background task. A blocking adapter
//! wraps the pipeline for callers that cannot be asynchronous.
//!
//! Unlike other media, images fetched from the network are never temp-file
//! cached: the bytes behind a URL (a webcam frame, say) may change between
//! requests, and the caller asked for the image as it is now.

use std::io::{Cursor, Read};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::context::MediaContext;
use crate::resolver::open_media_as;
use crate::sizing::DecodeOptions;
use crate::source::{classify, SourceKind};
use crate::sync::Synchronizer;
use crate::Result;

/// Edge length of the placeholder returned for contacts without a photo.
pub const PLACEHOLDER_SIZE: u32 = 64;

/// A decoded image together with the display density it was scaled for.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    pub image: DynamicImage,
    pub density: f32,
}

impl ScaledImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Outcome of an image request. `Ok(None)` means the caller passed an empty
/// path; there is no image, and that is not an error.
pub type ImageResult = Result<Option<ScaledImage>>;

/// One-shot delivery channel for an image request.
pub type ImageContinuation = Box<dyn FnOnce(ImageResult) + Send + 'static>;

/// Load an image asynchronously, delivering the outcome to `continuation`
/// exactly once.
///
/// An empty path completes synchronously with `Ok(None)` and schedules
/// nothing. Every other path is classified here and processed on the
/// context's background runner, never on the calling thread.
pub fn load_image_async(ctx: &Arc<MediaContext>, path: &str, continuation: ImageContinuation) {
    if path.is_empty() {
        continuation(Ok(None));
        return;
    }

    let kind = classify(ctx, path);
    let ctx = Arc::clone(ctx);
    let path = path.to_string();
    let runner = ctx.runner();
    runner.schedule(Box::new(move || {
        continuation(load_image_sync(&ctx, &path, kind));
    }));
}

/// Load an image, blocking the calling thread until the pipeline delivers.
///
/// This exists for callers that cannot be asynchronous. It parks the
/// current thread on a rendezvous until the background task finishes; that
/// stall is the accepted cost, not a pattern to copy. Permission failures
/// come back as [`crate::Error::PermissionDenied`], distinct from generic
/// I/O failures.
pub fn load_image(ctx: &Arc<MediaContext>, path: &str) -> ImageResult {
    let rendezvous = Arc::new(Synchronizer::new());
    let delivery = Arc::clone(&rendezvous);
    load_image_async(ctx, path, Box::new(move |result| delivery.deliver(result)));
    rendezvous.wait()
}

/// The pipeline body, run on the background runner.
fn load_image_sync(ctx: &MediaContext, path: &str, kind: SourceKind) -> ImageResult {
    debug!("loading image {path} ({kind})");

    let bytes = match buffer_media(ctx, path, kind) {
        Ok(bytes) => bytes,
        Err(err) if err.is_permission_denied() => return Err(err),
        Err(err) if kind == SourceKind::ContactPhoto => {
            // Contacts commonly have no photo; that is expected, so image
            // callers get a placeholder instead of a failure.
            debug!("no photo for {path}: {err}");
            return Ok(Some(placeholder_image(ctx)));
        }
        Err(err) => {
            warn!("could not read image {path}: {err}");
            return Err(err);
        }
    };

    decode_scaled(ctx, path, &bytes).map(Some)
}

/// Resolve the path and buffer the whole stream in memory.
fn buffer_media(ctx: &MediaContext, path: &str, kind: SourceKind) -> Result<Vec<u8>> {
    let mut stream = open_media_as(ctx, path, kind)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Decode buffered bytes, downsampling against the display budget and
/// applying density scaling.
fn decode_scaled(ctx: &MediaContext, path: &str, bytes: &[u8]) -> Result<ScaledImage> {
    // Bounds first: only width/height are read, no pixel data yet.
    let (native_width, native_height) = image_dimensions(bytes)?;
    let options = DecodeOptions::for_image(ctx.display(), native_width, native_height);
    debug!(
        "decoding {path}: native {native_width}x{native_height}, budget {}x{}, sample factor {}",
        options.max_width, options.max_height, options.sample_factor
    );

    let decoded = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    let density = ctx.display().density_scale();

    if options.sample_factor > 1 {
        // The source was oversized for this display, so it was never sized
        // for the app in the first place; downsample it to budget and skip
        // density scaling.
        let width = (native_width / options.sample_factor).max(1);
        let height = (native_height / options.sample_factor).max(1);
        let image = decoded.resize_exact(width, height, FilterType::Triangle);
        return Ok(ScaledImage { image, density });
    }

    if density != 1.0 {
        // The image may be exactly the size the author intended, so scale it
        // by the display density. Unfiltered, as the legacy path did.
        let width = ((native_width as f32) * density).max(1.0) as u32;
        let height = ((native_height as f32) * density).max(1.0) as u32;
        let image = decoded.resize_exact(width, height, FilterType::Nearest);
        return Ok(ScaledImage { image, density });
    }

    Ok(ScaledImage { image: decoded, density })
}

fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let dimensions = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Fixed stand-in for an absent contact photo: a neutral gray square with a
/// darker frame.
fn placeholder_image(ctx: &MediaContext) -> ScaledImage {
    let mut image = RgbaImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgba([0xdd, 0xdd, 0xdd, 0xff]),
    );
    let frame = Rgba([0x88, 0x88, 0x88, 0xff]);
    for i in 0..PLACEHOLDER_SIZE {
        for edge in [0, 1, PLACEHOLDER_SIZE - 2, PLACEHOLDER_SIZE - 1] {
            image.put_pixel(i, edge, frame);
            image.put_pixel(edge, i, frame);
        }
    }
    ScaledImage {
        image: DynamicImage::ImageRgba8(image),
        density: ctx.display().density_scale(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_completes_synchronously_with_no_image() {
        let ctx = crate::MediaContext::builder().build();
        let slot: Arc<std::sync::Mutex<Option<ImageResult>>> = Default::default();
        {
            let slot = Arc::clone(&slot);
            load_image_async(&ctx, "", Box::new(move |r| *slot.lock().unwrap() = Some(r)));
        }
        // No runner round trip: the result must already be there.
        let delivered = slot.lock().unwrap().take();
        match delivered {
            Some(Ok(None)) => {}
            other => panic!("expected immediate Ok(None), got {other:?}"),
        }
    }

    #[test]
    fn placeholder_is_framed_and_fixed_size() {
        let ctx = crate::MediaContext::builder().build();
        let placeholder = placeholder_image(&ctx);
        assert_eq!(placeholder.width(), PLACEHOLDER_SIZE);
        assert_eq!(placeholder.height(), PLACEHOLDER_SIZE);
    }
}
