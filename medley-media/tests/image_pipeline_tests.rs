//! Image pipeline integration tests
//!
//! Exercised through the blocking adapter (which itself wraps the async
//! path), plus one async-delivery test over a channel.

mod helpers;

use std::sync::mpsc;
use std::time::Duration;

use helpers::{png_bytes, MemoryAssetStore, MemoryContentResolver};
use medley_media::host::{FixedDisplay, StaticPermissions};
use medley_media::images::PLACEHOLDER_SIZE;
use medley_media::{load_image, load_image_async, Error, MediaContext, READ_EXTERNAL_STORAGE};

fn small_display() -> FixedDisplay {
    FixedDisplay { width: 100, height: 100, density_scale: 1.0, compatibility_mode: false }
}

#[test]
fn in_budget_image_decodes_at_native_size() {
    let store = MemoryAssetStore::new([("cat.png", png_bytes(80, 60))]);
    let ctx = MediaContext::builder().assets(store).display(small_display()).build();

    let image = load_image(&ctx, "cat.png").expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (80, 60));
    assert_eq!(image.density, 1.0);
}

#[test]
fn oversized_image_downsamples_to_the_budget() {
    // 400x300 against a 100x100 budget: factor 4 brings width to exactly 100.
    let store = MemoryAssetStore::new([("big.png", png_bytes(400, 300))]);
    let ctx = MediaContext::builder().assets(store).display(small_display()).build();

    let image = load_image(&ctx, "big.png").expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (100, 75));
}

#[test]
fn unsampled_image_rescales_by_display_density() {
    let display =
        FixedDisplay { width: 1000, height: 1000, density_scale: 2.0, compatibility_mode: false };
    let store = MemoryAssetStore::new([("icon.png", png_bytes(60, 40))]);
    let ctx = MediaContext::builder().assets(store).display(display).build();

    let image = load_image(&ctx, "icon.png").expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (120, 80));
    assert_eq!(image.density, 2.0);
}

#[test]
fn sampled_image_skips_density_rescale() {
    // Budget is (50, 50) after density division; 400x300 samples at 8.
    let display =
        FixedDisplay { width: 100, height: 100, density_scale: 2.0, compatibility_mode: false };
    let store = MemoryAssetStore::new([("big.png", png_bytes(400, 300))]);
    let ctx = MediaContext::builder().assets(store).display(display).build();

    let image = load_image(&ctx, "big.png").expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (50, 37));
}

#[test]
fn permission_failure_carries_the_capability_name() {
    let ctx = MediaContext::builder()
        .permissions(StaticPermissions::deny_all())
        .build();

    let err = load_image(&ctx, "/sdcard/photo.png").unwrap_err();
    assert_eq!(err.missing_capability(), Some(READ_EXTERNAL_STORAGE));
    assert_eq!(err.to_string(), "PERMISSION_DENIED:ReadExternalStorage");
}

#[test]
fn contact_without_photo_yields_the_placeholder() {
    let ctx = MediaContext::builder().build();

    let image = load_image(&ctx, "content://contacts/7/photo")
        .expect("placeholder, never a failure")
        .expect("image");
    assert_eq!((image.width(), image.height()), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
}

#[test]
fn contact_with_photo_decodes_it() {
    let resolver = MemoryContentResolver::default()
        .with_contact_photo("content://contacts/7/photo", png_bytes(32, 32));
    let ctx = MediaContext::builder().content(resolver).display(small_display()).build();

    let image = load_image(&ctx, "content://contacts/7/photo").expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (32, 32));
}

#[test]
fn undecodable_bytes_fail_on_the_decode_channel() {
    let store = MemoryAssetStore::new([("notes.txt", b"not an image".to_vec())]);
    let ctx = MediaContext::builder().assets(store).build();

    let err = load_image(&ctx, "notes.txt").unwrap_err();
    assert!(matches!(err, Error::Decode(_) | Error::Io(_)), "got {err}");
}

#[test]
fn missing_asset_fails_with_the_underlying_message() {
    let store = MemoryAssetStore::new([]);
    let ctx = MediaContext::builder().assets(store).build();

    let err = load_image(&ctx, "ghost.png").unwrap_err();
    assert!(err.to_string().contains("ghost.png not bundled"));
}

#[test]
fn async_pipeline_delivers_exactly_once_off_the_caller_thread() {
    let store = MemoryAssetStore::new([("cat.png", png_bytes(10, 10))]);
    let ctx = MediaContext::builder().assets(store).display(small_display()).build();

    let (tx, rx) = mpsc::channel();
    load_image_async(
        &ctx,
        "cat.png",
        Box::new(move |result| {
            tx.send(result).expect("receiver alive");
        }),
    );

    let result = rx.recv_timeout(Duration::from_secs(10)).expect("delivery");
    let image = result.expect("load").expect("image");
    assert_eq!((image.width(), image.height()), (10, 10));
    // The sender was moved into a FnOnce; a second delivery cannot happen.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
