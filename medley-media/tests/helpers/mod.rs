//! Shared test fixtures: in-memory collaborators and image payloads.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use medley_media::host::{AssetStore, ContentResolver, MediaStream};

/// In-memory asset store with open/list counters.
pub struct MemoryAssetStore {
    files: HashMap<String, Vec<u8>>,
    pub opens: Arc<AtomicUsize>,
    pub lists: Arc<AtomicUsize>,
}

impl MemoryAssetStore {
    pub fn new(files: impl IntoIterator<Item = (&'static str, Vec<u8>)>) -> Self {
        Self {
            files: files.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            opens: Arc::new(AtomicUsize::new(0)),
            lists: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opens)
    }

    pub fn list_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lists)
    }
}

impl AssetStore for MemoryAssetStore {
    fn list_names(&self) -> io::Result<Vec<String>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<MediaStream> {
        match self.files.get(name) {
            Some(bytes) => {
                self.opens.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Cursor::new(bytes.clone())))
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{name} not bundled"))),
        }
    }
}

/// In-memory content resolver with separate stream and contact-photo tables.
#[derive(Default)]
pub struct MemoryContentResolver {
    streams: HashMap<String, Vec<u8>>,
    photos: HashMap<String, Vec<u8>>,
}

impl MemoryContentResolver {
    pub fn with_stream(mut self, handle: &str, bytes: Vec<u8>) -> Self {
        self.streams.insert(handle.to_string(), bytes);
        self
    }

    pub fn with_contact_photo(mut self, handle: &str, bytes: Vec<u8>) -> Self {
        self.photos.insert(handle.to_string(), bytes);
        self
    }
}

impl ContentResolver for MemoryContentResolver {
    fn open_stream(&self, handle: &str) -> io::Result<MediaStream> {
        match self.streams.get(handle) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => {
                Err(io::Error::new(io::ErrorKind::NotFound, format!("no content for {handle}")))
            }
        }
    }

    fn open_contact_photo(&self, handle: &str) -> io::Result<Option<MediaStream>> {
        Ok(self
            .photos
            .get(handle)
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as MediaStream))
    }
}

/// Solid-color PNG payload of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode test png");
    out.into_inner()
}
