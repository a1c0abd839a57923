//! # Medley Media Library (medley-media)
//!
//! Media path resolution and caching pipeline for player hosts.
//!
//! **Purpose:** Take an opaque path-like string — a bundled asset name, a
//! removable-storage path, a content-provider handle, a contact photo, or a
//! remote URL — classify it, open a byte stream for it under the host's
//! permission rules, materialize it into a reusable temp file when a sink
//! needs a real path, and decode/rescale raster images asynchronously.
//!
//! **Architecture:** A shared [`MediaContext`] owns the host collaborators
//! and the two session caches; everything else is request-scoped. The image
//! pipeline runs on a background runner and reports through a single
//! continuation, with a blocking adapter for synchronous callers.

pub mod assets;
pub mod config;
pub mod context;
mod data_url;
pub mod error;
pub mod host;
pub mod images;
pub mod resolver;
pub mod sinks;
pub mod sizing;
pub mod source;
mod sync;
pub mod tempcache;

pub use config::MediaConfig;
pub use context::{LiveSession, MediaContext, MediaContextBuilder};
pub use error::{Error, Result};
pub use host::{MediaStream, READ_EXTERNAL_STORAGE};
pub use images::{load_image, load_image_async, ImageContinuation, ImageResult, ScaledImage};
pub use resolver::{open_media, open_media_as};
pub use source::{classify, SourceKind};
pub use tempcache::{copy_media_to_temp_file, materialize};
