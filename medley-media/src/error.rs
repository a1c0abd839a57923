//! Error types for medley-media
//!
//! Defines the crate error type using thiserror for clear error propagation.
//!
//! Permission failures carry the name of the missing capability and render as
//! `PERMISSION_DENIED:<capability>`. That string is the only error protocol
//! that crosses the host boundary, so its shape must never change; callers
//! split on the first `:` to recover the capability name.

use thiserror::Error;

/// Convenience Result type using the medley-media Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for medley-media
#[derive(Error, Debug)]
pub enum Error {
    /// File or stream I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required capability was not granted by the permission host.
    ///
    /// The Display form is the cross-boundary failure protocol.
    #[error("PERMISSION_DENIED:{0}")]
    PermissionDenied(String),

    /// HTTP transport errors while fetching remote media
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Buffered bytes could not be interpreted as an image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// A `file:` URL that has no local-path interpretation
    #[error("Unable to determine file path of file url {0}")]
    BadFileUrl(String),

    /// The contact referenced by the path has no photo
    #[error("Unable to open contact photo {0}")]
    ContactPhotoMissing(String),

    /// No content is available for the path
    #[error("Unable to open media {0}")]
    MediaNotFound(String),

    /// Contact paths are image-only; audio/video sinks cannot load them
    #[error("Unable to load {what} for contact {path}")]
    ContactUnsupported { what: &'static str, path: String },

    /// A remote URL scheme with no direct interpretation
    #[error("Unsupported URL scheme {scheme} in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    /// The explicit redirect chain exceeded the configured hop limit
    #[error("Redirect limit of {limit} exceeded fetching {url}")]
    RedirectLimit { url: String, limit: usize },

    /// Malformed `data:` URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for permission failures, which callers surface distinctly from
    /// generic I/O failures (the capability can be requested and the call
    /// retried).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied(_))
    }

    /// The name of the missing capability, if this is a permission failure.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::PermissionDenied(capability) => Some(capability),
            _ => None,
        }
    }

    /// Rebuild a structured error from a wire failure message.
    ///
    /// Splits on the first `:`; messages tagged `PERMISSION_DENIED` become
    /// [`Error::PermissionDenied`], everything else degrades to a plain I/O
    /// failure carrying the message.
    pub fn from_failure_message(message: &str) -> Error {
        match message.split_once(':') {
            Some(("PERMISSION_DENIED", capability)) => {
                Error::PermissionDenied(capability.to_string())
            }
            _ => Error::Io(std::io::Error::new(std::io::ErrorKind::Other, message.to_string())),
        }
    }
}
