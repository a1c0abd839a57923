//! `data:` URL decoding (RFC 2397)
//!
//! Remote-URL resolution treats `data:` as a directly-openable scheme: the
//! payload is inline, either base64- or percent-encoded after the first
//! comma. Only the payload bytes matter here; the media type parameters are
//! ignored because the image pipeline sniffs content anyway.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::{Error, Result};

const DATA_URL_PREFIX: &str = "data:";

/// Decode the payload bytes of a `data:` URL.
pub(crate) fn decode(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| Error::InvalidDataUrl(format!("missing data: prefix in {url}")))?;

    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUrl(format!("missing comma in {url}")))?;

    let is_base64 = metadata
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"));

    if is_base64 {
        // Tolerate ASCII whitespace inside the payload
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        BASE64
            .decode(cleaned.as_bytes())
            .map_err(|e| Error::InvalidDataUrl(e.to_string()))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(data: &str) -> Result<Vec<u8>> {
    let bytes = data.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| {
                        Error::InvalidDataUrl(format!("truncated percent escape at byte {i}"))
                    })?;
                out.push(hex);
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    Ok(out)
}
