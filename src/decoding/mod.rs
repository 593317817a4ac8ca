//! Best-effort byte-to-text decoding for uploaded documents.
//!
//! [`decode_bytes`] never fails. The order of attempts is:
//!
//! 1. A byte-order mark picks its encoding and is stripped.
//! 2. Byte-frequency detection ([`chardetng`]) picks a legacy encoding; valid
//!    UTF-8 short-circuits to UTF-8.
//! 3. If the detected encoding rejects the input, decode as UTF-8 with U+FFFD
//!    replacement characters.
//! 4. If nothing was detected (empty or binary-looking input), decode as UTF-8
//!    and drop invalid sequences.


use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;
use tracing::{debug, warn};

/// Which branch of the decoder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// Decoded cleanly with a BOM-declared or detected encoding.
    Detected,
    /// Detected encoding rejected the input; UTF-8 with replacement characters.
    Replaced,
    /// No encoding detected; UTF-8 with invalid sequences dropped.
    Ignored,
}

/// Text produced from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded text.
    pub text: String,
    /// Name of the encoding the text was decoded with.
    pub encoding: &'static str,
    /// Branch that produced `text`.
    pub path: DecodePath,
    /// `true` if bytes were replaced or dropped.
    pub lossy: bool,
}

/// Guesses the encoding of `bytes`.
///
/// Returns `None` for empty input and for input containing NUL bytes (binary
/// content or BOM-less UTF-16, which byte-frequency detection cannot judge).
pub fn detect_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Some(encoding);
    }

    if bytes.is_empty() || bytes.contains(&0) {
        return None;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return Some(UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    Some(detector.guess(None, false))
}

/// Decodes `bytes` into text. Never fails.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    let Some(encoding) = detect_encoding(bytes) else {
        return decode_utf8_ignore(bytes);
    };

    decode_with(encoding, bytes)
}

/// Decodes `bytes` with a known encoding, falling back to lossy UTF-8 when the
/// encoding rejects the input.
pub(crate) fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> DecodedText {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => {
            debug!(
                encoding = encoding.name(),
                bytes = bytes.len(),
                "Decoded document"
            );
            DecodedText {
                text: text.into_owned(),
                encoding: encoding.name(),
                path: DecodePath::Detected,
                lossy: false,
            }
        }
        None => {
            warn!(
                detected = encoding.name(),
                bytes = bytes.len(),
                "Detected encoding rejected input, falling back to lossy UTF-8"
            );
            DecodedText {
                text: String::from_utf8_lossy(body).into_owned(),
                encoding: UTF_8.name(),
                path: DecodePath::Replaced,
                lossy: true,
            }
        }
    }
}

fn decode_utf8_ignore(bytes: &[u8]) -> DecodedText {
    let mut text = String::with_capacity(bytes.len());
    let mut lossy = false;

    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        lossy |= !chunk.invalid().is_empty();
    }

    if lossy {
        warn!(
            bytes = bytes.len(),
            "No encoding detected, dropped invalid UTF-8"
        );
    }

    DecodedText {
        text,
        encoding: UTF_8.name(),
        path: DecodePath::Ignored,
        lossy,
    }
}
