//! Compact transport encoding for group configurations
//!
//! A group record is turned into positional arrays, serialized as compact
//! JSON, compressed with zlib at the best level and encoded as URL-safe
//! base64 without padding. The resulting string is what the web editor
//! consumes and produces.

pub mod compact;

use std::io::{Read, Write};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{CodecError, CodecResult};
use crate::models::tree::{self, MAX_TREE_DEPTH};
use crate::models::GroupConfig;

/// Upper bound on the inflated JSON size accepted by [`decode`]
pub const MAX_DECODED_LEN: usize = 4 * 1024 * 1024;

/// URL-safe alphabet that accepts input with or without `=` padding
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes a group record into a URL-safe string
///
/// # Errors
///
/// Returns `CodecError::Shape` if the tree is nested deeper than
/// [`MAX_TREE_DEPTH`], since the result could not be decoded again, or
/// `CodecError::Serialize` if serialization or compression fails.
pub fn encode(config: &GroupConfig) -> CodecResult<String> {
    let levels = tree::depth(&config.servers);
    if levels > MAX_TREE_DEPTH {
        return Err(CodecError::Shape(format!(
            "tree is {levels} levels deep, at most {MAX_TREE_DEPTH} can be encoded"
        )));
    }

    let json = serde_json::to_vec(&compact::group_to_array(config))
        .map_err(|e| CodecError::Serialize(e.to_string()))?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .map_err(|e| CodecError::Serialize(format!("Failed to compress: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CodecError::Serialize(format!("Failed to compress: {e}")))?;

    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decodes a string produced by [`encode`] or by the web editor
///
/// Surrounding whitespace is ignored and padding is optional.
///
/// # Errors
///
/// Returns a `CodecError` describing the first stage that failed. This
/// function does not panic on any input.
pub fn decode(encoded: &str) -> CodecResult<GroupConfig> {
    let compressed = LENIENT_URL_SAFE
        .decode(encoded.trim())
        .map_err(|e| CodecError::Base64(e.to_string()))?;

    let limit = u64::try_from(MAX_DECODED_LEN).unwrap_or(u64::MAX);
    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(limit.saturating_add(1))
        .read_to_end(&mut json)
        .map_err(|e| CodecError::Decompress(e.to_string()))?;
    if json.len() > MAX_DECODED_LEN {
        return Err(CodecError::TooLarge {
            limit: MAX_DECODED_LEN,
        });
    }

    let value: serde_json::Value =
        serde_json::from_slice(&json).map_err(|e| CodecError::Json(e.to_string()))?;
    compact::group_from_array(&value)
}

/// Builds the web editor link for an encoded configuration
#[must_use]
pub fn editor_url(base_url: &str, encoded: &str) -> String {
    format!("{base_url}?data={encoded}")
}
