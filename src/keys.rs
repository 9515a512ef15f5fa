use crate::errors::KeyError;
use base64::{Engine as _, engine::general_purpose::STANDARD};

pub const ORIGINAL_PREFIX: &str = "original/";
pub const THUMBNAIL_PREFIX: &str = "thumbnail/";

/// Storage key for a downloaded original: `original/<base64(url)>.gif`.
/// Encoding the source URL keeps the key reversible and collision-free
/// without tracking any state.
pub fn original_key(url: &str) -> String {
    format!("{ORIGINAL_PREFIX}{}.gif", STANDARD.encode(url))
}

/// Destination key for a derived thumbnail. Structured derivation: the
/// `original/` prefix is stripped and `thumbnail/` prepended, so the text
/// `original` occurring inside the base64 payload cannot corrupt the result.
/// Keys outside the `original/` prefix are rejected.
pub fn thumbnail_key(original: &str) -> Result<String, KeyError> {
    match original.strip_prefix(ORIGINAL_PREFIX) {
        Some(rest) => Ok(format!("{THUMBNAIL_PREFIX}{rest}")),
        None => Err(KeyError::NotAnOriginal(original.to_string())),
    }
}
