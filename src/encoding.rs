//! Byte/text codec shared by keys and tokens.
//!
//! All base64 in PASETO v4 is the url-safe alphabet without padding. Decoding
//! is strict: padding, characters outside the alphabet, impossible lengths and
//! non-zero trailing bits are all rejected, so every byte string has exactly one
//! accepted encoding.

use std::str::Utf8Error;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::{DecodeError, Engine};

/// Encode bytes as unpadded base64url.
///
/// # Example
/// ```
/// use paseto_v4::encoding::encode;
///
/// assert_eq!(encode(b"test"), "dGVzdA");
/// ```
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url, rejecting non-canonical input.
pub fn decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(text)
}

/// Interpret bytes as UTF-8 text without copying.
pub fn to_text(bytes: &[u8]) -> Result<&str, Utf8Error> {
    std::str::from_utf8(bytes)
}
