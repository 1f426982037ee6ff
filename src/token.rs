//! Token grammar: rendering and structural parsing of `v4.public` strings.
//!
//! ```text
//! v4.public.<base64url(payload || signature)>[.<base64url(footer)>]
//! ```
//!
//! Parsing performs no cryptography. A [`ParsedToken`] is only known to be
//! well formed; its contents are untrusted until the signature is checked.

use std::borrow::Cow;

use serde_json::Value;

use crate::encoding;
use crate::{HEADER, PasetoError, SIGNATURE_LENGTH};

const VERSION: &str = "v4";
const PURPOSE: &str = "public";

/// A token as received from a caller, before it is resolved to text.
///
/// Tokens arrive as strings from headers and cookies, as raw bytes from
/// sockets and files, and occasionally as untyped JSON. All of them are
/// resolved to text by [`TokenInput::as_text`] before any parsing happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInput<'a> {
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
}

impl<'a> TokenInput<'a> {
    /// Accept a dynamically typed token: a JSON string, or a JSON array of
    /// byte values. Anything else is rejected.
    pub fn from_json(value: &'a Value) -> Result<Self, PasetoError> {
        match value {
            Value::String(text) => Ok(Self::Text(Cow::Borrowed(text.as_str()))),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(|bytes| Self::Bytes(Cow::Owned(bytes)))
                .ok_or_else(|| {
                    PasetoError::TokenInvalid(
                        "token byte sequence must only contain values 0-255".into(),
                    )
                }),
            other => Err(PasetoError::TokenInvalid(format!(
                "token must be a string or byte sequence, got {}",
                json_type_name(other)
            ))),
        }
    }

    /// Resolve the input to token text.
    pub fn as_text(&self) -> Result<&str, PasetoError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Bytes(bytes) => encoding::to_text(bytes).map_err(|e| {
                PasetoError::TokenInvalid(format!("token bytes are not valid UTF-8: {e}"))
            }),
        }
    }
}

impl<'a> From<&'a str> for TokenInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for TokenInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for TokenInput<'_> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a [u8]> for TokenInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(Cow::Borrowed(bytes))
    }
}

impl From<Vec<u8>> for TokenInput<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Cow::Owned(bytes))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A structurally valid, not yet verified, v4.public token.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    payload: Vec<u8>,
    signature: [u8; SIGNATURE_LENGTH],
    footer: Vec<u8>,
    total_length: usize,
}

impl ParsedToken {
    /// Split and decode a token without any cryptographic work.
    ///
    /// Fails with [`PasetoError::TokenInvalid`] on a segment count other than
    /// 3 or 4, a header other than `v4.public.`, undecodable base64url, or a
    /// body too short to hold a signature.
    pub fn parse(token: &str) -> Result<Self, PasetoError> {
        let segments: Vec<&str> = token.split('.').collect();
        if !(3..=4).contains(&segments.len()) {
            return Err(PasetoError::TokenInvalid(format!(
                "expected 3 or 4 segments separated by '.', found {}",
                segments.len()
            )));
        }

        if segments[0] != VERSION || segments[1] != PURPOSE {
            return Err(PasetoError::TokenInvalid(format!(
                "unsupported header, expected '{HEADER}'"
            )));
        }

        let body = encoding::decode(segments[2]).map_err(|e| {
            PasetoError::TokenInvalid(format!("invalid body encoding: {e}"))
        })?;
        if body.len() < SIGNATURE_LENGTH {
            return Err(PasetoError::TokenInvalid(format!(
                "body is {} bytes, too short to hold a {SIGNATURE_LENGTH}-byte signature",
                body.len()
            )));
        }

        let footer = match segments.get(3) {
            Some(encoded) => encoding::decode(encoded).map_err(|e| {
                PasetoError::TokenInvalid(format!("invalid footer encoding: {e}"))
            })?,
            None => Vec::new(),
        };

        let (payload, signature) = body.split_at(body.len() - SIGNATURE_LENGTH);
        let signature: [u8; SIGNATURE_LENGTH] = signature
            .try_into()
            .map_err(|_| PasetoError::TokenInvalid("malformed signature".into()))?;

        Ok(Self {
            payload: payload.to_vec(),
            signature,
            footer,
            total_length: token.len(),
        })
    }

    /// Payload bytes. Untrusted until verified.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    /// Footer bytes; empty when the token has no footer segment.
    pub fn footer(&self) -> &[u8] {
        &self.footer
    }

    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }

    /// The footer as text, before the signature has been checked.
    ///
    /// Footers are readable by design so that a verifier can pick a key (for
    /// example by a `kid` value) before verifying. Nothing read here is
    /// authenticated; do not make authorization decisions from it.
    pub fn untrusted_footer(&self) -> Result<&str, PasetoError> {
        encoding::to_text(&self.footer)
            .map_err(|e| PasetoError::TokenInvalid(format!("footer is not valid UTF-8: {e}")))
    }

    pub fn payload_length(&self) -> usize {
        self.payload.len()
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// One-line description for logs; never includes payload contents.
    pub fn format_summary(&self) -> String {
        format!(
            "{HEADER} (payload: {} bytes, footer: {} bytes, total: {} bytes)",
            self.payload.len(),
            self.footer.len(),
            self.total_length
        )
    }
}

/// Render a token from its parts. An empty footer is omitted.
pub fn format_token(payload: &[u8], signature: &[u8], footer: &[u8]) -> String {
    let mut body = Vec::with_capacity(payload.len() + signature.len());
    body.extend_from_slice(payload);
    body.extend_from_slice(signature);

    let mut token = format!("{HEADER}{}", encoding::encode(&body));
    if !footer.is_empty() {
        token.push('.');
        token.push_str(&encoding::encode(footer));
    }
    token
}
