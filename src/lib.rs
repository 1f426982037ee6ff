//! # paseto-v4: PASETO v4.public tokens
//!
//! Signed, unencrypted tokens using Ed25519. A token carries a JSON payload
//! and an optional footer; both are covered by the signature. An optional
//! implicit assertion can be bound into the signature without ever being
//! transported in the token.
//!
//! ## Token Format
//!
//! ```text
//! v4.public.<base64url(payload || signature)>[.<base64url(footer)>]
//! ```
//!
//! The signature is computed over `PAE([header, payload, footer, assertion])`
//! (see [`pae`]), not over the payload alone.
//!
//! ## Example Usage
//!
//! ```rust
//! use paseto_v4::{KeyPair, OsRng, PasetoV4, SignOptions, VerifyOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), paseto_v4::PasetoError> {
//! let keypair = KeyPair::generate(&mut OsRng);
//! let (secret_key, public_key) = keypair.to_paserk();
//!
//! let options = SignOptions::new()
//!     .with_footer("kid-2024-01")
//!     .with_assertion("tenant-42");
//! let token = PasetoV4::sign(&secret_key, r#"{"sub":"user123"}"#, &options).await?;
//!
//! let verified = PasetoV4::verify(
//!     &public_key,
//!     &token,
//!     &VerifyOptions::new().with_assertion("tenant-42"),
//! )?;
//! assert_eq!(verified.payload()["sub"], "user123");
//! assert_eq!(verified.footer(), "kid-2024-01");
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use ed25519_dalek::{Signature, SignatureError};
pub use rand_core::{CryptoRngCore, OsRng};

#[cfg(feature = "logging")]
use tracing::{debug, instrument, warn};

pub mod encoding;
pub mod keys;
pub mod pae;
pub mod signer;
pub mod token;

pub use keys::{KeyPair, PublicKey, SecretKey};
pub use pae::{le64_encode, pae_encode};
pub use signer::Signer;
pub use token::{ParsedToken, TokenInput};

/// Version and purpose header of every token, also the first PAE piece
pub const HEADER: &str = "v4.public.";

/// Length of an Ed25519 signature
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// Default upper bound on accepted token length (1 MiB)
pub const DEFAULT_MAX_TOKEN_LEN: usize = 1024 * 1024;

/// v4.public token issuing and verification
pub struct PasetoV4;

/// Errors that can occur during token operations
///
/// Each variant names the stage that rejected the input. Structural problems
/// are always reported as [`PasetoError::TokenInvalid`], never as a signature
/// failure, so transport bugs can be told apart from tampering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasetoError {
    #[error("Invalid key: {0}")]
    KeyInvalid(String),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    #[error("Invalid payload: {0}")]
    PayloadInvalid(String),
}

/// The kind of a [`PasetoError`], without its detail message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    KeyInvalid,
    TokenInvalid,
    SignatureInvalid,
    PayloadInvalid,
}

impl PasetoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyInvalid(_) => ErrorKind::KeyInvalid,
            Self::TokenInvalid(_) => ErrorKind::TokenInvalid,
            Self::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            Self::PayloadInvalid(_) => ErrorKind::PayloadInvalid,
        }
    }
}

/// Options for issuing a token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Footer text; empty means no footer segment
    pub footer: String,
    /// Implicit assertion; signed but never written into the token
    pub assertion: Vec<u8>,
}

impl SignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn with_assertion(mut self, assertion: impl AsRef<[u8]>) -> Self {
        self.assertion = assertion.as_ref().to_vec();
        self
    }
}

/// Options for verifying a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Implicit assertion the token must have been signed with
    pub assertion: Vec<u8>,
    /// Tokens longer than this are rejected before parsing
    pub max_token_len: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            assertion: Vec::new(),
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assertion(mut self, assertion: impl AsRef<[u8]>) -> Self {
        self.assertion = assertion.as_ref().to_vec();
        self
    }

    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }
}

/// A token whose signature has been checked and whose contents are decoded
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    payload: Value,
    footer: String,
    raw_token: String,
}

impl VerifiedToken {
    /// The verified payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The verified footer; empty when the token had none
    pub fn footer(&self) -> &str {
        &self.footer
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    /// Deserialize the payload into a caller-defined type
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, PasetoError> {
        T::deserialize(&self.payload)
            .map_err(|e| PasetoError::PayloadInvalid(format!("unexpected payload shape: {e}")))
    }

    /// Take the payload and footer, consuming the verified token
    pub fn into_parts(self) -> (Value, String) {
        (self.payload, self.footer)
    }
}

impl PasetoV4 {
    /// Sign a payload with a `k4.secret.` key string
    #[cfg_attr(feature = "logging", instrument(skip_all, fields(payload_len = payload.len())))]
    pub async fn sign(
        secret_key: &str,
        payload: &str,
        options: &SignOptions,
    ) -> Result<String, PasetoError> {
        let secret_key: SecretKey = secret_key.parse()?;
        Self::sign_with_signer(&secret_key, payload, options).await
    }

    /// Sign a payload with an already parsed secret key
    pub async fn sign_with_key(
        secret_key: &SecretKey,
        payload: &str,
        options: &SignOptions,
    ) -> Result<String, PasetoError> {
        Self::sign_with_signer(secret_key, payload, options).await
    }

    /// Serialize `payload` as JSON and sign it
    pub async fn sign_json<T: Serialize + ?Sized>(
        secret_key: &SecretKey,
        payload: &T,
        options: &SignOptions,
    ) -> Result<String, PasetoError> {
        let payload = serde_json::to_string(payload)
            .map_err(|e| PasetoError::PayloadInvalid(format!("cannot serialize payload: {e}")))?;
        Self::sign_with_signer(secret_key, &payload, options).await
    }

    /// Sign a payload through any [`Signer`], such as a remote signing service
    ///
    /// A signer failure is reported as [`PasetoError::KeyInvalid`].
    pub async fn sign_with_signer<S: Signer>(
        signer: &S,
        payload: &str,
        options: &SignOptions,
    ) -> Result<String, PasetoError> {
        let payload = payload.as_bytes();
        let footer = options.footer.as_bytes();

        let message =
            pae::pae_encode_public_token(HEADER.as_bytes(), payload, footer, &options.assertion);

        let signature = signer.sign(&message).await.map_err(|e| {
            #[cfg(feature = "logging")]
            warn!("Signer failed: {}", e);

            PasetoError::KeyInvalid(format!("signing failed: {e}"))
        })?;

        let token = token::format_token(payload, &signature.to_bytes(), footer);

        #[cfg(feature = "logging")]
        debug!(
            "Generated token of {} bytes (footer: {} bytes)",
            token.len(),
            footer.len()
        );

        Ok(token)
    }

    /// Verify a token with a `k4.public.` key string
    ///
    /// `token` may be text or raw bytes (see [`TokenInput`]).
    pub fn verify<'a>(
        public_key: &str,
        token: impl Into<TokenInput<'a>>,
        options: &VerifyOptions,
    ) -> Result<VerifiedToken, PasetoError> {
        let public_key: PublicKey = public_key.parse()?;
        Self::verify_with_key(&public_key, token, options)
    }

    /// Verify a token with an already parsed public key
    ///
    /// Stages run in order and stop at the first failure:
    /// 1. the input is resolved to text and parsed ([`PasetoError::TokenInvalid`]);
    /// 2. the signature over the rebuilt PAE buffer is checked
    ///    ([`PasetoError::SignatureInvalid`]);
    /// 3. only then are payload and footer decoded ([`PasetoError::PayloadInvalid`]).
    #[cfg_attr(feature = "logging", instrument(skip_all))]
    pub fn verify_with_key<'a>(
        public_key: &PublicKey,
        token: impl Into<TokenInput<'a>>,
        options: &VerifyOptions,
    ) -> Result<VerifiedToken, PasetoError> {
        let result = Self::verify_input(public_key, &token.into(), options);
        if let Err(err) = &result {
            log_rejection(err);
        }
        result
    }

    fn verify_input(
        public_key: &PublicKey,
        input: &TokenInput<'_>,
        options: &VerifyOptions,
    ) -> Result<VerifiedToken, PasetoError> {
        let token = input.as_text()?;
        if token.len() > options.max_token_len {
            return Err(PasetoError::TokenInvalid(format!(
                "token is {} bytes, limit is {}",
                token.len(),
                options.max_token_len
            )));
        }

        let parsed = ParsedToken::parse(token)?;

        let message = pae::pae_encode_public_token(
            HEADER.as_bytes(),
            parsed.payload(),
            parsed.footer(),
            &options.assertion,
        );
        let signature = Signature::from_bytes(parsed.signature());
        public_key
            .0
            .verify_strict(&message, &signature)
            .map_err(|_| PasetoError::SignatureInvalid("signature verification failed".into()))?;

        #[cfg(feature = "logging")]
        debug!("Signature verification successful");

        let payload = encoding::to_text(parsed.payload())
            .map_err(|e| PasetoError::PayloadInvalid(format!("payload is not valid UTF-8: {e}")))?;
        let payload: Value = serde_json::from_str(payload)
            .map_err(|e| PasetoError::PayloadInvalid(format!("payload is not valid JSON: {e}")))?;
        let footer = encoding::to_text(parsed.footer())
            .map_err(|e| PasetoError::PayloadInvalid(format!("footer is not valid UTF-8: {e}")))?;

        Ok(VerifiedToken {
            payload,
            footer: footer.to_string(),
            raw_token: token.to_string(),
        })
    }
}

fn log_rejection(_err: &PasetoError) {
    #[cfg(feature = "logging")]
    warn!(kind = ?_err.kind(), "Token rejected: {}", _err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;
    use serde::Deserialize;

    const MESSAGE: &str = r#"{"sub":"user123","iss":"auth-service","roles":["user","admin"]}"#;

    #[tokio::test]
    async fn test_basic_sign_and_verify() {
        let keypair = KeyPair::generate(&mut thread_rng());

        let token = PasetoV4::sign_with_key(keypair.secret_key(), MESSAGE, &SignOptions::new())
            .await
            .unwrap();
        assert!(token.starts_with("v4.public."));
        assert_eq!(token.split('.').count(), 3);

        let verified =
            PasetoV4::verify_with_key(keypair.public_key(), &token, &VerifyOptions::new())
                .unwrap();
        assert_eq!(verified.payload()["sub"], "user123");
        assert_eq!(verified.payload()["roles"][1], "admin");
        assert_eq!(verified.footer(), "");
        assert_eq!(verified.raw_token(), token);
    }

    #[tokio::test]
    async fn test_sign_and_verify_with_key_strings() {
        let keypair = KeyPair::generate(&mut thread_rng());
        let (secret, public) = keypair.to_paserk();

        let token = PasetoV4::sign(&secret, MESSAGE, &SignOptions::new().with_footer("kid-1"))
            .await
            .unwrap();
        let verified = PasetoV4::verify(&public, &token, &VerifyOptions::new()).unwrap();

        let (payload, footer) = verified.into_parts();
        assert_eq!(payload["iss"], "auth-service");
        assert_eq!(footer, "kid-1");
    }

    #[tokio::test]
    async fn test_sign_json_and_payload_as() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Claims {
            sub: String,
            scopes: Vec<String>,
        }

        let keypair = KeyPair::generate(&mut thread_rng());
        let claims = Claims {
            sub: "user123".into(),
            scopes: vec!["read".into(), "write".into()],
        };

        let token = PasetoV4::sign_json(keypair.secret_key(), &claims, &SignOptions::new())
            .await
            .unwrap();
        let verified =
            PasetoV4::verify_with_key(keypair.public_key(), &token, &VerifyOptions::new())
                .unwrap();

        assert_eq!(verified.payload_as::<Claims>().unwrap(), claims);
        assert!(matches!(
            verified.payload_as::<Vec<u8>>(),
            Err(PasetoError::PayloadInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_public_key() {
        let keypair1 = KeyPair::generate(&mut thread_rng());
        let keypair2 = KeyPair::generate(&mut thread_rng());

        let token = PasetoV4::sign_with_key(keypair1.secret_key(), MESSAGE, &SignOptions::new())
            .await
            .unwrap();
        let err = PasetoV4::verify_with_key(keypair2.public_key(), &token, &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid);
    }

    #[tokio::test]
    async fn test_assertion_binding() {
        let keypair = KeyPair::generate(&mut thread_rng());
        let options = SignOptions::new().with_assertion("nonce-1");

        let token = PasetoV4::sign_with_key(keypair.secret_key(), MESSAGE, &options)
            .await
            .unwrap();

        // The assertion never appears on the wire
        assert_eq!(token.split('.').count(), 3);

        PasetoV4::verify_with_key(
            keypair.public_key(),
            &token,
            &VerifyOptions::new().with_assertion("nonce-1"),
        )
        .unwrap();

        for assertion in ["nonce-2", ""] {
            let err = PasetoV4::verify_with_key(
                keypair.public_key(),
                &token,
                &VerifyOptions::new().with_assertion(assertion),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SignatureInvalid);
        }
    }

    #[tokio::test]
    async fn test_footer_is_authenticated() {
        let keypair = KeyPair::generate(&mut thread_rng());

        let token = PasetoV4::sign_with_key(
            keypair.secret_key(),
            MESSAGE,
            &SignOptions::new().with_footer("kid-1"),
        )
        .await
        .unwrap();

        let (body, _) = token.rsplit_once('.').unwrap();
        let swapped = format!("{body}.{}", encoding::encode("kid-2"));
        let err = PasetoV4::verify_with_key(keypair.public_key(), &swapped, &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid);

        // Dropping the footer segment also breaks the signature
        let err = PasetoV4::verify_with_key(keypair.public_key(), body, &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid);
    }

    #[tokio::test]
    async fn test_non_json_payload_rejected_after_signature_check() {
        let keypair = KeyPair::generate(&mut thread_rng());

        let token =
            PasetoV4::sign_with_key(keypair.secret_key(), "not json", &SignOptions::new())
                .await
                .unwrap();

        let err = PasetoV4::verify_with_key(keypair.public_key(), &token, &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadInvalid);

        // With the wrong key the same token fails on the signature instead
        let other = KeyPair::generate(&mut thread_rng());
        let err = PasetoV4::verify_with_key(other.public_key(), &token, &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid);
    }

    #[tokio::test]
    async fn test_max_token_len() {
        let keypair = KeyPair::generate(&mut thread_rng());
        let token = PasetoV4::sign_with_key(keypair.secret_key(), MESSAGE, &SignOptions::new())
            .await
            .unwrap();

        let err = PasetoV4::verify_with_key(
            keypair.public_key(),
            &token,
            &VerifyOptions::new().with_max_token_len(token.len() - 1),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TokenInvalid);

        PasetoV4::verify_with_key(
            keypair.public_key(),
            &token,
            &VerifyOptions::new().with_max_token_len(token.len()),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_keys() {
        let err = PasetoV4::sign("k4.public.abc", MESSAGE, &SignOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyInvalid);

        let err = PasetoV4::verify("k3.public.abc", "v4.public.abc", &VerifyOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyInvalid);
    }

    #[tokio::test]
    async fn test_failing_signer_reports_key_invalid() {
        struct BrokenSigner(PublicKey);

        impl Signer for BrokenSigner {
            async fn sign(&self, _message: &[u8]) -> Result<Signature, SignatureError> {
                Err(SignatureError::new())
            }

            fn public_key(&self) -> PublicKey {
                self.0
            }
        }

        let keypair = KeyPair::generate(&mut thread_rng());
        let signer = BrokenSigner(*keypair.public_key());

        let err = PasetoV4::sign_with_signer(&signer, MESSAGE, &SignOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyInvalid);
    }

    #[test]
    fn test_error_display() {
        let err = PasetoError::TokenInvalid("expected 3 or 4 segments".into());
        assert_eq!(err.to_string(), "Invalid token: expected 3 or 4 segments");
        assert_eq!(err.kind(), ErrorKind::TokenInvalid);
    }
}
