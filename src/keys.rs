//! Ed25519 key material and its `k4.secret.` / `k4.public.` text form.
//!
//! Keys cross the API boundary as strings with an explicit version and type
//! prefix. Everything about a key string is validated here, before it can
//! reach a signing or verification call.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
use rand_core::CryptoRngCore;

#[cfg(feature = "logging")]
use tracing::debug;

use crate::PasetoError;
use crate::encoding;

/// Prefix of a v4 secret key string
pub const SECRET_KEY_PREFIX: &str = "k4.secret.";
/// Prefix of a v4 public key string
pub const PUBLIC_KEY_PREFIX: &str = "k4.public.";

/// A v4 secret key (Ed25519 seed and public half, 64 bytes)
#[derive(Clone)]
pub struct SecretKey(pub(crate) ed25519_dalek::SigningKey);

/// A v4 public key (Ed25519, 32 bytes)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) ed25519_dalek::VerifyingKey);

/// A matching secret/public key pair
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new Ed25519 key pair
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Self {
        let signing_key = ed25519_dalek::SigningKey::generate(rng);

        #[cfg(feature = "logging")]
        debug!("Generated new Ed25519 key pair");

        Self::from_secret_key(SecretKey(signing_key))
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Both keys as `(k4.secret..., k4.public...)` strings
    pub fn to_paserk(&self) -> (String, String) {
        (self.secret_key.to_paserk(), self.public_key.to_paserk())
    }
}

impl SecretKey {
    /// Import a secret key from its 64-byte `seed || public` form.
    ///
    /// The public half must be the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            PasetoError::KeyInvalid(format!(
                "secret key must be {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let signing_key = ed25519_dalek::SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| PasetoError::KeyInvalid(format!("inconsistent secret key: {e}")))?;
        Ok(Self(signing_key))
    }

    /// Export the 64-byte `seed || public` form
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.0.to_keypair_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Render as `k4.secret.<base64url>`.
    ///
    /// The result is secret material; `SecretKey` deliberately has no
    /// `Display` implementation.
    pub fn to_paserk(&self) -> String {
        format!("{SECRET_KEY_PREFIX}{}", encoding::encode(self.to_bytes()))
    }
}

impl FromStr for SecretKey {
    type Err = PasetoError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let bytes = strip_and_decode(key, SECRET_KEY_PREFIX)?;
        Self::from_bytes(&bytes)
    }
}

impl PublicKey {
    /// Import a public key from its 32 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: &[u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            PasetoError::KeyInvalid(format!(
                "public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|e| PasetoError::KeyInvalid(format!("invalid public key: {e}")))?;
        Ok(Self(verifying_key))
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Render as `k4.public.<base64url>`
    pub fn to_paserk(&self) -> String {
        format!("{PUBLIC_KEY_PREFIX}{}", encoding::encode(self.to_bytes()))
    }
}

impl FromStr for PublicKey {
    type Err = PasetoError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let bytes = strip_and_decode(key, PUBLIC_KEY_PREFIX)?;
        Self::from_bytes(&bytes)
    }
}

fn strip_and_decode(key: &str, prefix: &str) -> Result<Vec<u8>, PasetoError> {
    let encoded = key.strip_prefix(prefix).ok_or_else(|| {
        PasetoError::KeyInvalid(format!("key must start with '{prefix}'"))
    })?;
    encoding::decode(encoded)
        .map_err(|e| PasetoError::KeyInvalid(format!("invalid key encoding: {e}")))
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_paserk())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("algorithm", &"Ed25519")
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &"Ed25519")
            .field("key", &self.to_paserk())
            .finish()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &"Ed25519")
            .field("secret_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}
