//! The signing seam between token assembly and the signature primitive.
//!
//! Token logic only ever hands a finished PAE buffer to a [`Signer`] and
//! awaits a signature. [`SecretKey`] signs in memory; keys held in an HSM or
//! behind a remote signing service implement the same trait.

use std::future::{self, Future};

use ed25519_dalek::{Signature, SignatureError};

use crate::keys::{PublicKey, SecretKey};

/// Something that can produce Ed25519 signatures for v4.public tokens.
///
/// The returned future completes once, with either a signature or an error.
/// It is not expected to support cancellation or partial results.
pub trait Signer {
    /// Sign the given message bytes.
    fn sign(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Signature, SignatureError>> + Send;

    /// The public key matching this signer.
    fn public_key(&self) -> PublicKey;
}

impl Signer for SecretKey {
    fn sign(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Signature, SignatureError>> + Send {
        use ed25519_dalek::Signer as _;
        future::ready(self.0.try_sign(message))
    }

    fn public_key(&self) -> PublicKey {
        SecretKey::public_key(self)
    }
}
