//! Deterministic ECDSA keys and signatures for the subdomain succession chain.
//!
//! Signatures are RFC 6979 deterministic ECDSA over the SHA-256 digest of the
//! canonical record plaintext, carried on the wire as base64 of the raw
//! 64-byte `r || s` encoding. Determinism means re-signing identical content
//! is reproducible, so the chain carries no hidden nondeterminism.

use core::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};

/// Key pair able to sign subdomain succession records.
#[derive(Clone)]
pub struct Keypair(SigningKey);

impl Keypair {
    /// Generate a random keypair.
    pub fn random() -> Self {
        Self(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Construct a [Keypair] from a 32-byte secret scalar.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, InvalidSecretKey> {
        SigningKey::from_slice(secret)
            .map(Self)
            .map_err(|_| InvalidSecretKey)
    }

    /// Export the secret scalar behind this keypair.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Return the [PublicKey] associated with this [Keypair].
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Sign `plaintext` deterministically, returning the base64 wire form.
    ///
    /// The same key and plaintext always produce the same signature.
    pub fn sign(&self, plaintext: &[u8]) -> String {
        let signature: Signature = self.0.sign(plaintext);
        STANDARD.encode(signature.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair")
            .field(&self.public_key().to_hex())
            .finish()
    }
}

/// Public half of a [Keypair], identified on the wire by its compressed
/// SEC1 hex form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Compressed SEC1 hex of this key, as embedded in `pub-key` entries.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_encoded_point(true).as_bytes())
    }

    /// Parse a public key from SEC1 hex (compressed or uncompressed).
    pub fn from_hex(hex_str: &str) -> Result<Self, PublicKeyError> {
        let bytes = hex::decode(hex_str)?;
        VerifyingKey::from_sec1_bytes(&bytes)
            .map(Self)
            .map_err(|_| PublicKeyError::InvalidPoint)
    }

    /// Verify `sig_b64` over `plaintext`.
    ///
    /// Fails closed: a structurally valid but wrong signature returns
    /// `Ok(false)`. Malformed base64 or signature bytes are a
    /// [SignatureError], distinct from verification failure.
    pub fn verify(&self, plaintext: &[u8], sig_b64: &str) -> Result<bool, SignatureError> {
        let raw = STANDARD.decode(sig_b64)?;
        let signature = Signature::from_slice(&raw).map_err(|_| SignatureError::Malformed)?;
        Ok(self.0.verify(plaintext, &signature).is_ok())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

#[derive(thiserror::Error, Debug)]
/// Secret bytes do not form a valid ECDSA signing key.
#[error("secret bytes do not form a valid ECDSA signing key")]
pub struct InvalidSecretKey;

#[derive(thiserror::Error, Debug, Clone)]
/// Error parsing a public key from its hex wire form.
pub enum PublicKeyError {
    #[error("public key entry is not valid hex")]
    /// Public key entry is not valid hex
    Hex(#[from] hex::FromHexError),
    #[error("public key bytes do not encode a curve point")]
    /// Public key bytes do not encode a curve point
    InvalidPoint,
}

#[derive(thiserror::Error, Debug)]
/// Error parsing a signature from its base64 wire form.
pub enum SignatureError {
    #[error("signature is not valid base64")]
    /// Signature is not valid base64
    Encoding(#[from] base64::DecodeError),
    #[error("signature bytes do not form a valid ECDSA signature")]
    /// Signature bytes do not form a valid ECDSA signature
    Malformed,
}
