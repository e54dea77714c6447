//! # crypto-core
//!
//! Message-level cryptography for Nova direct messages.
//!
//! - `cipher`: per-message AES-256-GCM under a PBKDF2-stretched key (fresh salt and IV
//!   on every call)
//! - `key_agreement`: X25519 key pairs and shared-secret derivation
//! - `session`: a two-party cipher combining both, for client code
//!
//! The server never holds private keys; it only uses this crate to validate envelopes
//! and published public keys at its boundary.

pub mod cipher;
pub mod hash;
pub mod key_agreement;
pub mod session;

pub use cipher::{decrypt, decrypt_async, encrypt, encrypt_async, DecodedFields, EncryptedFields};
pub use key_agreement::{derive, generate_keypair, PrivateKey, PublicKey, SharedSecret};
pub use session::ConversationCipher;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Envelope fields are malformed (bad hex, wrong lengths, oversized)
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Key material is malformed or the peer key is unusable
    #[error("key agreement failed: {0}")]
    KeyAgreement(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption error")]
    Encryption,

    /// Deliberately opaque: never carries plaintext, key material or the failure cause
    #[error("decryption error")]
    Decryption,

    #[error("crypto worker unavailable")]
    WorkerUnavailable,
}
