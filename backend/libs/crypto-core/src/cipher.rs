//! Per-message authenticated encryption.
//!
//! Every call to [`encrypt`] draws a fresh 32-byte salt and 16-byte IV. The salt stretches
//! the caller's 32-byte secret through PBKDF2-HMAC-SHA512 (100,000 rounds) into a one-off
//! AES-256-GCM key, so no two messages share a key even when the secret is reused.
//!
//! Wire representation (all lower-case hex):
//!
//! | field          | decoded length |
//! |----------------|----------------|
//! | `ciphertext_hex` | plaintext length |
//! | `iv_hex`       | 16 bytes |
//! | `salt_hex`     | 32 bytes |
//! | `auth_tag_hex` | 16 bytes |

use aes_gcm::{
    aead::{consts::U16, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::CryptoError;

/// AES-256-GCM with a 128-bit IV
type Aes256Gcm16 = AesGcm<Aes256, U16>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const SALT_LEN: usize = 32;
pub const TAG_LEN: usize = 16;
pub const KDF_ITERATIONS: u32 = 100_000;

/// Hex-encoded output of one encryption, as stored and transported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedFields {
    pub ciphertext_hex: String,
    pub iv_hex: String,
    pub salt_hex: String,
    pub auth_tag_hex: String,
}

/// Binary form of [`EncryptedFields`] after length checks.
#[derive(Debug, Clone)]
pub struct DecodedFields {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    pub tag: [u8; TAG_LEN],
}

impl EncryptedFields {
    /// Decode every field, enforcing the fixed IV/salt/tag lengths.
    pub fn decode(&self) -> Result<DecodedFields, CryptoError> {
        let ciphertext = hex::decode(&self.ciphertext_hex)
            .map_err(|e| CryptoError::InvalidEnvelope(format!("ciphertext_hex: {e}")))?;

        Ok(DecodedFields {
            ciphertext,
            iv: decode_fixed::<IV_LEN>("iv_hex", &self.iv_hex)?,
            salt: decode_fixed::<SALT_LEN>("salt_hex", &self.salt_hex)?,
            tag: decode_fixed::<TAG_LEN>("auth_tag_hex", &self.auth_tag_hex)?,
        })
    }

    /// Validate the envelope shape, additionally capping the decoded ciphertext size.
    pub fn validate(&self, max_ciphertext_bytes: usize) -> Result<(), CryptoError> {
        // Cheap length check before decoding anything large
        if self.ciphertext_hex.len() > max_ciphertext_bytes.saturating_mul(2) {
            return Err(CryptoError::InvalidEnvelope(format!(
                "ciphertext exceeds {max_ciphertext_bytes} bytes"
            )));
        }
        self.decode().map(|_| ())
    }

    /// Canonical form: every field lower-case hex.
    pub fn into_lowercase(self) -> Self {
        Self {
            ciphertext_hex: self.ciphertext_hex.to_ascii_lowercase(),
            iv_hex: self.iv_hex.to_ascii_lowercase(),
            salt_hex: self.salt_hex.to_ascii_lowercase(),
            auth_tag_hex: self.auth_tag_hex.to_ascii_lowercase(),
        }
    }
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N], CryptoError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out).map_err(|e| {
        CryptoError::InvalidEnvelope(format!("{field}: expected {N} bytes of hex ({e})"))
    })?;
    Ok(out)
}

fn derive_message_key(
    secret: &[u8; KEY_LEN],
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha512>>(secret, salt, KDF_ITERATIONS, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypt `plaintext` under `key`, generating a fresh salt and IV.
///
/// CPU-bound (PBKDF2). Call [`encrypt_async`] from async code.
pub fn encrypt(plaintext: &str, key: &[u8; KEY_LEN]) -> Result<EncryptedFields, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut iv);
    OsRng.fill_bytes(&mut salt);

    let message_key = derive_message_key(key, &salt)?;
    let cipher =
        Aes256Gcm16::new_from_slice(&message_key[..]).map_err(|_| CryptoError::Encryption)?;

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
        .map_err(|_| CryptoError::Encryption)?;

    Ok(EncryptedFields {
        ciphertext_hex: hex::encode(&buffer),
        iv_hex: hex::encode(iv),
        salt_hex: hex::encode(salt),
        auth_tag_hex: hex::encode(tag),
    })
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// Any failure (malformed fields, wrong key, tag mismatch, non-UTF-8 output) yields the
/// same opaque [`CryptoError::Decryption`]; no partial plaintext is ever returned.
pub fn decrypt(fields: &EncryptedFields, key: &[u8; KEY_LEN]) -> Result<String, CryptoError> {
    let decoded = fields.decode().map_err(|_| CryptoError::Decryption)?;

    let message_key =
        derive_message_key(key, &decoded.salt).map_err(|_| CryptoError::Decryption)?;
    let cipher =
        Aes256Gcm16::new_from_slice(&message_key[..]).map_err(|_| CryptoError::Decryption)?;

    // aes-gcm applies the keystream before comparing tags, so the buffer must be wiped
    // on failure too.
    let mut buffer = Zeroizing::new(decoded.ciphertext);
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&decoded.iv),
            b"",
            &mut buffer[..],
            Tag::from_slice(&decoded.tag),
        )
        .map_err(|_| {
            tracing::debug!("message authentication failed");
            CryptoError::Decryption
        })?;

    String::from_utf8(buffer.to_vec()).map_err(|e| {
        zeroize::Zeroize::zeroize(&mut e.into_bytes());
        CryptoError::Decryption
    })
}

/// [`encrypt`] on the blocking worker pool.
///
/// Dropping the returned future does not abort the cipher; the result is discarded.
pub async fn encrypt_async(
    plaintext: String,
    key: Zeroizing<[u8; KEY_LEN]>,
) -> Result<EncryptedFields, CryptoError> {
    let plaintext = Zeroizing::new(plaintext);
    tokio::task::spawn_blocking(move || encrypt(&plaintext, &key))
        .await
        .map_err(|_| CryptoError::WorkerUnavailable)?
}

/// [`decrypt`] on the blocking worker pool.
pub async fn decrypt_async(
    fields: EncryptedFields,
    key: Zeroizing<[u8; KEY_LEN]>,
) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || decrypt(&fields, &key))
        .await
        .map_err(|_| CryptoError::WorkerUnavailable)?
}
