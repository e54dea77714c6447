//! X25519 key agreement.
//!
//! Each participant holds a static X25519 key pair and publishes the public half. Either
//! side derives the same 32-byte [`SharedSecret`] from its own private key and the peer's
//! public key; that secret is the input key for [`crate::cipher`].

use curve25519_dalek::montgomery::MontgomeryPoint;
use rand::rngs::OsRng;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::CryptoError;

pub const PUBLIC_KEY_LEN: usize = 32;
pub const PRIVATE_KEY_LEN: usize = 32;

/// A peer's X25519 public key, checked to be usable for agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(x25519_dalek::PublicKey);

/// A participant's X25519 private key. Zeroized on drop.
pub struct PrivateKey(StaticSecret);

/// Output of [`derive`]. Zeroized on drop, never serialized.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<[u8; 32]>);

impl PublicKey {
    /// Parse and validate raw key bytes.
    ///
    /// The key must be a canonical encoding (u < p) of a point on Curve25519 itself, not
    /// its quadratic twist, and must not be a low-order point: any scalar multiplied
    /// with one yields the all-zero secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::KeyAgreement(format!(
                "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        if !is_canonical(&raw) {
            return Err(CryptoError::KeyAgreement(
                "public key is not a canonical field element".to_string(),
            ));
        }
        // Twist points have no Edwards counterpart
        if MontgomeryPoint(raw).to_edwards(0).is_none() {
            return Err(CryptoError::KeyAgreement(
                "public key is not a point on Curve25519".to_string(),
            ));
        }

        let key = x25519_dalek::PublicKey::from(raw);
        let ephemeral = StaticSecret::random_from_rng(OsRng);
        if !ephemeral.diffie_hellman(&key).was_contributory() {
            return Err(CryptoError::KeyAgreement(
                "public key is a low-order point".to_string(),
            ));
        }

        Ok(Self(key))
    }

    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(value.trim())
            .map_err(|e| CryptoError::KeyAgreement(format!("public key hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        self.0.as_bytes()
    }
}

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: Zeroizing<[u8; PRIVATE_KEY_LEN]> =
            Zeroizing::new(bytes.try_into().map_err(|_| {
                CryptoError::KeyAgreement(format!(
                    "private key must be {PRIVATE_KEY_LEN} bytes"
                ))
            })?);
        Ok(Self(StaticSecret::from(*raw)))
    }

    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(value.trim())
                .map_err(|_| CryptoError::KeyAgreement("private key hex is malformed".into()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Hex export for client-side storage.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.to_bytes()))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(x25519_dalek::PublicKey::from(&self.0))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Owned copy for handing to the blocking worker pool.
    pub fn to_key(&self) -> Zeroizing<[u8; 32]> {
        self.0.clone()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Little-endian u-coordinate below p = 2^255 - 19, top bit clear
fn is_canonical(raw: &[u8; PUBLIC_KEY_LEN]) -> bool {
    if raw[31] & 0x80 != 0 {
        return false;
    }
    // The only values in [p, 2^255) are 0x7fff..ffed through 0x7fff..ffff
    let at_least_p = raw[31] == 0x7f && raw[1..31].iter().all(|&b| b == 0xff) && raw[0] >= 0xed;
    !at_least_p
}

/// Generate a fresh key pair from the OS RNG.
pub fn generate_keypair() -> (PublicKey, PrivateKey) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = x25519_dalek::PublicKey::from(&secret);
    (PublicKey(public), PrivateKey(secret))
}

/// Derive the shared secret between `local_private` and `remote_public`.
pub fn derive(
    local_private: &PrivateKey,
    remote_public: &PublicKey,
) -> Result<SharedSecret, CryptoError> {
    let shared = local_private.0.diffie_hellman(&remote_public.0);
    if !shared.was_contributory() {
        return Err(CryptoError::KeyAgreement(
            "agreement produced a non-contributory secret".to_string(),
        ));
    }
    Ok(SharedSecret(Zeroizing::new(shared.to_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair() {
        let (public, private) = generate_keypair();
        assert_eq!(public.as_bytes().len(), PUBLIC_KEY_LEN);
        assert_eq!(private.public_key(), public);
    }

    #[test]
    fn test_ecdh_derives_same_secret() {
        let (alice_pub, alice_priv) = generate_keypair();
        let (bob_pub, bob_priv) = generate_keypair();

        let alice_secret = derive(&alice_priv, &bob_pub).unwrap();
        let bob_secret = derive(&bob_priv, &alice_pub).unwrap();

        assert_eq!(alice_secret.as_bytes(), bob_secret.as_bytes());
    }

    #[test]
    fn test_derive_is_repeatable() {
        let (_, alice_priv) = generate_keypair();
        let (bob_pub, _) = generate_keypair();

        let first = derive(&alice_priv, &bob_pub).unwrap();
        let second = derive(&alice_priv, &bob_pub).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            PublicKey::from_bytes(&[9u8; 31]),
            Err(CryptoError::KeyAgreement(_))
        ));
        assert!(PrivateKey::from_bytes(&[1u8; 33]).is_err());
    }

    #[test]
    fn test_rejects_low_order_point() {
        // u = 0 has order 2, u = 1 has order 4
        assert!(PublicKey::from_bytes(&[0u8; 32]).is_err());
        let mut one = [0u8; 32];
        one[0] = 1;
        assert!(PublicKey::from_bytes(&one).is_err());
    }

    #[test]
    fn test_rejects_twist_point() {
        // u = 2 lies on the quadratic twist, not on Curve25519
        let mut two = [0u8; 32];
        two[0] = 2;
        assert!(matches!(
            PublicKey::from_bytes(&two),
            Err(CryptoError::KeyAgreement(msg)) if msg.contains("not a point")
        ));
    }

    #[test]
    fn test_accepts_base_point() {
        let mut nine = [0u8; 32];
        nine[0] = 9;
        assert!(PublicKey::from_bytes(&nine).is_ok());
    }

    #[test]
    fn test_rejects_non_canonical_encodings() {
        // p + 9 encodes the base point non-canonically
        let mut p_plus_nine = [0xffu8; 32];
        p_plus_nine[0] = 0xf6;
        p_plus_nine[31] = 0x7f;
        assert!(PublicKey::from_bytes(&p_plus_nine).is_err());

        let mut high_bit = [0u8; 32];
        high_bit[0] = 9;
        high_bit[31] = 0x80;
        assert!(PublicKey::from_bytes(&high_bit).is_err());
    }

    #[test]
    fn test_generated_keys_always_validate() {
        for _ in 0..32 {
            let (public, _) = generate_keypair();
            assert!(PublicKey::from_bytes(public.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_hex_roundtrip_of_private_key_preserves_public_key() {
        let (public, private) = generate_keypair();
        let restored = PrivateKey::from_hex(&private.to_hex()).unwrap();
        assert_eq!(restored.public_key(), public);
        assert_eq!(PublicKey::from_hex(&public.to_hex()).unwrap(), public);
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let (_, private) = generate_keypair();
        assert_eq!(format!("{:?}", private), "PrivateKey(..)");
    }
}
