use sha2::{Digest, Sha256};

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Short, non-reversible fingerprint of a public key for logs (first 8 bytes of SHA256, hex)
pub fn key_fingerprint(public_key: &[u8]) -> String {
    hex::encode(&sha256(public_key)[..8])
}
