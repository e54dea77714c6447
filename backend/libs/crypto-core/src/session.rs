use crate::cipher::{self, EncryptedFields};
use crate::key_agreement::{derive, PrivateKey, PublicKey, SharedSecret};
use crate::CryptoError;

/// Client-side cipher for one conversation between two participants.
///
/// Holds only the derived shared secret; every `seal` still gets its own salt, IV and
/// derived message key.
#[derive(Clone, Debug)]
pub struct ConversationCipher {
    secret: SharedSecret,
}

impl ConversationCipher {
    pub fn new(local_private: &PrivateKey, remote_public: &PublicKey) -> Result<Self, CryptoError> {
        Ok(Self {
            secret: derive(local_private, remote_public)?,
        })
    }

    pub fn seal(&self, plaintext: &str) -> Result<EncryptedFields, CryptoError> {
        cipher::encrypt(plaintext, self.secret.as_bytes())
    }

    pub fn open(&self, fields: &EncryptedFields) -> Result<String, CryptoError> {
        cipher::decrypt(fields, self.secret.as_bytes())
    }

    pub async fn seal_async(&self, plaintext: String) -> Result<EncryptedFields, CryptoError> {
        cipher::encrypt_async(plaintext, self.secret.to_key()).await
    }

    pub async fn open_async(&self, fields: EncryptedFields) -> Result<String, CryptoError> {
        cipher::decrypt_async(fields, self.secret.to_key()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_agreement::generate_keypair;

    #[test]
    fn test_both_sides_open_each_others_messages() {
        let (alice_pub, alice_priv) = generate_keypair();
        let (bob_pub, bob_priv) = generate_keypair();

        let alice = ConversationCipher::new(&alice_priv, &bob_pub).unwrap();
        let bob = ConversationCipher::new(&bob_priv, &alice_pub).unwrap();

        let sealed = alice.seal("see you at 8").unwrap();
        assert_eq!(bob.open(&sealed).unwrap(), "see you at 8");

        let reply = bob.seal("ok").unwrap();
        assert_eq!(alice.open(&reply).unwrap(), "ok");
    }

    #[test]
    fn test_third_party_cannot_open() {
        let (_, alice_priv) = generate_keypair();
        let (bob_pub, _) = generate_keypair();
        let (_, eve_priv) = generate_keypair();

        let alice = ConversationCipher::new(&alice_priv, &bob_pub).unwrap();
        let eve = ConversationCipher::new(&eve_priv, &bob_pub).unwrap();

        let sealed = alice.seal("private").unwrap();
        assert!(matches!(eve.open(&sealed), Err(CryptoError::Decryption)));
    }
}
