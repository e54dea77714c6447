use crypto_core::{hash::key_fingerprint, PublicKey};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::PublishedKey;
use crate::repository::KeyDirectory;

pub struct KeyService;

impl KeyService {
    /// Publish `user_id`'s X25519 public key after checking it is a usable point.
    pub async fn publish(
        keys: &dyn KeyDirectory,
        user_id: Uuid,
        public_key_hex: &str,
    ) -> Result<PublishedKey, AppError> {
        let key = PublicKey::from_hex(public_key_hex)?;
        let published = keys.publish_key(user_id, key.to_hex()).await?;

        info!(
            %user_id,
            fingerprint = %key_fingerprint(key.as_bytes()),
            "Public key published"
        );
        Ok(published)
    }

    pub async fn fetch(keys: &dyn KeyDirectory, user_id: Uuid) -> Result<PublishedKey, AppError> {
        keys.find_key(user_id)
            .await?
            .ok_or(AppError::PublicKeyNotFound(user_id))
    }
}
