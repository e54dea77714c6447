use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EnvelopeFilter, KeyDirectory, MessageStore, StoreError, UserDirectory};
use crate::models::{EncryptedEnvelope, NewEnvelope, PublishedKey, UserProfile};

#[derive(Default)]
struct Inner {
    envelopes: Vec<EncryptedEnvelope>,
    last_created_at: Option<DateTime<Utc>>,
    profiles: HashMap<Uuid, UserProfile>,
    keys: HashMap<Uuid, PublishedKey>,
}

/// Process-local store. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a display profile; profiles are owned by another service in production.
    pub async fn insert_profile(&self, profile: UserProfile) {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile);
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn save(&self, envelope: NewEnvelope) -> Result<EncryptedEnvelope, StoreError> {
        let mut inner = self.inner.write().await;

        // Clock readings can repeat or step back; keep created_at non-decreasing
        let now = Utc::now();
        let created_at = match inner.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        inner.last_created_at = Some(created_at);

        let stored = EncryptedEnvelope {
            id: Uuid::new_v4(),
            sender_id: envelope.sender_id,
            recipient_id: envelope.recipient_id,
            fields: envelope.fields,
            created_at,
            seq: inner.envelopes.len() as i64 + 1,
        };
        inner.envelopes.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, filter: EnvelopeFilter) -> Result<Vec<EncryptedEnvelope>, StoreError> {
        let inner = self.inner.read().await;
        // Insertion order is already (created_at, seq) order
        Ok(inner
            .envelopes
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.inner.read().await.profiles.get(&user_id).cloned())
    }
}

#[async_trait]
impl KeyDirectory for InMemoryStore {
    async fn publish_key(
        &self,
        user_id: Uuid,
        public_key_hex: String,
    ) -> Result<PublishedKey, StoreError> {
        let key = PublishedKey {
            user_id,
            public_key_hex,
            updated_at: Utc::now(),
        };
        self.inner.write().await.keys.insert(user_id, key.clone());
        Ok(key)
    }

    async fn find_key(&self, user_id: Uuid) -> Result<Option<PublishedKey>, StoreError> {
        Ok(self.inner.read().await.keys.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_core::EncryptedFields;

    fn new_envelope(sender_id: Uuid, recipient_id: Uuid) -> NewEnvelope {
        NewEnvelope {
            sender_id,
            recipient_id,
            fields: EncryptedFields {
                ciphertext_hex: "ab".into(),
                iv_hex: "00".repeat(16),
                salt_hex: "11".repeat(32),
                auth_tag_hex: "22".repeat(16),
            },
        }
    }

    #[tokio::test]
    async fn test_save_assigns_increasing_seq_and_time() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let mut previous: Option<EncryptedEnvelope> = None;
        for _ in 0..50 {
            let saved = store.save(new_envelope(a, b)).await.unwrap();
            if let Some(prev) = previous {
                assert!(saved.seq > prev.seq);
                assert!(saved.created_at > prev.created_at);
            }
            previous = Some(saved);
        }
    }

    #[tokio::test]
    async fn test_find_filters_and_keeps_order() {
        let store = InMemoryStore::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let first = store.save(new_envelope(a, b)).await.unwrap();
        store.save(new_envelope(a, c)).await.unwrap();
        let third = store.save(new_envelope(b, a)).await.unwrap();

        let between = store.find(EnvelopeFilter::Between(a, b)).await.unwrap();
        let ids: Vec<Uuid> = between.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        let involving_c = store.find(EnvelopeFilter::Involving(c)).await.unwrap();
        assert_eq!(involving_c.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_key_replaces_previous() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();

        store.publish_key(user, "aa".repeat(32)).await.unwrap();
        store.publish_key(user, "bb".repeat(32)).await.unwrap();

        let key = store.find_key(user).await.unwrap().unwrap();
        assert_eq!(key.public_key_hex, "bb".repeat(32));
        assert!(store.find_key(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        assert!(store.find_user_profile(user).await.unwrap().is_none());

        store
            .insert_profile(UserProfile {
                user_id: user,
                username: "alice".into(),
                avatar_ref: None,
            })
            .await;
        let profile = store.find_user_profile(user).await.unwrap().unwrap();
        assert_eq!(profile.username, "alice");
    }
}
