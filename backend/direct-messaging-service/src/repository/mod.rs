//! Storage seams for envelopes, profiles and published keys.
//!
//! Services only see the traits; [`InMemoryStore`] backs tests and database-less runs,
//! [`PgStore`] backs production.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EncryptedEnvelope, NewEnvelope, PublishedKey, UserProfile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Which envelopes a lookup should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFilter {
    /// Both directions between two users
    Between(Uuid, Uuid),
    /// Everything a user sent or received
    Involving(Uuid),
}

impl EnvelopeFilter {
    pub fn matches(&self, envelope: &EncryptedEnvelope) -> bool {
        match *self {
            EnvelopeFilter::Between(a, b) => {
                (envelope.sender_id == a && envelope.recipient_id == b)
                    || (envelope.sender_id == b && envelope.recipient_id == a)
            }
            EnvelopeFilter::Involving(user_id) => envelope.involves(user_id),
        }
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new envelope, assigning its id, timestamp and sequence number.
    async fn save(&self, envelope: NewEnvelope) -> Result<EncryptedEnvelope, StoreError>;

    /// Matching envelopes in ascending `(created_at, seq)` order
    async fn find(&self, filter: EnvelopeFilter) -> Result<Vec<EncryptedEnvelope>, StoreError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError>;
}

#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Insert or replace the caller's public key
    async fn publish_key(
        &self,
        user_id: Uuid,
        public_key_hex: String,
    ) -> Result<PublishedKey, StoreError>;

    async fn find_key(&self, user_id: Uuid) -> Result<Option<PublishedKey>, StoreError>;
}
