use chrono::{DateTime, Utc};
use crypto_core::EncryptedFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted encrypted message. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    #[serde(flatten)]
    pub fields: EncryptedFields,
    pub created_at: DateTime<Utc>,
    /// Store-assigned, strictly increasing; breaks `created_at` ties
    pub seq: i64,
}

impl EncryptedEnvelope {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }

    /// The other participant from `user_id`'s point of view.
    ///
    /// A note-to-self has the user as its own peer.
    pub fn peer_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.sender_id == user_id {
            Some(self.recipient_id)
        } else if self.recipient_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Ordering key for history and "most recent" selection
    pub fn recency(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.seq)
    }
}

/// A validated envelope that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewEnvelope {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub fields: EncryptedFields,
}

/// Body of `POST /api/v1/messages`; the sender is always the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    #[serde(flatten)]
    pub fields: EncryptedFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(sender: Uuid, recipient: Uuid) -> EncryptedEnvelope {
        EncryptedEnvelope {
            id: Uuid::new_v4(),
            sender_id: sender,
            recipient_id: recipient,
            fields: EncryptedFields {
                ciphertext_hex: "00".into(),
                iv_hex: "00".repeat(16),
                salt_hex: "00".repeat(32),
                auth_tag_hex: "00".repeat(16),
            },
            created_at: Utc::now(),
            seq: 1,
        }
    }

    #[test]
    fn test_peer_of() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let env = envelope(a, b);
        assert_eq!(env.peer_of(a), Some(b));
        assert_eq!(env.peer_of(b), Some(a));
        assert_eq!(env.peer_of(c), None);
        assert!(!env.involves(c));
    }

    #[test]
    fn test_note_to_self_peer_is_self() {
        let a = Uuid::new_v4();
        assert_eq!(envelope(a, a).peer_of(a), Some(a));
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let json = serde_json::to_value(envelope(Uuid::new_v4(), Uuid::new_v4())).unwrap();
        assert!(json.get("iv_hex").is_some());
        assert!(json.get("fields").is_none());
    }
}
