use chrono::{DateTime, Utc};
use crypto_core::EncryptedFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::UserProfile;

/// Inbox entry for one peer, derived from the latest envelope exchanged with them.
///
/// The preview is still ciphertext; only clients can open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub peer_id: Uuid,
    pub last_message_id: Uuid,
    pub last_message_preview: EncryptedFields,
    pub last_activity_at: DateTime<Utc>,
}

/// Summary plus the peer's display profile, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    #[serde(flatten)]
    pub summary: ConversationSummary,
    pub peer_profile: Option<UserProfile>,
}
