use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{EncryptedEnvelope, NewEnvelope, SendMessageRequest};
use crate::repository::{EnvelopeFilter, MessageStore};

pub struct MessageService;

impl MessageService {
    /// Validate and persist an envelope from `sender_id`.
    ///
    /// Nothing is routed to live connections here; realtime delivery goes through the
    /// WebSocket path.
    pub async fn send_message(
        store: &dyn MessageStore,
        sender_id: Uuid,
        request: SendMessageRequest,
        max_ciphertext_bytes: usize,
    ) -> Result<EncryptedEnvelope, AppError> {
        if let Err(e) = request.fields.validate(max_ciphertext_bytes) {
            warn!(%sender_id, recipient_id = %request.recipient_id, error = %e, "Rejected malformed envelope");
            return Err(e.into());
        }

        let stored = store
            .save(NewEnvelope {
                sender_id,
                recipient_id: request.recipient_id,
                fields: request.fields.into_lowercase(),
            })
            .await?;

        debug!(
            message_id = %stored.id,
            %sender_id,
            recipient_id = %stored.recipient_id,
            seq = stored.seq,
            "Envelope stored"
        );
        Ok(stored)
    }

    /// Envelopes exchanged between `user_id` and `peer_id`, oldest first
    pub async fn get_history(
        store: &dyn MessageStore,
        user_id: Uuid,
        peer_id: Uuid,
    ) -> Result<Vec<EncryptedEnvelope>, AppError> {
        Ok(store.find(EnvelopeFilter::Between(user_id, peer_id)).await?)
    }
}
