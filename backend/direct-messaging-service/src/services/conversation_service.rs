use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ConversationSummary, ConversationView, EncryptedEnvelope};
use crate::repository::{EnvelopeFilter, MessageStore, UserDirectory};

/// Reduce `user_id`'s envelopes to one summary per peer, most recently active first.
///
/// Within a peer the latest envelope by `(created_at, seq)` wins. Peers whose latest
/// envelopes share a timestamp are ordered by `seq` ascending, so the earlier-persisted
/// conversation comes first. Envelopes not involving `user_id` are ignored. Nothing is
/// decrypted; previews stay ciphertext.
pub fn aggregate_conversations(
    user_id: Uuid,
    envelopes: &[EncryptedEnvelope],
) -> Vec<ConversationSummary> {
    let mut latest: HashMap<Uuid, &EncryptedEnvelope> = HashMap::new();

    for envelope in envelopes {
        let Some(peer_id) = envelope.peer_of(user_id) else {
            continue;
        };
        latest
            .entry(peer_id)
            .and_modify(|current| {
                if envelope.recency() > current.recency() {
                    *current = envelope;
                }
            })
            .or_insert(envelope);
    }

    let mut winners: Vec<(Uuid, &EncryptedEnvelope)> = latest.into_iter().collect();
    winners.sort_by(|(_, a), (_, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.seq.cmp(&b.seq))
    });

    winners
        .into_iter()
        .map(|(peer_id, envelope)| ConversationSummary {
            peer_id,
            last_message_id: envelope.id,
            last_message_preview: envelope.fields.clone(),
            last_activity_at: envelope.created_at,
        })
        .collect()
}

pub struct ConversationService;

impl ConversationService {
    pub async fn list_conversations(
        store: &dyn MessageStore,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, AppError> {
        let envelopes = store.find(EnvelopeFilter::Involving(user_id)).await?;
        let summaries = aggregate_conversations(user_id, &envelopes);
        debug!(
            %user_id,
            envelopes = envelopes.len(),
            conversations = summaries.len(),
            "Conversations aggregated"
        );
        Ok(summaries)
    }

    /// [`Self::list_conversations`] plus each peer's display profile.
    ///
    /// A failed or empty profile lookup leaves `peer_profile` unset instead of failing the
    /// whole listing.
    pub async fn list_conversation_views(
        store: &dyn MessageStore,
        users: &dyn UserDirectory,
        user_id: Uuid,
    ) -> Result<Vec<ConversationView>, AppError> {
        let summaries = Self::list_conversations(store, user_id).await?;

        let mut views = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let peer_profile = match users.find_user_profile(summary.peer_id).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(peer_id = %summary.peer_id, error = %e, "Profile lookup failed");
                    None
                }
            };
            views.push(ConversationView {
                summary,
                peer_profile,
            });
        }
        Ok(views)
    }
}
