//! In-process realtime fan-out.
//!
//! [`RealtimeRouter`] maps each user to the live channels that joined that user's room.
//! Delivery is at-most-once and never queued: an event for a user with no joined channel
//! is dropped, and the recipient catches up from stored history.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod message_types;
pub mod session;

pub use message_types::{RoutedEvent, WsInboundEvent, WsOutboundEvent};

/// Unique identifier for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of a connection's outbound queue
#[derive(Debug, Clone)]
pub struct DeliveryChannel {
    id: ChannelId,
    sender: UnboundedSender<String>,
}

impl DeliveryChannel {
    /// Open a channel. The receiver yields every payload routed to it.
    pub fn open() -> (Self, UnboundedReceiver<String>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                id: ChannelId::new(),
                sender,
            },
            receiver,
        )
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }
}

#[derive(Default)]
struct Rooms {
    // user_id -> channels joined to that user's room
    by_user: HashMap<Uuid, Vec<DeliveryChannel>>,
    // channel -> rooms it joined, for leave()
    by_channel: HashMap<ChannelId, Vec<Uuid>>,
}

/// Room membership table shared by every connection of the process.
///
/// Cloning is cheap and shares the table.
#[derive(Default, Clone)]
pub struct RealtimeRouter {
    inner: Arc<RwLock<Rooms>>,
}

impl RealtimeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `channel` to `user_id`'s room. Joining twice is a no-op.
    pub async fn join(&self, channel: &DeliveryChannel, user_id: Uuid) {
        let mut rooms = self.inner.write().await;

        let room = rooms.by_user.entry(user_id).or_default();
        if room.iter().any(|c| c.id == channel.id) {
            return;
        }
        room.push(channel.clone());
        let members = room.len();
        rooms.by_channel.entry(channel.id).or_default().push(user_id);

        tracing::debug!(
            channel = ?channel.id,
            %user_id,
            members,
            "Channel joined room"
        );
    }

    /// Deliver `event` to every channel joined to its recipient's room.
    ///
    /// Returns how many channels accepted it; zero is not an error. Channels whose
    /// receiving side has gone away are pruned.
    pub async fn route(&self, event: &RoutedEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode routed event");
                return 0;
            }
        };
        self.deliver(event.recipient_id(), payload).await
    }

    async fn deliver(&self, recipient_id: Uuid, payload: String) -> usize {
        let (delivered, dead) = {
            let rooms = self.inner.read().await;
            let Some(room) = rooms.by_user.get(&recipient_id) else {
                tracing::trace!(%recipient_id, "No joined channel, event dropped");
                return 0;
            };

            let mut delivered = 0;
            let mut dead = Vec::new();
            for channel in room {
                if channel.sender.send(payload.clone()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(channel.id);
                }
            }
            (delivered, dead)
        };

        if !dead.is_empty() {
            tracing::debug!(%recipient_id, dead = dead.len(), "Pruning closed channels");
            for id in dead {
                self.leave(id).await;
            }
        }
        delivered
    }

    /// Remove `channel` from every room. Unknown channels are ignored.
    pub async fn leave(&self, channel: ChannelId) {
        let mut rooms = self.inner.write().await;
        let Some(joined) = rooms.by_channel.remove(&channel) else {
            return;
        };

        for user_id in joined {
            if let Some(room) = rooms.by_user.get_mut(&user_id) {
                room.retain(|c| c.id != channel);
                if room.is_empty() {
                    rooms.by_user.remove(&user_id);
                }
            }
        }
        tracing::debug!(channel = ?channel, "Channel left all rooms");
    }

    /// Channels currently joined to `user_id`'s room
    pub async fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .by_user
            .get(&user_id)
            .map_or(0, Vec::len)
    }
}
