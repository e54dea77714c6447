use crypto_core::EncryptedFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Encrypted message pushed to a live recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Id of the stored envelope, when the sender persisted it first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: EncryptedFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingStatusEvent {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub is_typing: bool,
}

/// Free-form encryption state notice, e.g. "key_rotated"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionStatusEvent {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub status: String,
}

/// Events the router fans out, serialized exactly as they arrived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutedEvent {
    Message(MessageEvent),
    TypingStatus(TypingStatusEvent),
    EncryptionStatus(EncryptionStatusEvent),
}

impl RoutedEvent {
    pub fn sender_id(&self) -> Uuid {
        match self {
            RoutedEvent::Message(e) => e.sender_id,
            RoutedEvent::TypingStatus(e) => e.sender_id,
            RoutedEvent::EncryptionStatus(e) => e.sender_id,
        }
    }

    pub fn recipient_id(&self) -> Uuid {
        match self {
            RoutedEvent::Message(e) => e.recipient_id,
            RoutedEvent::TypingStatus(e) => e.recipient_id,
            RoutedEvent::EncryptionStatus(e) => e.recipient_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RoutedEvent::Message(_) => "message",
            RoutedEvent::TypingStatus(_) => "typing_status",
            RoutedEvent::EncryptionStatus(_) => "encryption_status",
        }
    }
}

/// Inbound WebSocket frames from client to server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsInboundEvent {
    Join { user_id: Uuid },
    Message(MessageEvent),
    TypingStatus(TypingStatusEvent),
    EncryptionStatus(EncryptionStatusEvent),
}

impl WsInboundEvent {
    /// The routable form of this frame; `None` for `join`
    pub fn into_routed(self) -> Option<RoutedEvent> {
        match self {
            WsInboundEvent::Join { .. } => None,
            WsInboundEvent::Message(e) => Some(RoutedEvent::Message(e)),
            WsInboundEvent::TypingStatus(e) => Some(RoutedEvent::TypingStatus(e)),
            WsInboundEvent::EncryptionStatus(e) => Some(RoutedEvent::EncryptionStatus(e)),
        }
    }
}

/// Frames the server itself originates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutboundEvent {
    Joined { user_id: Uuid },
    Error { code: String, message: String },
}

impl WsOutboundEvent {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        WsOutboundEvent::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
