pub mod conversation_service;
pub mod key_service;
pub mod message_service;

pub use conversation_service::{aggregate_conversations, ConversationService};
pub use key_service::KeyService;
pub use message_service::MessageService;
