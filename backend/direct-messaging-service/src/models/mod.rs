pub mod conversation;
pub mod envelope;
pub mod profile;

pub use conversation::{ConversationSummary, ConversationView};
pub use envelope::{EncryptedEnvelope, NewEnvelope, SendMessageRequest};
pub use profile::{PublishedKey, UserProfile};
