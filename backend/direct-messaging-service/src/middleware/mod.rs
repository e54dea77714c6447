pub mod auth;
pub mod error_handling;
pub mod guards;

pub use auth::CALLER_ID_HEADER;
pub use guards::User;
