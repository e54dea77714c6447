use crate::middleware::error_handling;
use crate::repository::StoreError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use crypto_core::CryptoError;
use thiserror::Error;
use uuid::Uuid;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    /// Malformed envelope or request fields; rejected before any cipher work
    #[error("validation error: {0}")]
    Validation(String),

    /// Unusable public key material
    #[error("key agreement error: {0}")]
    KeyAgreement(String),

    #[error("decryption failed")]
    Decryption,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no public key published for user {0}")]
    PublicKeyNotFound(Uuid),

    /// The store rejected or could not complete a read/write
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("internal server error")]
    Internal,
}

impl From<CryptoError> for AppError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidEnvelope(msg) => AppError::Validation(msg),
            CryptoError::KeyAgreement(msg) => AppError::KeyAgreement(msg),
            CryptoError::Decryption => AppError::Decryption,
            CryptoError::KeyDerivation(_)
            | CryptoError::Encryption
            | CryptoError::WorkerUnavailable => AppError::Internal,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl AppError {
    /// Returns HTTP status code
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::KeyAgreement(_) | AppError::Decryption => 400,
            AppError::Unauthorized => 401,
            AppError::PublicKeyNotFound(_) => 404,
            AppError::Persistence(_)
            | AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Internal => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_errors_map_to_client_errors() {
        let e: AppError = CryptoError::InvalidEnvelope("iv_hex".into()).into();
        assert_eq!(e.http_status(), 400);

        let e: AppError = CryptoError::KeyAgreement("low order".into()).into();
        assert!(matches!(e, AppError::KeyAgreement(_)));

        let e: AppError = CryptoError::Decryption.into();
        assert_eq!(e.to_string(), "decryption failed");
    }

    #[test]
    fn test_store_errors_are_server_errors() {
        let e: AppError = StoreError::Unavailable("pool exhausted".into()).into();
        assert_eq!(e.http_status(), 500);
        assert_eq!(ResponseError::status_code(&e), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
