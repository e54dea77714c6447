use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

/// Map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::Validation(_) => (kinds::VALIDATION_ERROR, error_codes::VALIDATION_ERROR),
        AppError::KeyAgreement(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_KEY),
        AppError::Decryption => (kinds::VALIDATION_ERROR, error_codes::DECRYPTION_FAILED),
        AppError::Unauthorized => (
            kinds::AUTHENTICATION_ERROR,
            error_codes::CALLER_IDENTITY_MISSING,
        ),
        AppError::PublicKeyNotFound(_) => {
            (kinds::NOT_FOUND_ERROR, error_codes::PUBLIC_KEY_NOT_FOUND)
        }
        AppError::Persistence(_) => (kinds::SERVER_ERROR, error_codes::PERSISTENCE_ERROR),
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal => {
            (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR)
        }
    };

    // Server-side failure details stay in the logs
    let message = match err {
        AppError::Persistence(detail) => {
            tracing::error!(error = %detail, "persistence failure");
            "message store unavailable".to_string()
        }
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal => {
            tracing::error!(error = %err, "internal error");
            "internal server error".to_string()
        }
        _ => err.to_string(),
    };

    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        &message,
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, response) = map_error(err);
    HttpResponse::build(status).json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let (status, body) = map_error(&AppError::Validation("iv_hex: bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::VALIDATION_ERROR);
        assert!(body.message.contains("iv_hex"));
    }

    #[test]
    fn test_persistence_detail_is_hidden() {
        let (status, body) =
            map_error(&AppError::Persistence("connection refused 10.0.0.7".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, error_codes::PERSISTENCE_ERROR);
        assert!(!body.message.contains("10.0.0.7"));
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let (status, body) = map_error(&AppError::Unauthorized);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Unauthorized");
    }

    #[test]
    fn test_missing_public_key_maps_to_404() {
        let (status, body) = map_error(&AppError::PublicKeyNotFound(uuid::Uuid::nil()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, error_codes::PUBLIC_KEY_NOT_FOUND);
    }
}
