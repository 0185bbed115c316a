//! Mapping of domain failures onto HTTP responses

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use qz_core::errors::DomainError;
use qz_shared::{error_codes, ErrorResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => error_codes::VALIDATION_ERROR,
            ApiError::Domain(err) => match err {
                DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
                DomainError::BusinessRule { .. } => error_codes::BUSINESS_RULE,
                DomainError::NotFound { .. } => error_codes::NOT_FOUND,
                DomainError::Conflict { .. } => error_codes::CONFLICT,
                DomainError::Persistence(_) => error_codes::DATABASE_ERROR,
                _ => error_codes::INTERNAL_ERROR,
            },
        }
    }

    /// Client-facing message; server-side failures are not echoed back
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Conflict { .. } => StatusCode::CONFLICT,
                DomainError::BusinessRule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let mut body = ErrorResponse::new(self.error_code(), self.public_message());
        if let ApiError::InvalidRequest(errors) = self {
            for (field, failures) in errors.field_errors() {
                let codes: Vec<String> = failures.iter().map(|f| f.code.to_string()).collect();
                body = body.add_detail(field, codes);
            }
        }
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status_code()
    }

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        assert_eq!(status_of(DomainError::not_found("User 1")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DomainError::Validation { message: "bad".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Conflict { message: "taken".into() }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::BusinessRule { message: "done".into() }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(DomainError::TransactionClosed), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "secret host unreachable");
        let err = ApiError::from(DomainError::persistence(io));

        assert_eq!(err.error_code(), error_codes::DATABASE_ERROR);
        assert!(!err.public_message().contains("secret"));
    }
}
