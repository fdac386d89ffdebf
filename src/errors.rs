use std::collections::BTreeMap;

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Per-field validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest {
        message: String,
        fields: FieldErrors,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Payment gateway error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        AppError::BadRequest {
            fields: FieldErrors::from([(field.to_string(), message.clone())]),
            message,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(what),
            DomainError::InvalidInput(msg) => AppError::bad_request(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Upstream(msg) => AppError::Upstream(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::BadRequest { message, fields } => HttpResponse::build(status).json(
                serde_json::json!({ "error": message, "fields": fields }),
            ),
            AppError::Upstream(detail) => {
                log::error!("Upstream failure: {}", detail);
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Payment gateway unavailable"
                }))
            }
            AppError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            _ => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    async fn body_json(err: AppError) -> serde_json::Value {
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn internal_error_body_hides_detail() {
        let body = body_json(AppError::Internal("relation \"orders\" missing".to_string())).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[actix_web::test]
    async fn field_errors_are_listed() {
        let body = body_json(AppError::invalid_field("total_amount", "not a decimal")).await;
        assert_eq!(body["error"], "not a decimal");
        assert_eq!(body["fields"]["total_amount"], "not a decimal");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            AppError::NotFound("Order".to_string()).to_string(),
            "Order not found"
        );
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::not_found("Order"), StatusCode::NOT_FOUND),
            (DomainError::invalid("bad value"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("sold out".to_string()), StatusCode::CONFLICT),
            (DomainError::Upstream("timeout".to_string()), StatusCode::BAD_GATEWAY),
            (DomainError::Internal("oops".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            assert_eq!(AppError::from(domain).status_code(), status);
        }
    }

    #[test]
    fn unauthorized_returns_401() {
        let err = AppError::Unauthorized("missing X-Admin-Id".to_string());
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
