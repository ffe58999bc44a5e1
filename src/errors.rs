use actix_web::HttpResponse;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Error placing order")]
    PaymentInit { detail: String },
    #[error("Error verifying payment")]
    Verification(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound | DomainError::OrderNotFound => {
                AppError::NotFound(e.to_string())
            }
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::PaymentInit(detail) => AppError::PaymentInit { detail },
            DomainError::Verification(detail) => AppError::Verification(detail),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(message) => HttpResponse::NotFound().json(json!({
                "success": false,
                "message": message,
            })),
            AppError::BadRequest(message) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": message,
            })),
            AppError::PaymentInit { detail } => {
                log::error!("Error placing order: {}", detail);
                // The gateway payload is often JSON; forward it structured
                // when it parses, verbatim otherwise. Diagnostics only.
                let error: Value = serde_json::from_str(detail)
                    .unwrap_or_else(|_| Value::String(detail.clone()));
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Error placing order",
                    "error": error,
                }))
            }
            AppError::Verification(detail) => {
                log::error!("Error verifying payment: {}", detail);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Error verifying payment",
                }))
            }
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Internal server error",
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("order has no items".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payment_init_returns_500() {
        let err = AppError::PaymentInit {
            detail: "{\"status\":false}".to_string(),
        };
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn verification_returns_500() {
        let err = AppError::Verification("timeout".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn user_not_found_maps_to_not_found_with_message() {
        let err: AppError = DomainError::UserNotFound.into();
        match err {
            AppError::NotFound(message) => assert_eq!(message, "User not found"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn order_not_found_maps_to_not_found_with_message() {
        let err: AppError = DomainError::OrderNotFound.into();
        match err {
            AppError::NotFound(message) => assert_eq!(message, "Order not found"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn payment_init_detail_is_preserved() {
        let err: AppError = DomainError::PaymentInit("gateway said no".to_string()).into();
        match err {
            AppError::PaymentInit { detail } => assert_eq!(detail, "gateway said no"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
