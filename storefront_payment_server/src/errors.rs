use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use serde_json::json;
use storefront_payment_engine::helpers::ValidationIssue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Validation failed")]
    ValidationFailed(Vec<ValidationIssue>),
    #[error("{0}")]
    OrderStoreError(String),
    #[error("The payment gateway is not configured")]
    GatewayNotConfigured,
    #[error("The payment gateway could not process the request")]
    GatewayError,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::OrderStoreError(_) => StatusCode::BAD_REQUEST,
            Self::GatewayNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::ValidationFailed(details) => json!({ "error": "Validation failed", "details": details }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
