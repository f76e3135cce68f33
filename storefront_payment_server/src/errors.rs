use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use serde_json::json;
use storefront_payment_engine::{gateway::GatewayError, traits::CheckoutError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The stable, machine-checkable error kind carried in every error response body. Clients branch on this, so
    /// these strings are part of the API.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitializeError(_) => "initialize_error",
            Self::BackendError(_) => "backend_error",
            Self::InvalidRequestBody(_) => "invalid_request_body",
            Self::IOError(_) => "io_error",
            Self::Unspecified(_) => "unspecified",
            Self::Checkout(e) => match e {
                CheckoutError::DatabaseError(_) => "database_error",
                CheckoutError::ProductNotFound(_) => "product_not_found",
                CheckoutError::OrderNotFound(_) => "order_not_found",
                CheckoutError::TransactionNotFound(_) => "transaction_not_found",
                CheckoutError::EmptyCart(_) => "empty_cart",
                CheckoutError::InsufficientStock { .. } => "insufficient_stock",
                CheckoutError::InvalidStatusTransition { .. } => "invalid_status_transition",
                CheckoutError::InvalidSignature => "invalid_signature",
                CheckoutError::Validation(_) => "validation_error",
                CheckoutError::Conflict(_) => "conflict",
                CheckoutError::Gateway(GatewayError::Decode(_)) => "malformed_payload",
                CheckoutError::Gateway(GatewayError::Unreachable(_)) => "gateway_unreachable",
                CheckoutError::Gateway(_) => "gateway_error",
            },
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(e) => match e {
                CheckoutError::Validation(_)
                | CheckoutError::EmptyCart(_)
                | CheckoutError::InsufficientStock { .. }
                | CheckoutError::InvalidStatusTransition { .. }
                | CheckoutError::InvalidSignature
                | CheckoutError::Gateway(GatewayError::Decode(_)) => StatusCode::BAD_REQUEST,
                CheckoutError::ProductNotFound(_)
                | CheckoutError::OrderNotFound(_)
                | CheckoutError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::Conflict(_) => StatusCode::CONFLICT,
                CheckoutError::DatabaseError(_) | CheckoutError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "error": self.kind(), "message": self.to_string() });
        // Stock-insufficiency responses carry the counts so the client can adjust the basket.
        if let Self::Checkout(CheckoutError::InsufficientStock { product_id, requested, available }) = self {
            body["product_id"] = json!(product_id);
            body["requested"] = json!(requested);
            body["available"] = json!(available);
        }
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
