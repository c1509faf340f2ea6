use thiserror::Error;

use crate::{db_types::OrderId, helpers::ValidationIssue};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("The order payload failed validation")]
    ValidationFailed(Vec<ValidationIssue>),
    #[error("The payment confirmation failed validation")]
    ConfirmationInvalid(Vec<ValidationIssue>),
    #[error("The payment signature did not verify")]
    SignatureInvalid,
    #[error("Order {0} was not found")]
    OrderNotFound(OrderId),
    #[error("No pending order matches this payment notification")]
    NoMatchingPendingOrder,
    #[error("The order status could not be updated")]
    UpdateFailed,
    #[error("Database error: {0}")]
    DatabaseError(String),
}
