use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Gateway credentials are not configured")]
    MissingCredentials,
    #[error("Could not reach the payment gateway: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
