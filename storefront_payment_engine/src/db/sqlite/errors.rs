use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not encode order items: {0}")]
    ItemEncodingError(String),
    #[error("Order was inserted but could not be read back: {0}")]
    InsertReadbackError(String),
}
