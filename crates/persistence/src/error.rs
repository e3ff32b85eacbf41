use common::AggregateId;
use thiserror::Error;

/// Errors raised by a store driver or transaction handle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transaction was already committed or rolled back.
    #[error("Transaction already finished")]
    TransactionFinished,

    /// A query returned a column the driver cannot decode.
    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedColumnType { column: String, type_name: String },

    /// A driver reported a failure that is not a sqlx error.
    #[error("Driver error: {0}")]
    Driver(String),
}

/// Errors raised by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the requested id.
    #[error("Order not found: {0}")]
    NotFound(AggregateId),

    /// A stored row failed decoding or domain validation.
    #[error("Corrupt data for order {id}: {reason}")]
    CorruptData { id: AggregateId, reason: String },

    /// The driver failed while reading or writing.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, StoreError>;
