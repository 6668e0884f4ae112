use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Caller input lacked a required field.
    #[error("Missing input: {0}")]
    MissingInput(#[from] MissingInputError),

    /// Catalog or library failed to load.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Database failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Langbase call failed.
    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// A required identifier was absent from the caller's input.
#[derive(Debug, Error)]
pub enum MissingInputError {
    /// A named record lacks a field.
    #[error("{record} is missing required field '{field}'")]
    Field { record: String, field: String },
}

impl MissingInputError {
    /// Shorthand for a missing field on a named record.
    pub fn field(record: impl Into<String>, field: impl Into<String>) -> Self {
        MissingInputError::Field {
            record: record.into(),
            field: field.into(),
        }
    }
}

/// Product catalog and static library errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No proof points configured.
    #[error("Proof-point catalog is empty")]
    Empty,

    /// Key not in the catalog.
    #[error("Unknown proof point: {key}")]
    UnknownKey { key: String },

    /// Entry failed validation.
    #[error("Invalid catalog entry {key}: {message}")]
    InvalidEntry { key: String, message: String },

    /// File was not valid JSON for its schema.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// File could not be read.
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not open the database.
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    /// A statement failed.
    #[error("Query failed: {message}")]
    Query { message: String },

    /// Schema migration failed.
    #[error("Migration failed: {message}")]
    Migration { message: String },

    /// Error surfaced by sqlx.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    /// Retries exhausted.
    #[error("Langbase unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    /// Non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Body did not parse.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Request exceeded the timeout.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for catalog loading
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;
