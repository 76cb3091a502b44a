use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no database is open")]
    NoDatabase,

    #[error("failed to open database: {path}: {source}")]
    DbOpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Catalog introspection failed (not a database, corrupted, locked).
    #[error("failed to read database structure: {0}")]
    SchemaRead(String),

    /// A built SELECT/COUNT failed to prepare or run.
    #[error("query failed: {0}")]
    QueryExecution(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

// Plain `?` on engine calls lands here; catalog code maps explicitly via `AppError::schema`.
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::QueryExecution(e.to_string())
    }
}

impl AppError {
    pub fn schema(e: rusqlite::Error) -> Self {
        AppError::SchemaRead(e.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::NoDatabase => "NO_DATABASE",
            AppError::DbOpenFailed { .. } => "DB_OPEN_FAILED",
            AppError::SchemaRead(_) => "SCHEMA_READ_ERROR",
            AppError::QueryExecution(_) => "QUERY_EXECUTION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
