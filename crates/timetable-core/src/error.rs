use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No API token configured")]
    MissingToken,

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TimetableError {
    /// Short, stable error code used in log lines and the status footer.
    pub fn code(&self) -> &'static str {
        match self {
            TimetableError::Config(_) => "CONFIG_ERROR",
            TimetableError::MissingToken => "MISSING_TOKEN",
            TimetableError::Credential(_) => "CREDENTIAL_ERROR",
            TimetableError::InvalidDate(_) => "INVALID_DATE",
            TimetableError::Serialization(_) => "SERIALIZATION_ERROR",
            TimetableError::Io(_) => "IO_ERROR",
            TimetableError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, TimetableError>;
