use async_trait::async_trait;
use timetable_core::dates::IsoWeekKey;
use timetable_core::types::WeekJournal;

/// Anything that can deliver the journal of one ISO week.
#[async_trait]
pub trait JournalSource: Send + Sync {
    /// Source name for logging and error messages.
    fn name(&self) -> &str;

    /// Fetch all days of `week`, authenticated with the bearer `token`.
    async fn fetch_week(&self, token: &str, week: IsoWeekKey) -> Result<WeekJournal, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// True when the API rejected the token; the caller should ask for a new one.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SourceError::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_only_for_auth_statuses() {
        let denied = SourceError::Api {
            status: 401,
            message: "Unauthenticated.".to_string(),
        };
        assert!(denied.is_unauthorized());

        let forbidden = SourceError::Api {
            status: 403,
            message: String::new(),
        };
        assert!(forbidden.is_unauthorized());

        let server = SourceError::Api {
            status: 500,
            message: "oops".to_string(),
        };
        assert!(!server.is_unauthorized());
        assert!(!SourceError::Parse("bad json".to_string()).is_unauthorized());
    }
}
