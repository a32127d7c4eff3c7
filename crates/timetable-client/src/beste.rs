use std::time::Duration;

use async_trait::async_trait;
use timetable_core::config::{ApiConfig, DEFAULT_API_BASE_URL};
use timetable_core::dates::IsoWeekKey;
use timetable_core::types::WeekJournal;
use tracing::{debug, warn};

use crate::source::{JournalSource, SourceError};

/// Characters of the response body quoted in parse errors.
const BODY_PREVIEW_CHARS: usize = 200;

/// Journal client for the "Beste Schule" school information API.
pub struct BesteSchuleClient {
    client: reqwest::Client,
    base_url: String,
}

impl BesteSchuleClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, SourceError> {
        Self::new(
            Some(api.base_url.clone()),
            Duration::from_secs(api.timeout_secs),
        )
    }

    /// Full URL of a week journal including lessons of every day.
    pub fn week_url(&self, week: IsoWeekKey) -> String {
        format!(
            "{}/journal/weeks/{}?include=days.lessons&interpolate=true",
            self.base_url, week
        )
    }
}

#[async_trait]
impl JournalSource for BesteSchuleClient {
    fn name(&self) -> &str {
        "beste.schule"
    }

    async fn fetch_week(&self, token: &str, week: IsoWeekKey) -> Result<WeekJournal, SourceError> {
        let url = self.week_url(week);

        debug!(%week, "requesting week journal");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    SourceError::Unavailable(e.to_string())
                } else {
                    SourceError::Http(e)
                }
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, %week, body = %text, "journal API error");
            return Err(SourceError::Api {
                status,
                message: text,
            });
        }

        let text = resp.text().await?;
        debug!(status, %week, len = text.len(), "week journal received");

        parse_week(&text)
    }
}

/// Decode a week journal body, quoting the start of the body on failure.
pub fn parse_week(body: &str) -> Result<WeekJournal, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        SourceError::Parse(format!("{e} - body preview: {preview}"))
    })
}
