//! services/api/src/adapters/calapi.rs
//!
//! This module contains the adapter for the public liturgical calendar API.
//! It implements the `LiturgicalDayLookup` port from the `core` crate.

use super::retry::RetryPolicy;
use async_trait::async_trait;
use liturgy_core::{
    domain::{CalendarDate, RawLiturgicalDay},
    ports::{LiturgicalDayLookup, PortError, PortResult},
};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "liturgy-proxy/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LiturgicalDayLookup` against a calapi-style endpoint
/// (`{base}/{YYYY}/{MM}/{DD}`).
#[derive(Clone)]
pub struct CalapiAdapter {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CalapiAdapter {
    /// Creates a new `CalapiAdapter` with its own HTTP client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
        })
    }

    fn day_url(&self, date: CalendarDate) -> String {
        format!(
            "{}/{:04}/{:02}/{:02}",
            self.base_url.trim_end_matches('/'),
            date.year(),
            date.month(),
            date.day()
        )
    }
}

//=========================================================================================
// `LiturgicalDayLookup` Trait Implementation
//=========================================================================================

#[async_trait]
impl LiturgicalDayLookup for CalapiAdapter {
    async fn lookup_day(&self, date: CalendarDate) -> PortResult<RawLiturgicalDay> {
        let url = self.day_url(date);
        debug!(%url, "Fetching liturgical day");

        let response = self
            .retry
            .send(|| self.client.get(&url))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortError::UpstreamLookupFailure(format!("{date}: {e}")))?;

        response.json::<RawLiturgicalDay>().await.map_err(|e| {
            PortError::UpstreamLookupFailure(format!("{date}: invalid calendar payload: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_url_is_zero_padded() {
        let adapter = CalapiAdapter::new("http://calendar.test/api/").unwrap();
        let date = CalendarDate::from_ymd(2024, 3, 5).unwrap();
        assert_eq!(adapter.day_url(date), "http://calendar.test/api/2024/03/05");
    }

    #[test]
    fn test_raw_day_payload_decodes_with_defaults() {
        let payload = r#"{
            "season": "Lent",
            "season_week": 3,
            "celebrations": [{"title": "Tuesday, 3rd week of Lent", "rank_num": 2.9}]
        }"#;
        let raw: RawLiturgicalDay = serde_json::from_str(payload).unwrap();
        assert_eq!(raw.season.as_deref(), Some("Lent"));
        assert_eq!(raw.celebrations[0].colour, "unknown");
        assert_eq!(raw.celebrations[0].rank, "unknown");
        assert!(raw.weekday.is_none());
    }
}
