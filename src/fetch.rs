use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{FetchError, ParseError, Result};

static UPDATE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<updatetime><!\[CDATA\[(\d+)\]\]></updatetime>").unwrap());

/// One fetched copy of the feed: the raw payload and the Unix timestamp
/// (UTC seconds) embedded in its `<updatetime>` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub update_time: i64,
    pub body: String,
}

/// Pull the embedded update time out of a feed payload.
pub fn extract_update_time(body: &str) -> std::result::Result<i64, ParseError> {
    let captures = UPDATE_TIME_RE
        .captures(body)
        .ok_or(ParseError::MarkerMissing)?;
    let digits = &captures[1];
    digits
        .parse::<i64>()
        .map_err(|_| ParseError::BadTimestamp(digits.to_string()))
}

/// Something that can produce the feed's current snapshot. The production
/// implementation is [`Fetcher`]; tests substitute stubs.
pub trait SnapshotSource {
    async fn fetch(&self) -> Result<Snapshot>;
}

/// HTTP fetcher for the station feed. No retries here: the caller decides
/// whether to invoke the whole run again.
pub struct Fetcher {
    client: reqwest::Client,
    url: String,
}

impl Fetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> std::result::Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl SnapshotSource for Fetcher {
    async fn fetch(&self) -> Result<Snapshot> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(FetchError::Transport)?;
        let update_time = extract_update_time(&body)?;
        debug!(update_time, bytes = body.len(), "fetched feed snapshot");

        Ok(Snapshot { update_time, body })
    }
}
