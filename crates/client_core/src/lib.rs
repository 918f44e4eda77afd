use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{stream::FuturesUnordered, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{LocationRecord, ResidentRecord},
    error::ApiErrorBody,
    protocol::{CharacterResponse, LocationResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod error;
pub mod session;

pub use error::FetchError;
pub use session::{LoadState, QueryController, QueryOutcome, QuerySession, SessionEvent};

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!("location-explorer/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait LocationFetcher: Send + Sync {
    async fn fetch_location(&self, identifier: &str) -> Result<LocationRecord, FetchError>;
}

#[async_trait]
pub trait ResidentCollector: Send + Sync {
    /// Fetches every resident concurrently. Results keep the order of `urls`;
    /// any single failure fails the whole batch.
    async fn fetch_residents(&self, urls: &[String]) -> Result<Vec<ResidentRecord>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url> {
    let base_url =
        Url::parse(raw.trim()).with_context(|| format!("invalid API base url '{raw}'"))?;
    if base_url.cannot_be_a_base() {
        anyhow::bail!("API base url '{raw}' cannot be used as a base");
    }
    Ok(base_url)
}

/// HTTP client for the character-universe API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let base_url = parse_base_url(&options.base_url)?;
        let mut builder = Client::builder().user_agent(options.user_agent);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn location_url(&self, identifier: &str) -> Result<Url, FetchError> {
        // URL paths normalise dot segments away, even percent-encoded ones.
        if matches!(identifier, "." | "..") {
            return Err(FetchError::InvalidIdentifier);
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base url cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .push("location")
            .push(identifier);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::from_transport(url.as_str(), err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::from_transport(url.as_str(), err))?;

        if !status.is_success() {
            let message = ApiErrorBody::parse(&body)
                .map(|body| body.error)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            warn!(%url, status = status.as_u16(), %message, "API returned non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_resident(
        &self,
        index: usize,
        raw_url: &str,
    ) -> Result<(usize, ResidentRecord), FetchError> {
        let url = Url::parse(raw_url).map_err(|err| FetchError::InvalidUrl {
            url: raw_url.to_string(),
            reason: err.to_string(),
        })?;
        let body: CharacterResponse = self.get_json(url).await?;
        Ok((index, body.into()))
    }
}

#[async_trait]
impl LocationFetcher for ApiClient {
    async fn fetch_location(&self, identifier: &str) -> Result<LocationRecord, FetchError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(FetchError::InvalidIdentifier);
        }
        let url = self.location_url(identifier)?;
        let body: LocationResponse = self.get_json(url).await?;
        let location = LocationRecord::from(body);
        debug!(
            location_id = %location.location_id,
            residents = location.resident_count(),
            "location fetched"
        );
        Ok(location)
    }
}

#[async_trait]
impl ResidentCollector for ApiClient {
    async fn fetch_residents(&self, urls: &[String]) -> Result<Vec<ResidentRecord>, FetchError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let mut pending: FuturesUnordered<_> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| self.fetch_resident(index, url))
            .collect();

        let mut slots: Vec<Option<ResidentRecord>> = (0..urls.len()).map(|_| None).collect();
        while let Some(result) = pending.next().await {
            // Returning early drops the remaining requests.
            let (index, resident) = result?;
            slots[index] = Some(resident);
        }

        debug!(residents = slots.len(), "resident batch fetched");
        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
