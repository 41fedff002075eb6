use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

use super::{Fetch, FetchOutcome};

/// [`Fetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client; no timeout is applied unless one is given.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend or client cannot be initialized.
    pub fn build(request_timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| AppError::http(HttpError::BuildClient { source }))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("GET {} failed: {}", url, err);
                return FetchOutcome::TransportError {
                    message: err.to_string(),
                };
            }
        };
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => FetchOutcome::Response {
                status,
                bytes: i64::try_from(body.len()).unwrap_or(i64::MAX),
            },
            Err(err) => {
                debug!("Reading body of {} failed: {}", url, err);
                FetchOutcome::TransportError {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Parses and checks the load target.
///
/// # Errors
///
/// Returns an error when the URL does not parse or is not http(s).
pub fn parse_target_url(value: &str) -> AppResult<Url> {
    let url = Url::parse(value).map_err(|source| {
        AppError::http(HttpError::InvalidUrl {
            url: value.to_owned(),
            source,
        })
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::http(HttpError::UnsupportedScheme {
            url: value.to_owned(),
        })),
    }
}
