//! Fetching of oEmbed responses from providers.

use std::time::Instant;

use reqwest::{Client, StatusCode, header};

use crate::config::Config;
use crate::error::OembedError;
use crate::providers::{Provider, RequestOptions};
use crate::types::OembedResponse;
use crate::utils::http::{FetchTimeouts, create_client};

/// Requests oEmbed responses from providers over HTTP.
///
/// Cloning is cheap, all clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct OembedClient {
    client: Client,
    timeouts: FetchTimeouts,
}

impl OembedClient {
    pub fn new(client: Client, timeouts: FetchTimeouts) -> Self {
        Self { client, timeouts }
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let timeouts = FetchTimeouts::from_config(config);
        let client = create_client(&timeouts, &config.user_agent)?;
        Ok(Self::new(client, timeouts))
    }

    /// Fetches the oEmbed response for the resource at `url` from `provider`.
    ///
    /// Returns `Ok(None)` if the provider does not know the resource, or does not allow it to be
    /// embedded.
    pub async fn fetch(
        &self,
        provider: &Provider,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Option<OembedResponse>, OembedError> {
        // The request url carries the provider params, which may hold access tokens.
        tracing::debug!(
            provider = provider.name(),
            endpoint = %provider.endpoint(),
            "Fetching oEmbed response for `{}`",
            url
        );
        let request_url = provider.request_url(url, options);

        let start = Instant::now();
        let timeout = self.timeouts.max_fetch;
        let job = self.fetch_inner(provider, request_url);
        let result = match tokio::time::timeout(timeout, job).await {
            Ok(result) => result,
            Err(_) => Err(OembedError::Timeout(timeout)),
        };

        let status = match &result {
            Ok(Some(_)) => "success",
            Ok(None) => "notfound",
            Err(error) => error.metrics_tag(),
        };
        metric!(timer("oembed.fetch.duration") = start.elapsed(), "provider" => provider.name());
        metric!(counter("oembed.fetch") += 1, "provider" => provider.name(), "status" => status);

        result
    }

    async fn fetch_inner(
        &self,
        provider: &Provider,
        request_url: url::Url,
    ) -> Result<Option<OembedResponse>, OembedError> {
        let response = self
            .client
            .get(request_url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| self.map_reqwest_error(error))?;

        let status = response.status();
        if status.is_success() {
            tracing::trace!(provider = provider.name(), "Success fetching oEmbed response");
            let body = response
                .bytes()
                .await
                .map_err(|error| self.map_reqwest_error(error))?;
            let parsed = serde_json::from_slice::<OembedResponse>(&body)?;
            return Ok(Some(parsed));
        }

        match status {
            // 401 means the resource is private, 501 that it cannot be embedded.
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::NOT_IMPLEMENTED => {
                tracing::debug!(provider = provider.name(), "Resource not available: {status}");
                Ok(None)
            }
            StatusCode::FORBIDDEN => {
                tracing::debug!(provider = provider.name(), "Insufficient permissions: {status}");
                Err(OembedError::PermissionDenied(status.to_string()))
            }
            _ => {
                tracing::debug!(provider = provider.name(), "Unexpected status code: {status}");
                Err(OembedError::DownloadError(status.to_string()))
            }
        }
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> OembedError {
        if error.is_timeout() {
            OembedError::Timeout(self.timeouts.max_fetch)
        } else {
            error.into()
        }
    }
}
