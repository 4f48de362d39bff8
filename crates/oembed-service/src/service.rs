//! The oEmbed consumer, combining the provider registry, the HTTP client and the cache.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::caching::{Cacher, PopulateError};
use crate::config::Config;
use crate::download::OembedClient;
use crate::error::OembedError;
use crate::providers::{ProviderRegistry, RequestOptions};
use crate::types::OembedResponse;

/// Resolves URLs to their oEmbed representation.
///
/// Lookups of the same resource are coalesced: while a request to the provider is in flight,
/// further lookups wait for it instead of sending their own. Results are cached for the lifetime
/// of the service, including resources the provider does not know. Failed requests are not cached.
#[derive(Clone, Debug)]
pub struct OembedService {
    registry: Arc<ProviderRegistry>,
    client: OembedClient,
    options: RequestOptions,
    cache: Cacher<OembedResponse>,
}

impl OembedService {
    pub fn new(config: &Config) -> Result<Self> {
        let registry =
            ProviderRegistry::from_config(config).context("failed to load oEmbed providers")?;
        let client = OembedClient::from_config(config).context("failed to create HTTP client")?;
        let options = RequestOptions::from_config(config);

        tracing::debug!(providers = registry.len(), "Created oEmbed service");
        Ok(Self::with_parts(registry, client, options))
    }

    pub fn with_parts(
        registry: ProviderRegistry,
        client: OembedClient,
        options: RequestOptions,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
            options,
            cache: Cacher::new("oembed"),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Returns the oEmbed response for the resource at `url`.
    ///
    /// Returns `Ok(None)` if no provider handles `url`, or if the provider does not know the
    /// resource. URLs without a provider never reach the cache.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, url: &str) -> Result<Option<OembedResponse>, OembedError> {
        let Some(provider) = self.registry.find(url) else {
            tracing::debug!("No oEmbed provider for url");
            metric!(counter("oembed.no_provider") += 1);
            return Ok(None);
        };

        let provider = Arc::clone(provider);
        let client = self.client.clone();
        let options = self.options.clone();
        let producer = move |url: String| async move {
            client.fetch(&provider, &url, &options).await
        };

        match self.cache.get_or_populate(url, producer).await {
            Ok(response) => Ok(response),
            Err(PopulateError::Producer(error)) => Err(error),
            Err(PopulateError::Interrupted) => Err(OembedError::InternalError),
        }
    }

    /// Forgets the cached result for `url`, so the next lookup asks the provider again.
    pub fn invalidate(&self, url: &str) {
        self.cache.remove(url);
    }

    /// Forgets all cached results.
    pub fn clear(&self) {
        self.cache.clear();
    }
}
