//! oEmbed providers and the registry used to find the provider for a URL.
//!
//! A provider is described by its oEmbed endpoint and a list of URL schemes, as published on
//! <https://oembed.com/providers.json>. A scheme is a URL with `*` wildcards, like
//! `https://*.youtube.com/watch*`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;

mod builtin;

/// An error in the definition of a [`Provider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid url scheme `{scheme}`")]
    InvalidScheme {
        scheme: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid endpoint `{endpoint}`")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("provider `{0}` has no url schemes")]
    NoSchemes(String),
}

/// A URL pattern with `*` wildcards.
///
/// Matching is case-insensitive and ignores whether the URL uses `http` or `https`. A wildcard in
/// the host only matches within the host, while a wildcard in the path matches anything.
#[derive(Clone)]
pub struct UrlScheme {
    scheme: String,
    regex: Regex,
}

impl fmt::Debug for UrlScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlScheme").field(&self.scheme).finish()
    }
}

impl UrlScheme {
    pub fn new(scheme: &str) -> Result<Self, ProviderError> {
        let mut pattern = String::from("(?i)^");

        let (host, path) = match scheme
            .strip_prefix("https://")
            .or_else(|| scheme.strip_prefix("http://"))
        {
            Some(rest) => {
                pattern.push_str("https?://");
                rest.split_at(rest.find('/').unwrap_or(rest.len()))
            }
            None => ("", scheme),
        };
        pattern.push_str(&wildcards_to_regex(host, "[^/?#]*"));
        pattern.push_str(&wildcards_to_regex(path, ".*"));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| ProviderError::InvalidScheme {
            scheme: scheme.to_owned(),
            source,
        })?;

        Ok(Self {
            scheme: scheme.to_owned(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.scheme
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url.trim())
    }
}

fn wildcards_to_regex(s: &str, wildcard: &str) -> String {
    s.split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(wildcard)
}

/// The definition of a provider in the configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// The human readable name of the provider.
    pub name: String,
    /// The oEmbed endpoint. A `{format}` placeholder is replaced with `json`.
    pub endpoint: String,
    /// The URL schemes this provider handles.
    pub schemes: Vec<String>,
    /// Additional query parameters sent with every request, like an access token.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Options for an oEmbed request that are not specific to one resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// The maximum width of the embedded resource.
    pub max_width: Option<u32>,
    /// The maximum height of the embedded resource.
    pub max_height: Option<u32>,
}

impl RequestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
        }
    }
}

/// An oEmbed provider.
#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    endpoint: Url,
    schemes: Vec<UrlScheme>,
    params: BTreeMap<String, String>,
}

impl Provider {
    pub fn new<S: AsRef<str>>(
        name: &str,
        endpoint: &str,
        schemes: &[S],
    ) -> Result<Self, ProviderError> {
        let endpoint_url = endpoint.replace("{format}", "json");
        let endpoint_url =
            Url::parse(&endpoint_url).map_err(|source| ProviderError::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        if schemes.is_empty() {
            return Err(ProviderError::NoSchemes(name.to_owned()));
        }
        let schemes = schemes
            .iter()
            .map(|scheme| UrlScheme::new(scheme.as_ref()))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name: name.to_owned(),
            endpoint: endpoint_url,
            schemes,
            params: BTreeMap::new(),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut provider = Self::new(&config.name, &config.endpoint, &config.schemes)?;
        provider.params = config.params.clone();
        Ok(provider)
    }

    /// Adds query parameters that are sent with every request to this provider.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn schemes(&self) -> &[UrlScheme] {
        &self.schemes
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Whether any of this provider's URL schemes matches `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.schemes.iter().any(|scheme| scheme.matches(url))
    }

    /// Builds the URL of the oEmbed request for the resource at `url`.
    pub fn request_url(&self, url: &str, options: &RequestOptions) -> Url {
        let mut request_url = self.endpoint.clone();
        {
            let mut query = request_url.query_pairs_mut();
            query.append_pair("url", url);
            query.append_pair("format", "json");
            if let Some(max_width) = options.max_width {
                query.append_pair("maxwidth", &max_width.to_string());
            }
            if let Some(max_height) = options.max_height {
                query.append_pair("maxheight", &max_height.to_string());
            }
            for (key, value) in &self.params {
                query.append_pair(key, value);
            }
        }
        request_url
    }
}

/// The list of known providers.
///
/// Providers are tried in registration order, the first one with a matching URL scheme wins.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<Provider>>,
}

impl ProviderRegistry {
    pub fn new(providers: impl IntoIterator<Item = Provider>) -> Self {
        Self {
            providers: providers.into_iter().map(Arc::new).collect(),
        }
    }

    /// A registry of all the built-in providers.
    pub fn builtin() -> Self {
        Self::new(builtin::providers())
    }

    /// Creates the registry described by the configuration.
    ///
    /// Custom providers take precedence over the built-in ones. Configured `provider_params` are
    /// attached to the provider of the same name, ignoring case.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let mut providers = config
            .providers
            .iter()
            .map(Provider::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        if config.builtin_providers {
            providers.extend(builtin::providers());
        }

        for (name, params) in &config.provider_params {
            let mut found = false;
            for provider in providers
                .iter_mut()
                .filter(|p| p.name.eq_ignore_ascii_case(name))
            {
                provider.params.extend(params.clone());
                found = true;
            }
            if !found {
                tracing::warn!(provider = %name, "Parameters configured for unknown provider");
            }
        }

        Ok(Self::new(providers))
    }

    /// Finds the provider responsible for `url`.
    pub fn find(&self, url: &str) -> Option<&Arc<Provider>> {
        self.providers.iter().find(|provider| provider.matches(url))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
