use std::time::Duration;

use reqwest::redirect;

use crate::config::Config;

/// Timeouts for requests to oEmbed providers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FetchTimeouts {
    /// The timeout for establishing a connection.
    pub connect: Duration,
    /// Global timeout for one request, including the response body.
    pub max_fetch: Duration,
}

impl FetchTimeouts {
    pub fn from_config(config: &Config) -> Self {
        Self {
            connect: config.connect_timeout,
            max_fetch: config.timeout,
        }
    }
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(1),
            max_fetch: Duration::from_secs(10),
        }
    }
}

/// Creates a [`reqwest::Client`] with the provided timeouts and `User-Agent`.
///
/// Redirects are followed up to a limit of 5, as some providers move their endpoints around.
pub fn create_client(
    timeouts: &FetchTimeouts,
    user_agent: &str,
) -> reqwest::Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .gzip(true)
        .user_agent(user_agent)
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.max_fetch)
        .pool_idle_timeout(Duration::from_secs(30))
        .redirect(redirect::Policy::limited(5))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_from_config() {
        let config = Config {
            connect_timeout: Duration::from_millis(250),
            timeout: Duration::from_secs(3),
            ..Config::default()
        };
        let timeouts = FetchTimeouts::from_config(&config);
        assert_eq!(timeouts.connect, Duration::from_millis(250));
        assert_eq!(timeouts.max_fetch, Duration::from_secs(3));

        assert_eq!(
            FetchTimeouts::from_config(&Config::default()),
            FetchTimeouts::default()
        );
    }
}
