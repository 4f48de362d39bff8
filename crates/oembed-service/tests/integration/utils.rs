use std::time::Duration;

use oembed_service::download::OembedClient;
use oembed_service::providers::{Provider, ProviderRegistry, RequestOptions};
use oembed_service::service::OembedService;
use oembed_service::utils::http::{FetchTimeouts, create_client};
use oembed_test::ProviderServer;

/// The URL scheme served by the test provider.
pub const SCHEME: &str = "https://media.example.com/*";

pub fn media_url(path: &str) -> String {
    format!("https://media.example.com/{}", path.trim_start_matches('/'))
}

/// Creates a service which knows a single provider, backed by `server`.
///
/// `configure` can adjust the timeouts and request options before the service is created.
pub fn setup_service<F>(server: &ProviderServer, configure: F) -> OembedService
where
    F: FnOnce(&mut FetchTimeouts, &mut RequestOptions),
{
    oembed_test::setup();

    let mut timeouts = FetchTimeouts {
        connect: Duration::from_secs(1),
        max_fetch: Duration::from_secs(2),
    };
    let mut options = RequestOptions::default();
    configure(&mut timeouts, &mut options);

    let provider = Provider::new("Test Media", server.endpoint().as_str(), &[SCHEME])
        .unwrap()
        .with_params([("key", "secret")]);
    let registry = ProviderRegistry::new([provider]);

    let client = create_client(&timeouts, "oembed-tests").unwrap();
    let client = OembedClient::new(client, timeouts);

    OembedService::with_parts(registry, client, options)
}
