//! Helpers for testing the oEmbed service against a local provider.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output
//!    is captured by the test runner.
//!
//!  - When using [`ProviderServer`], make sure that the server is held until all requests to
//!    the server have been made. If the server is dropped, the port is closed and all requests
//!    to it fail. To avoid this, assign it to a variable: `let server = ProviderServer::new();`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use reqwest::{StatusCode, Url};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::fmt;

/// Setup the test environment.
///
///  - Initializes logs: The logger only captures logs from the `oembed_service` crate and mutes
///    all other logs (such as hyper or reqwest).
pub fn setup() {
    fmt()
        .with_env_filter(EnvFilter::new("oembed_service=trace"))
        .with_target(false)
        .pretty()
        .with_test_writer()
        .try_init()
        .ok();
}

/// A test server that binds to a random port and serves a web app.
///
/// This server requires a `tokio` runtime and is supposed to be run in a `tokio::test`. It
/// automatically stops serving when dropped.
#[derive(Debug)]
pub struct Server {
    pub handle: tokio::task::JoinHandle<()>,
    pub socket: SocketAddr,
}

impl Server {
    pub fn with_router(router: Router) -> Self {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));

        let listener = std::net::TcpListener::bind(addr).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();
        let listener = tokio::net::TcpListener::from_std(listener).unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { handle, socket }
    }

    /// Returns the socket address that this server listens on.
    pub fn addr(&self) -> SocketAddr {
        self.socket
    }

    /// Returns the port that this server listens on.
    pub fn port(&self) -> u16 {
        self.addr().port()
    }

    /// Returns a full URL pointing to the given path.
    ///
    /// This URL uses `localhost` as hostname.
    pub fn url(&self, path: &str) -> Url {
        let path = path.trim_start_matches('/');
        format!("http://localhost:{}/{}", self.port(), path)
            .parse()
            .unwrap()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    responses: BTreeMap<String, (StatusCode, String)>,
    hits: BTreeMap<String, usize>,
    last_query: Option<BTreeMap<String, String>>,
    delay: Duration,
}

type SharedState = Arc<Mutex<ProviderState>>;

/// A fake oEmbed provider.
///
/// Serves the oEmbed endpoint at `/oembed`, see [`ProviderServer::endpoint`]. Responses are
/// registered per resource URL, which is read from the `url` query parameter. Resources without
/// a registered response get a `404 Not Found`.
///
/// Every request is counted, so tests can assert how often the provider was asked for a resource.
pub struct ProviderServer {
    server: Server,
    state: SharedState,
}

impl ProviderServer {
    pub fn new() -> Self {
        let state = SharedState::default();

        let router = Router::new()
            .route("/oembed", get(handle_oembed))
            .with_state(state.clone());

        let server = Server::with_router(router);

        Self { server, state }
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap()
    }

    /// Returns the URL of the oEmbed endpoint.
    pub fn endpoint(&self) -> Url {
        self.server.url("/oembed")
    }

    /// Responds to requests for `url` with the given status and raw body.
    pub fn respond(&self, url: &str, status: StatusCode, body: impl Into<String>) {
        self.state()
            .responses
            .insert(url.to_owned(), (status, body.into()));
    }

    /// Responds to requests for `url` with `200 OK` and the given JSON.
    pub fn respond_json(&self, url: &str, json: serde_json::Value) {
        self.respond(url, StatusCode::OK, json.to_string());
    }

    /// Delays all responses by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = delay;
    }

    /// Returns how often the provider was asked for `url`.
    pub fn hits(&self, url: &str) -> usize {
        self.state().hits.get(url).copied().unwrap_or_default()
    }

    /// Returns the number of requests the provider received.
    pub fn total_hits(&self) -> usize {
        self.state().hits.values().sum()
    }

    /// Returns the query parameters of the last request.
    pub fn last_query(&self) -> Option<BTreeMap<String, String>> {
        self.state().last_query.clone()
    }
}

impl Default for ProviderServer {
    fn default() -> Self {
        Self::new()
    }
}

async fn handle_oembed(
    State(state): State<SharedState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let url = query.get("url").cloned().unwrap_or_default();

    let (delay, response) = {
        let mut state = state.lock().unwrap();
        *state.hits.entry(url.clone()).or_default() += 1;
        state.last_query = Some(query);
        (state.delay, state.responses.get(&url).cloned())
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = response.unwrap_or((StatusCode::NOT_FOUND, String::new()));
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
