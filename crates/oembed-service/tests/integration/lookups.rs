use std::time::Duration;

use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::json;

use oembed_service::error::OembedError;
use oembed_test::ProviderServer;

use crate::utils::{media_url, setup_service};

fn video_json() -> serde_json::Value {
    json!({
        "type": "video",
        "version": "1.0",
        "title": "Big Buck Bunny",
        "provider_name": "Test Media",
        "html": "<iframe src=\"https://media.example.com/embed/1\"></iframe>",
        "width": 640,
        "height": 360
    })
}

#[tokio::test]
async fn test_lookup_caches_response() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let url = media_url("videos/1");
    server.respond_json(&url, video_json());

    let response = service.lookup(&url).await.unwrap().unwrap();
    insta::assert_json_snapshot!(response, @r###"
    {
      "type": "video",
      "html": "<iframe src=\"https://media.example.com/embed/1\"></iframe>",
      "width": 640,
      "height": 360,
      "version": "1.0",
      "title": "Big Buck Bunny",
      "provider_name": "Test Media"
    }
    "###);

    let again = service.lookup(&url).await.unwrap();
    assert_eq!(again, Some(response));
    assert_eq!(server.hits(&url), 1);
}

#[tokio::test]
async fn test_request_parameters() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, options| {
        options.max_width = Some(480);
    });

    let url = media_url("videos/1?t=42");
    server.respond_json(&url, video_json());
    service.lookup(&url).await.unwrap();

    let query = server.last_query().unwrap();
    assert_eq!(query["url"], url);
    assert_eq!(query["format"], "json");
    assert_eq!(query["maxwidth"], "480");
    assert_eq!(query["key"], "secret");
    assert!(!query.contains_key("maxheight"));
}

#[tokio::test]
async fn test_not_found_is_cached() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let url = media_url("videos/deleted");
    assert_eq!(service.lookup(&url).await.unwrap(), None);
    assert_eq!(service.lookup(&url).await.unwrap(), None);
    assert_eq!(server.hits(&url), 1);

    // the resource appears, but the negative result sticks until invalidated
    server.respond_json(&url, video_json());
    assert_eq!(service.lookup(&url).await.unwrap(), None);

    service.invalidate(&url);
    assert!(service.lookup(&url).await.unwrap().is_some());
    assert_eq!(server.hits(&url), 2);
}

#[tokio::test]
async fn test_private_and_unembeddable() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let private = media_url("videos/private");
    server.respond(&private, StatusCode::UNAUTHORIZED, "");
    let unembeddable = media_url("videos/unembeddable");
    server.respond(&unembeddable, StatusCode::NOT_IMPLEMENTED, "");

    assert_eq!(service.lookup(&private).await.unwrap(), None);
    assert_eq!(service.lookup(&unembeddable).await.unwrap(), None);
    assert_eq!(service.lookup(&private).await.unwrap(), None);
    assert_eq!(server.total_hits(), 2);
}

#[tokio::test]
async fn test_server_error_is_not_cached() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let url = media_url("videos/1");
    server.respond(&url, StatusCode::INTERNAL_SERVER_ERROR, "oops");

    let error = service.lookup(&url).await.unwrap_err();
    assert_eq!(
        error,
        OembedError::DownloadError("500 Internal Server Error".into())
    );

    server.respond_json(&url, video_json());
    assert!(service.lookup(&url).await.unwrap().is_some());
    assert_eq!(server.hits(&url), 2);
}

#[tokio::test]
async fn test_permission_denied() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let url = media_url("videos/1");
    server.respond(&url, StatusCode::FORBIDDEN, "");

    let error = service.lookup(&url).await.unwrap_err();
    assert!(matches!(error, OembedError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_malformed_response() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let url = media_url("videos/1");
    server.respond(&url, StatusCode::OK, "<html>not json</html>");

    let error = service.lookup(&url).await.unwrap_err();
    assert!(matches!(error, OembedError::Malformed(_)), "{error:?}");

    service.lookup(&url).await.unwrap_err();
    assert_eq!(server.hits(&url), 2);
}

#[tokio::test]
async fn test_timeout() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |timeouts, _| {
        timeouts.max_fetch = Duration::from_millis(100);
    });

    let url = media_url("videos/1");
    server.respond_json(&url, video_json());
    server.set_delay(Duration::from_millis(500));

    let error = service.lookup(&url).await.unwrap_err();
    assert_eq!(error, OembedError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_unknown_provider() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});

    let result = service.lookup("https://elsewhere.example.com/videos/1").await;
    assert_eq!(result.unwrap(), None);
    assert_eq!(server.total_hits(), 0);
}

#[tokio::test]
async fn test_concurrent_lookups_are_coalesced() {
    let server = ProviderServer::new();
    let service = setup_service(&server, |_, _| {});
    server.set_delay(Duration::from_millis(100));

    let missing = media_url("videos/missing");
    let with_slash = format!("{missing}/");
    let photo = media_url("photos/1");
    let video = media_url("videos/1");
    server.respond_json(
        &photo,
        json!({"type": "photo", "url": "https://media.example.com/1.jpg"}),
    );
    server.respond_json(&video, video_json());

    let mut urls = vec![missing.as_str(); 20];
    urls.extend([with_slash.as_str(), photo.as_str(), video.as_str()]);

    let results = join_all(urls.iter().map(|url| service.lookup(url))).await;

    for result in &results[..21] {
        assert_eq!(result, &Ok(None));
    }
    assert!(results[21].as_ref().unwrap().is_some());
    assert!(results[22].as_ref().unwrap().is_some());

    // the trailing slash variant shares the entry of the plain url
    assert_eq!(server.hits(&missing) + server.hits(&with_slash), 1);
    assert_eq!(server.total_hits(), 3);
}
