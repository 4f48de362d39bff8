use oembed_service::error::OembedError;
use oembed_service::types::{OembedResponse, ResponseKind};
use serde_json::json;

pub type LookupResult = Result<Option<OembedResponse>, OembedError>;

/// Prints one JSON object per lookup, with either a `response` or an `error`.
pub fn print_json(url: &str, result: &LookupResult) {
    let line = match result {
        Ok(response) => json!({ "url": url, "response": response }),
        Err(error) => json!({ "url": url, "error": error.to_string() }),
    };
    println!("{line}");
}

pub fn print_pretty(url: &str, result: &LookupResult) {
    println!("{url}");
    let response = match result {
        Ok(Some(response)) => response,
        Ok(None) => {
            println!("  not embeddable");
            return;
        }
        Err(error) => {
            println!("  error: {error}");
            return;
        }
    };

    println!("  type:     {}", response.kind.as_str());
    if let Some(title) = &response.title {
        println!("  title:    {title}");
    }
    if let Some(author) = &response.author_name {
        println!("  author:   {author}");
    }
    if let Some(provider) = &response.provider_name {
        println!("  provider: {provider}");
    }
    if let Some((width, height)) = response.dimensions() {
        println!("  size:     {width}x{height}");
    }
    match &response.kind {
        ResponseKind::Photo { url, .. } => println!("  url:      {url}"),
        ResponseKind::Video { html, .. } | ResponseKind::Rich { html, .. } => {
            println!("  html:     {html}")
        }
        ResponseKind::Link => {}
    }
}
