//! A consumer of the [oEmbed](https://oembed.com) protocol.
//!
//! [`OembedService`](service::OembedService) resolves URLs of embeddable resources, like YouTube
//! videos or Instagram posts, to the HTML snippets and metadata their providers publish. Lookups
//! go through a request coalescing cache, see the [`caching`] module.

#[macro_use]
pub mod metrics;

pub mod caching;
pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod providers;
pub mod service;
pub mod types;
pub mod utils;
