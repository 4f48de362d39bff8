//! The oEmbed response format.
//!
//! See <https://oembed.com/#section2.3> for the fields defined by the protocol. Providers are not
//! very strict about the types they send, so numeric fields accept strings as well.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// A deserialized oEmbed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OembedResponse {
    /// The resource type, along with its type-specific fields.
    #[serde(flatten)]
    pub kind: ResponseKind,
    /// The oEmbed version number, which is always `1.0`.
    #[serde(default = "default_version", deserialize_with = "deserialize_lenient_string")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,
    /// The suggested cache lifetime for this resource, in seconds.
    #[serde(
        default,
        deserialize_with = "deserialize_dimension",
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_dimension",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_width: Option<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_dimension",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_height: Option<u64>,
}

impl OembedResponse {
    /// Returns the HTML snippet to embed, for `video` and `rich` responses.
    pub fn html(&self) -> Option<&str> {
        match &self.kind {
            ResponseKind::Video { html, .. } | ResponseKind::Rich { html, .. } => Some(html),
            ResponseKind::Photo { .. } | ResponseKind::Link => None,
        }
    }

    /// Returns the `(width, height)` of the embedded resource, if known.
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        match self.kind {
            ResponseKind::Photo { width, height, .. }
            | ResponseKind::Video { width, height, .. }
            | ResponseKind::Rich { width, height, .. } => width.zip(height),
            ResponseKind::Link => None,
        }
    }
}

/// The type of an oEmbed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseKind {
    /// A static photo.
    Photo {
        url: String,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        width: Option<u64>,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        height: Option<u64>,
    },
    /// A playable video.
    Video {
        html: String,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        width: Option<u64>,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        height: Option<u64>,
    },
    /// A rich HTML snippet that does not fit any of the other types.
    Rich {
        html: String,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        width: Option<u64>,
        #[serde(default, deserialize_with = "deserialize_dimension")]
        height: Option<u64>,
    },
    /// A generic link without anything to embed.
    Link,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo { .. } => "photo",
            Self::Video { .. } => "video",
            Self::Rich { .. } => "rich",
            Self::Link => "link",
        }
    }
}

fn default_version() -> String {
    "1.0".to_owned()
}

/// Deserializes a non-negative integer from a number or a numeric string.
///
/// Anything else, like `"100%"` or `null`, becomes `None`.
fn deserialize_dimension<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DimensionVisitor;

    impl<'de> Visitor<'de> for DimensionVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(u64::try_from(value).ok())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if value.is_finite() && value >= 0.0 {
                Ok(Some(value.round() as u64))
            } else {
                Ok(None)
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let value = value.trim();
            match value.parse::<u64>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => Ok(value.parse::<f64>().ok().and_then(|value| {
                    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
                })),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<De>(self, deserializer: De) -> Result<Self::Value, De::Error>
        where
            De: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(DimensionVisitor)
}

/// Deserializes a string from either a string or a number, as some providers send
/// `"version": 1.0`.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientStringVisitor;

    impl Visitor<'_> for LenientStringVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.to_owned())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(format!("{value}.0"))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(format!("{value}.0"))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(format!("{value:.1}"))
        }
    }

    deserializer.deserialize_any(LenientStringVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video() {
        let json = r#"{
            "type": "video",
            "version": "1.0",
            "title": "Rick Astley - Never Gonna Give You Up",
            "author_name": "Rick Astley",
            "author_url": "https://www.youtube.com/@RickAstleyYT",
            "provider_name": "YouTube",
            "provider_url": "https://www.youtube.com/",
            "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
            "thumbnail_width": 480,
            "thumbnail_height": 360,
            "html": "<iframe width=\"200\" height=\"113\"></iframe>",
            "width": 200,
            "height": 113
        }"#;

        let response: OembedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.kind.as_str(), "video");
        assert_eq!(
            response.html(),
            Some("<iframe width=\"200\" height=\"113\"></iframe>")
        );
        assert_eq!(response.dimensions(), Some((200, 113)));
        insta::assert_json_snapshot!(response, @r###"
        {
          "type": "video",
          "html": "<iframe width=\"200\" height=\"113\"></iframe>",
          "width": 200,
          "height": 113,
          "version": "1.0",
          "title": "Rick Astley - Never Gonna Give You Up",
          "author_name": "Rick Astley",
          "author_url": "https://www.youtube.com/@RickAstleyYT",
          "provider_name": "YouTube",
          "provider_url": "https://www.youtube.com/",
          "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
          "thumbnail_width": 480,
          "thumbnail_height": 360
        }
        "###);
    }

    #[test]
    fn test_photo_with_string_dimensions() {
        let json = r#"{
            "type": "photo",
            "version": 1.0,
            "url": "https://live.staticflickr.com/65535/1.jpg",
            "width": "1024",
            "height": "683",
            "cache_age": "3600"
        }"#;

        let response: OembedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.version, "1.0");
        assert_eq!(response.cache_age, Some(3600));
        assert_eq!(
            response.kind,
            ResponseKind::Photo {
                url: "https://live.staticflickr.com/65535/1.jpg".into(),
                width: Some(1024),
                height: Some(683),
            }
        );
        assert_eq!(response.html(), None);
    }

    #[test]
    fn test_rich_with_relative_width() {
        let json = r#"{
            "type": "rich",
            "version": "1.0",
            "html": "<blockquote class=\"twitter-tweet\"></blockquote>",
            "width": "100%",
            "height": null
        }"#;

        let response: OembedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.kind,
            ResponseKind::Rich {
                html: "<blockquote class=\"twitter-tweet\"></blockquote>".into(),
                width: None,
                height: None,
            }
        );
        assert_eq!(response.dimensions(), None);
    }

    #[test]
    fn test_link_without_version() {
        let response: OembedResponse =
            serde_json::from_str(r#"{"type": "link", "title": "Some page"}"#).unwrap();
        assert_eq!(response.kind, ResponseKind::Link);
        assert_eq!(response.version, "1.0");
        assert_eq!(response.title.as_deref(), Some("Some page"));
    }

    #[test]
    fn test_unknown_type() {
        let result = serde_json::from_str::<OembedResponse>(r#"{"type": "audio"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<OembedResponse>(r#"{"type": "video"}"#);
        assert!(result.is_err(), "video responses require html");
    }
}
