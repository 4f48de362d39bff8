use std::fmt::{self, Write};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use url::Url;

/// The key of a cached oEmbed lookup.
///
/// A [`CacheKey`] is derived from the URL of the embedded resource. Two URLs that point to the
/// same resource under the normalization rules of [`CacheKey::from_url`] produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    normalized: Arc<str>,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl CacheKey {
    /// Derives the [`CacheKey`] for the given raw URL.
    ///
    /// This never fails:
    /// - surrounding whitespace is ignored,
    /// - absolute URLs are brought into their canonical form, which lower-cases the scheme and
    ///   host and removes default ports,
    /// - anything that does not parse as a URL is used verbatim,
    /// - trailing slashes are stripped.
    ///
    /// The query string is kept as is, so URLs differing only in their query are different keys.
    pub fn from_url(raw: &str) -> Self {
        let raw = raw.trim();
        let canonical = match Url::parse(raw) {
            Ok(url) => String::from(url),
            Err(_) => raw.to_owned(),
        };
        let normalized = canonical.trim_end_matches('/');

        Self {
            normalized: normalized.into(),
        }
    }

    /// Returns the normalized URL this key was derived from.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Returns a stable relative path for this cache key.
    ///
    /// The relative path is a sha-256 hash hex-formatted like so: `aa/bbccdd/eeff...`
    pub fn cache_path(&self) -> String {
        let hash: [u8; 32] = Sha256::digest(self.normalized.as_bytes()).into();

        let mut path = format!("{:02x}/", hash[0]);
        for b in &hash[1..4] {
            let _ = write!(path, "{b:02x}");
        }
        path.push('/');
        for b in &hash[4..] {
            let _ = write!(path, "{b:02x}");
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash() {
        let key = CacheKey::from_url("https://www.youtube.com/watch?v=D1PvIWdJ8xo");
        let with_slash = CacheKey::from_url("https://www.youtube.com/watch?v=D1PvIWdJ8xo/");
        assert_eq!(key, with_slash);

        assert_eq!(
            CacheKey::from_url("https://vimeo.com/"),
            CacheKey::from_url("https://vimeo.com")
        );
    }

    #[test]
    fn test_host_case() {
        let key = CacheKey::from_url("HTTPS://WWW.Instagram.com/p/BUawPlPF_Rx/");
        assert_eq!(key.as_str(), "https://www.instagram.com/p/BUawPlPF_Rx");
    }

    #[test]
    fn test_path_case_is_kept() {
        assert_ne!(
            CacheKey::from_url("https://vimeo.com/Foo"),
            CacheKey::from_url("https://vimeo.com/foo")
        );
    }

    #[test]
    fn test_query_is_literal() {
        assert_ne!(
            CacheKey::from_url("https://www.youtube.com/watch?v=a&t=1"),
            CacheKey::from_url("https://www.youtube.com/watch?t=1&v=a")
        );
        assert_ne!(
            CacheKey::from_url("https://www.youtube.com/watch?v=a"),
            CacheKey::from_url("https://www.youtube.com/watch")
        );
    }

    #[test]
    fn test_default_port() {
        assert_eq!(
            CacheKey::from_url("https://vimeo.com:443/76979871"),
            CacheKey::from_url("https://vimeo.com/76979871")
        );
    }

    #[test]
    fn test_malformed() {
        let key = CacheKey::from_url("  not a url/// ");
        assert_eq!(key.as_str(), "not a url");
        assert_eq!(key, CacheKey::from_url("not a url"));

        assert_eq!(CacheKey::from_url("").as_str(), "");
    }

    #[test]
    fn test_hashed_paths() {
        let key = CacheKey::from_url("https://vimeo.com/76979871");
        let path = key.cache_path();

        assert_eq!(path.len(), 2 + 1 + 6 + 1 + 56);
        assert_eq!(path, CacheKey::from_url("https://VIMEO.com/76979871/").cache_path());
        assert_ne!(
            path,
            CacheKey::from_url("https://vimeo.com/76979872").cache_path()
        );
    }
}
