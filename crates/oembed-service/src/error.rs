use std::error::Error;
use std::time::Duration;

use thiserror::Error;

/// An error that happens when fetching an oEmbed response from a provider.
///
/// None of these errors are cached. A resource that does not exist or cannot be embedded is not
/// an error, but a negative result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OembedError {
    /// The provider refused to serve the resource.
    ///
    /// The attached string contains the provider's response.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The provider did not respond in time.
    #[error("download timed out after {0:?}")]
    Timeout(Duration),
    /// The response could not be fetched due to another problem, like connection loss, DNS
    /// resolution, or a 5xx server response.
    ///
    /// The attached string contains the provider's response.
    #[error("download failed: {0}")]
    DownloadError(String),
    /// The response was fetched successfully, but is not a valid oEmbed response.
    #[error("malformed: {0}")]
    Malformed(String),
    /// An unexpected error in the service itself.
    #[error("internal error")]
    InternalError,
}

impl OembedError {
    /// Creates a [`OembedError::DownloadError`] from the innermost cause of `error`.
    pub(crate) fn download_error(mut error: &dyn Error) -> Self {
        while let Some(src) = error.source() {
            error = src;
        }

        let mut error_string = error.to_string();

        // Special-case a few error strings
        if error_string.contains("certificate verify failed") {
            error_string = "certificate verify failed".to_string();
        }

        Self::DownloadError(error_string)
    }

    /// A short, stable name of the error kind, used to tag metrics.
    pub fn metrics_tag(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permissiondenied",
            Self::Timeout(_) => "timeout",
            Self::DownloadError(_) => "downloaderror",
            Self::Malformed(_) => "malformed",
            Self::InternalError => "internalerror",
        }
    }
}

impl From<reqwest::Error> for OembedError {
    fn from(error: reqwest::Error) -> Self {
        Self::download_error(&error)
    }
}

impl From<serde_json::Error> for OembedError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}
