// Build-server endpoint resolution: `{base_url}mercurial/notifyCommit`.

use thiserror::Error;
use url::Url;

/// Path of the commit notification endpoint, relative to the server root.
pub const NOTIFY_COMMIT_PATH: &str = "mercurial/notifyCommit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported base URL scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),
}

/// Resolve the notify endpoint for a build-server base URL.
///
/// The base is always treated as a directory, so a missing trailing slash
/// does not swallow the last path segment. Query and fragment are dropped.
pub fn notify_commit_url(base: &str) -> Result<Url, EndpointError> {
    let invalid = |source| EndpointError::InvalidBaseUrl { url: base.to_string(), source };

    let mut url = Url::parse(base.trim()).map_err(invalid)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(EndpointError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let directory = format!("{}/", url.path());
        url.set_path(&directory);
    }

    url.join(NOTIFY_COMMIT_PATH).map_err(invalid)
}
