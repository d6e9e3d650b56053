//! Error types for the HTTP client.

use thiserror::Error;

/// Errors raised before a request reaches the network.
///
/// Failures talking to the server are not errors: they are reported as an
/// [`HttpResponse`](crate::HttpResponse) carrying a synthetic status.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unsupported URL scheme '{0}', only http is accepted")]
    UnsupportedScheme(String),
    #[error("Charset '{0}' is not supported")]
    UnsupportedCharset(String),
    #[error("Failed to serialize content: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Async runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, HttpError>;

/// Parse `url` and require the plain `http` scheme
pub(crate) fn parse_http_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url).map_err(|e| HttpError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme() != "http" {
        return Err(HttpError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(parsed)
}
