//! Base for clients of a versioned REST service.
//!
//! A concrete connector embeds a [`ConnectorCore`] and implements
//! [`ServiceConnector`]. The core sends requests through an
//! [`HttpRequester`], maps HTTP statuses to [`ConnectorError`] and keeps
//! the last error with the exchange that caused it.

use crate::client::HttpClient;
use crate::credential::HttpCredential;
use crate::error::{parse_http_url, HttpError};
use crate::requester::HttpRequester;
use crate::response::HttpResponse;
use crate::status::HttpStatus;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Failures of a service request, as seen by a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConnectorError {
    #[error("No HTTP client available")]
    NoHttpClient,
    #[error("Bad URL")]
    BadUrl,
    #[error("Charset not supported")]
    CharsetNotSupported,
    #[error("Unexpected response format")]
    UnexpectedResponseFormat,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Resource not found")]
    ResourceNotFound,
    #[error("Service internal error")]
    ServiceInternalError,
    #[error("Service unreachable")]
    ServiceUnreachable,
    #[error("Service rejected the request")]
    ServiceRejectRequest,
    #[error("Invalid response")]
    InvalidResponse,
}

impl From<HttpError> for ConnectorError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::InvalidUrl { .. } | HttpError::UnsupportedScheme(_) => ConnectorError::BadUrl,
            HttpError::UnsupportedCharset(_) => ConnectorError::CharsetNotSupported,
            HttpError::Serialization(_) | HttpError::Runtime(_) => ConnectorError::ServiceRejectRequest,
        }
    }
}

/// Last failure recorded by a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub error: ConnectorError,
    /// `METHOD URL: status content content-type` of the failed exchange
    pub context: Option<String>,
}

/// State shared by every connector
#[derive(Debug, Default)]
pub struct ConnectorCore {
    http_client: Option<HttpClient>,
    entry_point: Option<String>,
    last_error: Mutex<Option<ReportedError>>,
}

impl ConnectorCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(client: HttpClient) -> Self {
        Self {
            http_client: Some(client),
            ..Self::default()
        }
    }

    pub fn set_http_client(&mut self, client: Option<HttpClient>) {
        self.http_client = client;
    }

    pub fn http_client(&self) -> Option<&HttpClient> {
        self.http_client.as_ref()
    }

    /// Require an `http` URL and return it with a trailing `/`
    pub fn validate_entry_point_url(url: &str) -> Result<String, HttpError> {
        let mut url = parse_http_url(url)?.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        Ok(url)
    }

    pub fn set_entry_point_url(&mut self, url: &str) -> Result<(), HttpError> {
        self.entry_point = Some(Self::validate_entry_point_url(url)?);
        Ok(())
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn last_error(&self) -> Option<ConnectorError> {
        let guard = self.last_error.lock().ok()?;
        guard.as_ref().map(|reported| reported.error)
    }

    pub fn last_error_context(&self) -> Option<String> {
        let guard = self.last_error.lock().ok()?;
        guard.as_ref().and_then(|reported| reported.context.clone())
    }

    /// Send a request and return the JSON content of an acceptable `200`.
    ///
    /// A `200` whose content is not JSON yields `Ok(None)`. Every failure
    /// is logged and kept as the last error; a success clears it.
    pub fn request(
        &self,
        requester: &HttpRequester,
        username: Option<&str>,
        password: Option<&str>,
        headers: Option<&HashMap<String, String>>,
        content: Option<&str>,
        args: &[&str],
    ) -> Result<Option<Value>, ConnectorError> {
        self.clear_error();

        let Some(client) = &self.http_client else {
            return Err(self.report(ConnectorError::NoHttpClient, None));
        };

        let body = match content.map(|text| requester.encode_content(text)).transpose() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("{}", e);
                return Err(self.report(ConnectorError::CharsetNotSupported, None));
            }
        };

        let credential = HttpCredential::from_parts(username, password);
        let response = match requester.send_request(client, credential, headers, body, args) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request not sent: {}", e);
                return Err(self.report(e.into(), None));
            }
        };

        let error = match response.status() {
            Some(HttpStatus::Ok) if response.is_acceptable() => return Ok(response.content_as_json()),
            Some(HttpStatus::Ok) => ConnectorError::UnexpectedResponseFormat,
            Some(HttpStatus::Unauthorized) => ConnectorError::Unauthorized,
            Some(HttpStatus::NotFound) => ConnectorError::ResourceNotFound,
            Some(HttpStatus::InternalServerError) => ConnectorError::ServiceInternalError,
            Some(HttpStatus::ServerTimeout) => ConnectorError::ServiceUnreachable,
            _ => ConnectorError::ServiceRejectRequest,
        };
        Err(self.report(error, Some(exchange_context(&response))))
    }

    /// Record that a response was received but its content is unusable
    pub fn report_invalid_response(&self) {
        self.report(ConnectorError::InvalidResponse, None);
    }

    fn clear_error(&self) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = None;
        }
    }

    fn report(&self, error: ConnectorError, context: Option<String>) -> ConnectorError {
        match &context {
            Some(context) => tracing::error!("{}({})", error, context),
            None => tracing::error!("{}", error),
        }
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(ReportedError { error, context });
        }
        error
    }
}

fn exchange_context(response: &HttpResponse) -> String {
    let status = match (response.status(), response.status_code()) {
        (Some(status), _) => status.to_string(),
        (None, Some(code)) => code.to_string(),
        (None, None) => "-".to_string(),
    };
    format!(
        "{} {}: {} {} {}",
        response.method(),
        response.url(),
        status,
        response.content_as_string(),
        response.content_type().unwrap_or("-")
    )
}

/// A client of one version of a REST service
pub trait ServiceConnector {
    /// Version of the service API this connector speaks
    fn version_id(&self) -> &str;

    fn set_entry_point(&mut self, url: &str) -> Result<(), HttpError>;

    fn core(&self) -> &ConnectorCore;

    fn core_mut(&mut self) -> &mut ConnectorCore;

    fn set_http_client(&mut self, client: Option<HttpClient>) {
        self.core_mut().set_http_client(client);
    }

    fn last_error(&self) -> Option<ConnectorError> {
        self.core().last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use rstest::rstest;

    #[rstest]
    #[case("http://192.168.1.10/api", "http://192.168.1.10/api/")]
    #[case("http://192.168.1.10/api/", "http://192.168.1.10/api/")]
    #[case("http://box:8080", "http://box:8080/")]
    fn test_validate_entry_point_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(ConnectorCore::validate_entry_point_url(url).unwrap(), expected);
    }

    #[test]
    fn test_validate_entry_point_url_requires_http() {
        assert!(ConnectorCore::validate_entry_point_url("https://box/api").is_err());
        assert!(ConnectorCore::validate_entry_point_url("box/api").is_err());
    }

    #[test]
    fn test_request_without_client() {
        let core = ConnectorCore::new();
        let requester = HttpRequester::new(Method::Get, "http://box/api");
        let result = core.request(&requester, None, None, None, None, &[]);
        assert_eq!(result, Err(ConnectorError::NoHttpClient));
        assert_eq!(core.last_error(), Some(ConnectorError::NoHttpClient));
        assert_eq!(core.last_error_context(), None);
    }

    #[test]
    fn test_request_with_bad_url() {
        let core = ConnectorCore::with_http_client(HttpClient::new().unwrap());
        let requester = HttpRequester::new(Method::Get, "$1/items");
        let result = core.request(&requester, None, None, None, None, &["box"]);
        assert_eq!(result, Err(ConnectorError::BadUrl));
    }

    #[test]
    fn test_request_with_unsupported_charset() {
        let core = ConnectorCore::with_http_client(HttpClient::new().unwrap());
        let requester = HttpRequester::new(Method::Post, "http://box/items").with_charset("UTF-16");
        let result = core.request(&requester, None, None, None, Some("{}"), &[]);
        assert_eq!(result, Err(ConnectorError::CharsetNotSupported));
    }

    #[test]
    fn test_report_invalid_response() {
        let core = ConnectorCore::new();
        core.report_invalid_response();
        assert_eq!(core.last_error(), Some(ConnectorError::InvalidResponse));
    }

    #[test]
    fn test_http_error_conversion() {
        assert_eq!(
            ConnectorError::from(HttpError::UnsupportedScheme("ftp".to_string())),
            ConnectorError::BadUrl
        );
        assert_eq!(
            ConnectorError::from(HttpError::UnsupportedCharset("UTF-16".to_string())),
            ConnectorError::CharsetNotSupported
        );
    }
}
