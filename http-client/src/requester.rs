//! Reusable request definitions with templated URLs.

use crate::client::HttpClient;
use crate::credential::HttpCredential;
use crate::data_structure::DataStructure;
use crate::error::{HttpError, Result};
use crate::request::{HttpRequest, Method};
use crate::response::HttpResponse;
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Charset used for request content
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// A request shape bound to a URL template such as
/// `http://host/api/sensors/$1/readings/$2`.
///
/// Placeholders are replaced by the positional arguments given when the
/// request is sent.
#[derive(Debug, Clone)]
pub struct HttpRequester {
    method: Method,
    url_template: String,
    accept: Option<String>,
    content_type: Option<String>,
    charset: String,
}

impl HttpRequester {
    pub fn new(method: Method, url_template: impl Into<String>) -> Self {
        Self {
            method,
            url_template: url_template.into(),
            accept: None,
            content_type: None,
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Requester exchanging `T` documents in both directions
    pub fn for_structure<T: DataStructure>(method: Method, url_template: impl Into<String>) -> Self {
        let media_type = T::media_type();
        Self::new(method, url_template)
            .with_accept(media_type.clone())
            .with_content_type(media_type)
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Only UTF-8 is supported, other charsets fail when content is encoded
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Content type as sent, with the charset parameter appended
    pub fn content_type_header(&self) -> Option<String> {
        self.content_type
            .as_ref()
            .map(|content_type| format!("{};charset=\"{}\"", content_type, self.charset))
    }

    /// Encode text content with the requester charset
    pub fn encode_content(&self, content: &str) -> Result<Vec<u8>> {
        if !self.charset.eq_ignore_ascii_case(DEFAULT_CHARSET) {
            return Err(HttpError::UnsupportedCharset(self.charset.clone()));
        }
        Ok(content.as_bytes().to_vec())
    }

    /// Substitute `$n` placeholders, highest index first
    pub fn format_url(&self, args: &[&str]) -> Result<String> {
        let mut url = self.url_template.clone();
        for (index, arg) in args.iter().enumerate().rev() {
            url = url.replace(&format!("${}", index + 1), arg);
        }
        url::Url::parse(&url).map_err(|e| HttpError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Requesting {}", url);
        Ok(url)
    }

    /// Build the request for `args`.
    ///
    /// `DELETE` carries neither content nor an accept list.
    pub fn build_request(
        &self,
        credential: Option<HttpCredential>,
        headers: Option<&HashMap<String, String>>,
        content: Option<Vec<u8>>,
        args: &[&str],
    ) -> Result<HttpRequest> {
        let url = self.format_url(args)?;
        let mut request = HttpRequest::new(self.method, url).with_optional_credential(credential);
        if let Some(headers) = headers {
            request = request.with_headers(headers);
        }

        if self.method != Method::Delete {
            if let Some(accept) = &self.accept {
                request = request.with_accept(accept);
            }
        }
        if self.method == Method::Post {
            if let (Some(content_type), Some(body)) = (self.content_type_header(), content) {
                request = request.with_content(content_type, body);
            }
        }
        Ok(request)
    }

    pub fn send_request(
        &self,
        client: &HttpClient,
        credential: Option<HttpCredential>,
        headers: Option<&HashMap<String, String>>,
        content: Option<Vec<u8>>,
        args: &[&str],
    ) -> Result<HttpResponse> {
        let request = self.build_request(credential, headers, content, args)?;
        client.send(&request)
    }

    pub fn send_async_request<F>(
        &self,
        client: &HttpClient,
        credential: Option<HttpCredential>,
        headers: Option<&HashMap<String, String>>,
        content: Option<Vec<u8>>,
        args: &[&str],
        handler: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(HttpResponse) + Send + 'static,
    {
        let request = self.build_request(credential, headers, content, args)?;
        client.send_async(request, handler)
    }
}
