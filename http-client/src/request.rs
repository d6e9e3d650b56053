use crate::credential::HttpCredential;
use std::collections::HashMap;
use std::fmt;

/// HTTP methods used by REST services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to send with [`HttpClient`](crate::HttpClient)
///
/// # Examples
///
/// ```
/// use gateway_http::{HttpCredential, HttpRequest};
///
/// let request = HttpRequest::post("http://192.168.1.10/api/items")
///     .with_credential(HttpCredential::new("admin", "secret"))
///     .with_content("application/json", br#"{"name":"lamp"}"#.to_vec())
///     .with_accept("application/json, text/plain");
/// assert_eq!(request.accept().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: String,
    credential: Option<HttpCredential>,
    content_type: Option<String>,
    body: Option<Vec<u8>>,
    accept: Option<Vec<String>>,
    headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            credential: None,
            content_type: None,
            body: None,
            accept: None,
            headers: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_credential(mut self, credential: HttpCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_optional_credential(mut self, credential: Option<HttpCredential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_content(mut self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body);
        self
    }

    /// Accepted media types, comma separated
    pub fn with_accept(mut self, accept: &str) -> Self {
        let list = accept
            .split(',')
            .map(str::trim)
            .filter(|media_type| !media_type.is_empty())
            .map(str::to_string)
            .collect();
        self.accept = Some(list);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: &HashMap<String, String>) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credential(&self) -> Option<&HttpCredential> {
        self.credential.as_ref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn accept(&self) -> Option<&[String]> {
        self.accept.as_deref()
    }

    /// Headers in the order they are sent.
    ///
    /// Caller headers come first, then `Authorization`, `Content-Type`
    /// and `Accept`. An accept list replaces any `Accept` header given by
    /// the caller.
    pub fn wire_headers(&self) -> Vec<(String, String)> {
        let mut wire: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| self.accept.is_none() || !name.eq_ignore_ascii_case("accept"))
            .cloned()
            .collect();

        if let Some(credential) = &self.credential {
            wire.push(("Authorization".to_string(), credential.authorization_value()));
        }
        if let Some(content_type) = &self.content_type {
            wire.push(("Content-Type".to_string(), content_type.clone()));
        }
        if let Some(accept) = &self.accept {
            wire.push(("Accept".to_string(), accept.join(", ")));
        }
        wire
    }
}
