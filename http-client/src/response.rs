//! Response model and the rules turning a raw exchange into it.

use crate::request::Method;
use crate::status::HttpStatus;
use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;
use std::io::Read;

/// Outcome of one HTTP exchange.
///
/// Built once from the server answer. Transport failures produce a
/// response with [`HttpStatus::ServerTimeout`] and no content.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    url: String,
    method: Method,
    status: Option<HttpStatus>,
    status_code: Option<u16>,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    charset: Option<&'static Encoding>,
    content: Vec<u8>,
    acceptable: bool,
    json: Option<Value>,
}

/// What was received from the server, before any interpretation
pub(crate) struct RawExchange<R> {
    pub url: String,
    pub method: Method,
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: R,
}

impl HttpResponse {
    /// Response for a server that could not be reached
    pub(crate) fn unreachable(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            status: Some(HttpStatus::ServerTimeout),
            status_code: None,
            headers: Vec::new(),
            content_type: None,
            charset: None,
            content: Vec::new(),
            acceptable: true,
            json: None,
        }
    }

    pub(crate) fn from_exchange<R: Read>(raw: RawExchange<R>, accept: Option<&[String]>) -> Self {
        let RawExchange {
            url,
            method,
            status_code,
            headers,
            mut body,
        } = raw;

        let mut status = HttpStatus::from_code(status_code);
        let content_type = find_header(&headers, "content-type").map(str::to_string);

        let mut charset = None;
        if let Some(label) = content_type.as_deref().and_then(charset_label) {
            match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => charset = Some(encoding),
                None => {
                    tracing::warn!("{} {}: unsupported charset '{}'", method, url, label);
                    status = Some(HttpStatus::UnsupportedCharset);
                }
            }
        }

        let announced_length = find_header(&headers, "content-length")
            .and_then(|value| value.trim().parse::<u64>().ok());

        let mut content = Vec::new();
        if announced_length.is_some_and(|length| length > i32::MAX as u64) {
            tracing::error!("{} {}: announced content is too large", method, url);
            status = Some(HttpStatus::WrongLength);
        } else {
            match body.read_to_end(&mut content) {
                Ok(_) => {
                    let mismatch = announced_length.is_some_and(|length| length != content.len() as u64);
                    if mismatch && status == Some(HttpStatus::Ok) {
                        tracing::error!(
                            "{} {}: received {} bytes, expected {:?}",
                            method,
                            url,
                            content.len(),
                            announced_length
                        );
                        status = Some(HttpStatus::WrongLength);
                    }
                }
                Err(e) => {
                    tracing::error!("{} {}: failed to read content: {}", method, url, e);
                    status = Some(HttpStatus::ServerTimeout);
                    content.clear();
                }
            }
        }

        let acceptable = is_acceptable(content_type.as_deref(), accept);

        let mut response = Self {
            url,
            method,
            status,
            status_code: Some(status_code),
            headers,
            content_type,
            charset,
            content,
            acceptable,
            json: None,
        };

        let is_json = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if response.status == Some(HttpStatus::Ok) && is_json && !response.content.is_empty() {
            match parse_json(&response.content_as_string()) {
                Ok(value) => response.json = Some(value),
                Err(e) => tracing::error!("{} {}: invalid JSON content: {}", response.method, response.url, e),
            }
        }

        response
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// `None` when the server answered with a code outside [`HttpStatus`]
    pub fn status(&self) -> Option<HttpStatus> {
        self.status
    }

    /// Code actually sent by the server, `None` if nothing was received
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn is_ok(&self) -> bool {
        self.status == Some(HttpStatus::Ok)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Name of the charset announced by the content type, if recognized
    pub fn charset(&self) -> Option<&'static str> {
        self.charset.map(Encoding::name)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content decoded with the announced charset, UTF-8 by default
    pub fn content_as_string(&self) -> String {
        let encoding = self.charset.unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.content);
        text.into_owned()
    }

    /// JSON view of the content, an object or an array.
    ///
    /// Parsing is retried here when it was not done or failed while the
    /// response was built.
    pub fn content_as_json(&self) -> Option<Value> {
        if let Some(json) = &self.json {
            return Some(json.clone());
        }
        if self.content.is_empty() {
            return None;
        }
        match parse_json(&self.content_as_string()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("{} {}: content is not JSON: {}", self.method, self.url, e);
                None
            }
        }
    }

    /// Whether the content type matches one of the accepted media types
    pub fn is_acceptable(&self) -> bool {
        self.acceptable
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Charset label following `charset=` up to the next space or parameter
fn charset_label(content_type: &str) -> Option<String> {
    let start = content_type.find("charset=")? + "charset=".len();
    let label = content_type[start..]
        .split([' ', ';'])
        .next()
        .unwrap_or_default()
        .trim_matches('"');
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

fn is_acceptable(content_type: Option<&str>, accept: Option<&[String]>) -> bool {
    let (Some(content_type), Some(accept)) = (content_type, accept) else {
        return true;
    };
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    accept
        .iter()
        .any(|accepted| accepted.trim().eq_ignore_ascii_case(media_type))
}

/// Objects start with `{`, anything else must be an array
fn parse_json(text: &str) -> Result<Value, String> {
    let text = text.trim();
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    match (text.starts_with('{'), &value) {
        (true, Value::Object(_)) | (false, Value::Array(_)) => Ok(value),
        _ => Err("content is neither a JSON object nor a JSON array".to_string()),
    }
}
