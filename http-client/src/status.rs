use std::fmt;

/// HTTP statuses the client reports
///
/// Besides the real codes, a few synthetic statuses describe failures
/// detected on the client side while reading a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    UnsupportedMediaType,
    InternalServerError,
    /// The server could not be reached or the response could not be read
    ServerTimeout,
    /// The body length differs from the announced one, or is too large
    WrongLength,
    InvalidJson,
    UnsupportedCharset,
}

impl HttpStatus {
    /// Map a real HTTP status code; synthetic codes are never produced
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(HttpStatus::Ok),
            400 => Some(HttpStatus::BadRequest),
            401 => Some(HttpStatus::Unauthorized),
            403 => Some(HttpStatus::Forbidden),
            404 => Some(HttpStatus::NotFound),
            405 => Some(HttpStatus::MethodNotAllowed),
            406 => Some(HttpStatus::NotAcceptable),
            415 => Some(HttpStatus::UnsupportedMediaType),
            500 => Some(HttpStatus::InternalServerError),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::BadRequest => 400,
            HttpStatus::Unauthorized => 401,
            HttpStatus::Forbidden => 403,
            HttpStatus::NotFound => 404,
            HttpStatus::MethodNotAllowed => 405,
            HttpStatus::NotAcceptable => 406,
            HttpStatus::UnsupportedMediaType => 415,
            HttpStatus::InternalServerError => 500,
            HttpStatus::ServerTimeout => 1000,
            HttpStatus::WrongLength => 2000,
            HttpStatus::InvalidJson => 2001,
            HttpStatus::UnsupportedCharset => 2002,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            HttpStatus::Ok => "Ok",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Unauthorized => "Unauthorized",
            HttpStatus::Forbidden => "Forbidden",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::MethodNotAllowed => "Method Not Allowed",
            HttpStatus::NotAcceptable => "Not Acceptable",
            HttpStatus::UnsupportedMediaType => "Unsupported Media Type",
            HttpStatus::InternalServerError => "Internal Server Error",
            HttpStatus::ServerTimeout => "Server Is Not Reachable",
            HttpStatus::WrongLength => "Content Has Unexpected Length",
            HttpStatus::InvalidJson => "Content Is Expected To Be JSON Formatted, But Is Not",
            HttpStatus::UnsupportedCharset => "Content Charset Is Not Supported",
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, Some(HttpStatus::Ok))]
    #[case(401, Some(HttpStatus::Unauthorized))]
    #[case(415, Some(HttpStatus::UnsupportedMediaType))]
    #[case(500, Some(HttpStatus::InternalServerError))]
    #[case(201, None)]
    #[case(503, None)]
    #[case(1000, None)]
    #[case(2000, None)]
    fn test_from_code(#[case] code: u16, #[case] expected: Option<HttpStatus>) {
        assert_eq!(HttpStatus::from_code(code), expected);
    }

    #[test]
    fn test_synthetic_codes() {
        assert_eq!(HttpStatus::ServerTimeout.code(), 1000);
        assert_eq!(HttpStatus::UnsupportedCharset.code(), 2002);
        assert_eq!(HttpStatus::WrongLength.to_string(), "2000 Content Has Unexpected Length");
    }
}
