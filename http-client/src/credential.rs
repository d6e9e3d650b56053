use base64::Engine;
use std::fmt;

/// Username and password sent with HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct HttpCredential {
    username: String,
    password: String,
}

impl HttpCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `None` unless both parts are present
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        Some(Self::new(username?, password?))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value of the `Authorization` header
    pub fn authorization_value(&self) -> String {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for HttpCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
