//! Blocking HTTP client with a callback-based async variant.
//!
//! Requests are executed with a shared `ureq` agent. Async requests run the
//! same blocking exchange on the tokio blocking pool and hand the response
//! to a callback.

use crate::credential::HttpCredential;
use crate::error::{parse_http_url, HttpError, Result};
use crate::request::HttpRequest;
use crate::response::{HttpResponse, RawExchange};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// Client settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
    /// Upper bound of requests running at once on an owned runtime
    pub max_concurrent_requests: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            user_agent: format!("gateway-commons-http/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_requests: 16,
        }
    }
}

struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

#[derive(Clone)]
enum Executor {
    Owned(Arc<OwnedRuntime>),
    Shared(Handle),
}

impl Executor {
    fn spawn_blocking<F>(&self, task: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Executor::Owned(owned) => owned
                .0
                .as_ref()
                .map(|runtime| runtime.spawn_blocking(task))
                .ok_or_else(|| HttpError::Runtime("runtime is shut down".to_string())),
            Executor::Shared(handle) => Ok(handle.spawn_blocking(task)),
        }
    }
}

/// HTTP client for REST services
///
/// Cloning is cheap, clones share the connection pool and the runtime.
///
/// # Examples
///
/// ```no_run
/// use gateway_http::{HttpClient, HttpRequest};
///
/// let client = HttpClient::new()?;
/// let response = client.send(&HttpRequest::get("http://192.168.1.10/api/status"))?;
/// if let Some(json) = response.content_as_json() {
///     println!("{}", json);
/// }
/// # Ok::<(), gateway_http::HttpError>(())
/// ```
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    executor: Executor,
}

impl HttpClient {
    /// Client with default settings and its own async runtime
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_concurrent_requests.max(1))
            .thread_name("gateway-http")
            .enable_all()
            .build()
            .map_err(|e| HttpError::Runtime(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            agent: build_agent(&config),
            executor: Executor::Owned(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Client running async requests on an existing tokio runtime
    pub fn with_handle(config: HttpClientConfig, handle: Handle) -> Self {
        Self {
            agent: build_agent(&config),
            executor: Executor::Shared(handle),
        }
    }

    pub fn create_credential(&self, username: &str, password: &str) -> HttpCredential {
        HttpCredential::new(username, password)
    }

    /// Send a request and wait for the response.
    ///
    /// # Errors
    ///
    /// Only a malformed or non-`http` URL is an error. An unreachable
    /// server yields a response with status `ServerTimeout`.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = parse_http_url(request.url())?;
        Ok(execute(&self.agent, &url, request))
    }

    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        self.send(&HttpRequest::get(url))
    }

    pub fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.send(&HttpRequest::post(url).with_content(content_type, body))
    }

    pub fn delete(&self, url: &str) -> Result<HttpResponse> {
        self.send(&HttpRequest::delete(url))
    }

    /// Send a request in the background and pass the response to `handler`
    ///
    /// The URL is checked before anything is scheduled.
    pub fn send_async<F>(&self, request: HttpRequest, handler: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(HttpResponse) + Send + 'static,
    {
        let url = parse_http_url(request.url())?;
        let agent = self.agent.clone();
        self.executor.spawn_blocking(move || {
            let response = execute(&agent, &url, &request);
            handler(response);
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let executor = match self.executor {
            Executor::Owned(_) => "owned",
            Executor::Shared(_) => "shared",
        };
        f.debug_struct("HttpClient").field("executor", &executor).finish()
    }
}

fn build_agent(config: &HttpClientConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout_read(config.read_timeout)
        .user_agent(&config.user_agent)
        .build()
}

fn execute(agent: &ureq::Agent, url: &url::Url, request: &HttpRequest) -> HttpResponse {
    let method = request.method();
    tracing::debug!("{} {}", method, url);

    let mut call = agent.request_url(method.as_str(), url);
    for (name, value) in request.wire_headers() {
        call = call.set(&name, &value);
    }

    let result = match request.body() {
        Some(body) => call.send_bytes(body),
        None => call.call(),
    };

    let response = match result {
        Ok(response) | Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(e)) => {
            tracing::error!("{} {}: server is not reachable: {}", method, url, e);
            return HttpResponse::unreachable(url.as_str(), method);
        }
    };

    tracing::debug!("{} {} -> {}", method, url, response.status());
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();

    let raw = RawExchange {
        url: url.to_string(),
        method,
        status_code: response.status(),
        headers,
        body: response.into_reader(),
    };
    HttpResponse::from_exchange(raw, request.accept())
}
