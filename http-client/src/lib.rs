//! HTTP client for the REST services a home gateway talks to
//!
//! The crate sends `GET`, `POST` and `DELETE` requests over plain HTTP and
//! turns every exchange into an [`HttpResponse`]: status, headers, charset
//! aware content and an optional JSON view. Transport failures never
//! surface as errors, they are reported through synthetic statuses such as
//! [`HttpStatus::ServerTimeout`].
//!
//! On top of the client, [`HttpRequester`] describes a request against a
//! templated URL and [`ConnectorCore`] maps service answers to a small
//! error taxonomy for connectors implementing [`ServiceConnector`].
//!
//! # Quick Start
//!
//! ```no_run
//! use gateway_http::{HttpClient, HttpRequester, Method};
//!
//! let client = HttpClient::new()?;
//! let requester = HttpRequester::new(Method::Get, "http://192.168.1.10/api/sensors/$1")
//!     .with_accept("application/json");
//! let response = requester.send_request(&client, None, None, None, &["42"])?;
//! println!("{:?} {}", response.status(), response.content_as_string());
//! # Ok::<(), gateway_http::HttpError>(())
//! ```

mod client;
mod connector;
mod credential;
mod data_structure;
mod error;
mod request;
mod requester;
mod response;
mod status;

pub use client::{HttpClient, HttpClientConfig};
pub use connector::{ConnectorCore, ConnectorError, ReportedError, ServiceConnector};
pub use credential::HttpCredential;
pub use data_structure::DataStructure;
pub use error::{HttpError, Result};
pub use request::{HttpRequest, Method};
pub use requester::{HttpRequester, DEFAULT_CHARSET};
pub use response::HttpResponse;
pub use status::HttpStatus;
