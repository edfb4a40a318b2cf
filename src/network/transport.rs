//! Sending encoded requests.
//!
//! [`Transport`] is the seam between the request wrapper and the wire.
//! [`HttpTransport`] uses a blocking `reqwest` client; tests script responses
//! with [`tests::MockTransport`].

use super::encoding::EncodedRequest;
use super::error::{TransportError, TransportErrorKind};
use super::resource::Method;
use std::time::Duration;

/// Status and body of a response that arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a request and returns whatever came back. Non-2xx statuses are
/// responses, not errors.
pub trait Transport {
    fn send(&self, request: &EncodedRequest) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &EncodedRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request)
    }
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Client with reqwest's default timeouts.
    pub fn new() -> Result<Self, TransportError> {
        Self::build(reqwest::blocking::Client::builder())
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::build(reqwest::blocking::Client::builder().timeout(timeout))
    }

    fn build(builder: reqwest::blocking::ClientBuilder) -> Result<Self, TransportError> {
        let client = builder.build().map_err(|e| {
            TransportError::new(
                TransportErrorKind::Other,
                format!("failed to create HTTP client: {e}"),
            )
        })?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Options => reqwest::Method::OPTIONS,
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Trace => reqwest::Method::TRACE,
        Method::Connect => reqwest::Method::CONNECT,
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout()
    } else if e.is_connect() {
        TransportError::new(
            TransportErrorKind::Connect,
            format!("Could not connect to the server: {e}"),
        )
    } else {
        TransportError::new(TransportErrorKind::Other, format!("Request failed: {e}"))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &EncodedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(map_reqwest_error)?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
