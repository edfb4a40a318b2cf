//! The request wrapper.
//!
//! [`ApiClient`] builds a request from an [`ApiService`], sends it through a
//! [`Transport`], and reports the outcome through exactly one of two
//! callbacks:
//!
//! - `on_success(Value)` for a 2xx response whose body is JSON. Empty bodies
//!   and 204/205 responses yield `Value::Null`.
//! - `on_failure(NetworkErrorReason, RequestError)` for everything else,
//!   classified as described in [`error`](super::error).
//!
//! Calls block; the callback runs on the calling thread after the response
//! is fully read. There are no retries.

use super::encoding::{BodyEncoding, EncodedRequest, build_request};
use super::error::{
    EncodeError, NetworkErrorReason, RequestError, RequestFailure, classify_status,
    classify_transport,
};
use super::multipart::build_multipart_upload;
use super::resource::{ApiService, Headers};
use super::transport::{RawResponse, Transport};
use crate::config::NetworkConfig;
use serde_json::Value;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Shared "request in flight" flag a host can poll to show a spinner.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndicator(Arc<AtomicBool>);

impl ActivityIndicator {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn begin(&self) -> ActivityGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        ActivityGuard(self)
    }
}

struct ActivityGuard<'a>(&'a ActivityIndicator);

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: Url,
    body_encoding: BodyEncoding,
    default_headers: Headers,
    activity: ActivityIndicator,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            body_encoding: BodyEncoding::default(),
            default_headers: Headers::new(),
            activity: ActivityIndicator::default(),
        }
    }

    pub fn from_config(transport: T, config: &NetworkConfig) -> Result<Self, EncodeError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| EncodeError::InvalidUrl {
            path: config.base_url.clone(),
            source,
        })?;
        Ok(Self::new(transport, base_url)
            .with_body_encoding(config.body_encoding)
            .with_default_headers(config.headers.clone()))
    }

    pub fn with_body_encoding(mut self, body_encoding: BodyEncoding) -> Self {
        self.body_encoding = body_encoding;
        self
    }

    /// Headers added to every request that doesn't already set them.
    pub fn with_default_headers(mut self, headers: Headers) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn activity(&self) -> ActivityIndicator {
        self.activity.clone()
    }

    /// Send `service` and report through one of the callbacks.
    ///
    /// `url_encoded` forces parameters into the query string regardless of
    /// method.
    pub fn request(
        &self,
        service: &dyn ApiService,
        url_encoded: bool,
        on_success: impl FnOnce(Value),
        on_failure: impl FnOnce(NetworkErrorReason, RequestError),
    ) {
        log_request(service);
        let request = build_request(&self.base_url, service, url_encoded, self.body_encoding);
        self.dispatch(request, on_success, on_failure);
    }

    /// Upload `file_bytes` as a PNG part plus the resource parameters.
    pub fn upload(
        &self,
        service: &dyn ApiService,
        file_bytes: &[u8],
        on_success: impl FnOnce(Value),
        on_failure: impl FnOnce(NetworkErrorReason, RequestError),
    ) {
        log_request(service);
        let request = build_multipart_upload(&self.base_url, service, file_bytes);
        self.dispatch(request, on_success, on_failure);
    }

    /// [`request`](Self::request) returning the outcome instead.
    pub fn send(&self, service: &dyn ApiService, url_encoded: bool) -> Result<Value, RequestFailure> {
        let outcome = Cell::new(None);
        self.request(
            service,
            url_encoded,
            |value| outcome.set(Some(Ok(value))),
            |reason, error| outcome.set(Some(Err(RequestFailure::new(reason, error)))),
        );
        collect(outcome.into_inner())
    }

    /// [`upload`](Self::upload) returning the outcome instead.
    pub fn send_upload(
        &self,
        service: &dyn ApiService,
        file_bytes: &[u8],
    ) -> Result<Value, RequestFailure> {
        let outcome = Cell::new(None);
        self.upload(
            service,
            file_bytes,
            |value| outcome.set(Some(Ok(value))),
            |reason, error| outcome.set(Some(Err(RequestFailure::new(reason, error)))),
        );
        collect(outcome.into_inner())
    }

    /// Send an already built request.
    pub fn execute(
        &self,
        mut request: EncodedRequest,
        on_success: impl FnOnce(Value),
        on_failure: impl FnOnce(NetworkErrorReason, RequestError),
    ) {
        for (name, value) in &self.default_headers {
            request.set_header_if_absent(name, value.clone());
        }

        let _active = self.activity.begin();
        match self.exchange(&request) {
            Ok(value) => on_success(value),
            Err(failure) => {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    reason = %failure.reason,
                    "request failed"
                );
                on_failure(failure.reason, failure.error)
            }
        }
    }

    fn dispatch(
        &self,
        request: Result<EncodedRequest, EncodeError>,
        on_success: impl FnOnce(Value),
        on_failure: impl FnOnce(NetworkErrorReason, RequestError),
    ) {
        match request {
            Ok(request) => self.execute(request, on_success, on_failure),
            Err(e) => {
                tracing::warn!(error = %e, "could not build request");
                let failure = RequestFailure::from(e);
                on_failure(failure.reason, failure.error)
            }
        }
    }

    fn exchange(&self, request: &EncodedRequest) -> Result<Value, RequestFailure> {
        let response = self.transport.send(request).map_err(|e| {
            tracing::debug!(error = %e, "no response");
            RequestFailure::new(classify_transport(&e), e.into())
        })?;

        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            url = %request.url,
            "API response"
        );
        interpret(response)
    }
}

/// Turn a response into the success value or a classified failure.
pub fn interpret(response: RawResponse) -> Result<Value, RequestFailure> {
    let code = response.status;
    if !response.is_success() {
        return Err(RequestFailure::new(
            classify_status(code, &response.body),
            RequestError::from_status(code),
        ));
    }
    if matches!(code, 204 | 205) || response.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|e| {
        RequestFailure::new(
            classify_status(code, &response.body),
            RequestError {
                status: Some(code),
                description: format!("JSON could not be serialized: {e}"),
            },
        )
    })
}

fn log_request(service: &dyn ApiService) {
    let resource = service.resource();
    tracing::debug!(
        path = service.path(),
        method = %resource.method,
        parameters = ?resource.parameters,
        headers = ?resource.headers,
        "API request"
    );
}

fn collect(outcome: Option<Result<Value, RequestFailure>>) -> Result<Value, RequestFailure> {
    // Both paths above always invoke one callback.
    outcome.unwrap_or_else(|| {
        Err(RequestFailure::new(
            NetworkErrorReason::Other,
            RequestError {
                status: None,
                description: "no callback was invoked".to_string(),
            },
        ))
    })
}
