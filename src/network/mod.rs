//! Error-classifying request wrapper.
//!
//! | Piece | Role |
//! |---|---|
//! | [`Resource`] / [`ApiService`] | What to send |
//! | [`build_request`] / [`build_multipart_upload`] | Encode into an [`EncodedRequest`] |
//! | [`Transport`] / [`HttpTransport`] | Put it on the wire (`reqwest::blocking`) |
//! | [`ApiClient`] | Send, classify, call back exactly once |
//!
//! ```no_run
//! use cropsend::network::{ApiClient, Endpoint, HttpTransport, Method, Resource};
//!
//! let transport = HttpTransport::new()?;
//! let client = ApiClient::new(transport, "https://api.example.com/".parse()?);
//! let endpoint = Endpoint::new("users", Resource::new(Method::Get).with_parameter("page", 1));
//! client.request(
//!     &endpoint,
//!     false,
//!     |value| println!("{value}"),
//!     |reason, error| eprintln!("{reason}: {error}"),
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod encoding;
mod error;
mod multipart;
mod resource;
pub mod transport;

pub use client::{ActivityIndicator, ApiClient, interpret};
pub use encoding::{
    BodyEncoding, EncodedRequest, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, ParameterEncoding,
    build_request, choose_encoding, flatten_parameters, query_components, resolve_url,
};
pub use error::{
    DEFAULT_FAILURE_MESSAGE, EncodeError, NetworkErrorReason, RequestError, RequestFailure,
    TIMEOUT_DESCRIPTION, TransportError, TransportErrorKind, classify_status, classify_transport,
};
pub use multipart::{BOUNDARY, build_multipart_upload, content_type, form_value, multipart_body};
pub use resource::{ApiService, Endpoint, Headers, Method, Parameters, Resource, UnknownMethod};
pub use transport::{HttpTransport, RawResponse, Transport};
