//! Declarative request descriptions.
//!
//! A caller describes an endpoint with an [`ApiService`]: a path plus a
//! [`Resource`] carrying the method, optional parameters and optional
//! headers. Nothing here touches the network.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Request parameters as an ordered JSON object.
pub type Parameters = serde_json::Map<String, Value>;

/// Request headers, keyed by header name.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
    Connect,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Options,
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Trace,
        Method::Connect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// Methods whose parameters always travel in the query string.
    pub fn encodes_in_query(self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// What to send: method, parameters and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub method: Method,
    pub parameters: Option<Parameters>,
    pub headers: Option<Headers>,
}

impl Resource {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            parameters: None,
            headers: None,
        }
    }

    /// Add a parameter, creating the map on first use.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Parameters::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Add a header, creating the map on first use.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }
}

/// An endpoint the request wrapper can call.
pub trait ApiService {
    /// Absolute URL, or a path resolved against the client's base URL.
    fn path(&self) -> &str;
    fn resource(&self) -> &Resource;
}

/// Plain [`ApiService`] for ad-hoc calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub resource: Resource,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, resource: Resource) -> Self {
        Self {
            path: path.into(),
            resource,
        }
    }
}

impl ApiService for Endpoint {
    fn path(&self) -> &str {
        &self.path
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }
}
