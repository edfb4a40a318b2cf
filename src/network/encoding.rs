//! Turning an [`ApiService`] into a concrete [`EncodedRequest`].
//!
//! Parameters go into the query string for GET, HEAD and DELETE, or when the
//! caller asks for URL encoding. Every other method carries them in the body,
//! form-urlencoded or JSON depending on [`BodyEncoding`].
//!
//! Nested values are flattened the same way for the query string and for
//! form bodies:
//!
//! ```text
//! {"b": 2, "a": {"y": true, "x": [1, null]}}
//! a[x][]=1&a[x][]=&a[y]=1&b=2
//! ```
//!
//! Keys are sorted, objects become `key[sub]`, arrays `key[]`, booleans
//! `1`/`0` and null an empty value.

use super::error::EncodeError;
use super::resource::{ApiService, Method, Parameters};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// How parameters are written into a request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    #[default]
    Form,
    Json,
}

/// Where a request's parameters end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    Query,
    Body(BodyEncoding),
}

pub fn choose_encoding(
    method: Method,
    url_encoded: bool,
    body_encoding: BodyEncoding,
) -> ParameterEncoding {
    if method.encodes_in_query() || url_encoded {
        ParameterEncoding::Query
    } else {
        ParameterEncoding::Body(body_encoding)
    }
}

/// A fully built request, ready for a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl EncodedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn set_header_if_absent(&mut self, name: &str, value: impl Into<String>) {
        if self.header(name).is_none() {
            self.headers.push((name.to_string(), value.into()));
        }
    }
}

/// Resolve a service path against the base URL. Absolute URLs pass through.
pub fn resolve_url(base: &Url, path: &str) -> Result<Url, EncodeError> {
    base.join(path).map_err(|source| EncodeError::InvalidUrl {
        path: path.to_string(),
        source,
    })
}

/// Flatten `value` under `key` into `(name, value)` pairs.
pub fn query_components(key: &str, value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    push_components(key, value, &mut out);
    out
}

fn push_components(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (sub, v) in entries {
                push_components(&format!("{key}[{sub}]"), v, out);
            }
        }
        Value::Array(items) => {
            let name = format!("{key}[]");
            for v in items {
                push_components(&name, v, out);
            }
        }
        Value::Bool(b) => out.push((key.to_string(), if *b { "1" } else { "0" }.to_string())),
        Value::Null => out.push((key.to_string(), String::new())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::String(s) => out.push((key.to_string(), s.clone())),
    }
}

/// All pairs for a parameter map, top-level keys sorted.
pub fn flatten_parameters(parameters: &Parameters) -> Vec<(String, String)> {
    let mut keys: Vec<&String> = parameters.keys().collect();
    keys.sort();
    keys.into_iter()
        .flat_map(|k| query_components(k, &parameters[k.as_str()]))
        .collect()
}

/// Build the request for `service`.
///
/// Resource headers are copied as given; `Content-Type` is only set when the
/// resource didn't provide one.
pub fn build_request(
    base: &Url,
    service: &dyn ApiService,
    url_encoded: bool,
    body_encoding: BodyEncoding,
) -> Result<EncodedRequest, EncodeError> {
    let resource = service.resource();
    let url = resolve_url(base, service.path())?;
    let mut request = EncodedRequest::new(resource.method, url);

    if let Some(headers) = &resource.headers {
        for (name, value) in headers {
            request.set_header(name, value.clone());
        }
    }

    let Some(parameters) = resource.parameters.as_ref().filter(|p| !p.is_empty()) else {
        return Ok(request);
    };

    match choose_encoding(resource.method, url_encoded, body_encoding) {
        ParameterEncoding::Query => {
            let pairs = flatten_parameters(parameters);
            request.url.query_pairs_mut().extend_pairs(pairs);
        }
        ParameterEncoding::Body(BodyEncoding::Form) => {
            let body = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(flatten_parameters(parameters))
                .finish();
            request.set_header_if_absent("Content-Type", FORM_CONTENT_TYPE);
            request.body = Some(body.into_bytes());
        }
        ParameterEncoding::Body(BodyEncoding::Json) => {
            let body = serde_json::to_vec(parameters)?;
            request.set_header_if_absent("Content-Type", JSON_CONTENT_TYPE);
            request.body = Some(body);
        }
    }

    Ok(request)
}
