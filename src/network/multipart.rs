//! Multipart upload bodies.
//!
//! The body layout is fixed: the image part first, then one plain part per
//! parameter, then the closing boundary. Every part is introduced by
//! `\r\n--<boundary>\r\n`.
//!
//! ```text
//! \r\n--myRandomBoundary12345\r\n
//! Content-Disposition: form-data; name="image"; filename="file.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <bytes>
//! \r\n--myRandomBoundary12345\r\n
//! Content-Disposition: form-data; name="name"\r\n
//! \r\n
//! Alice
//! \r\n--myRandomBoundary12345--\r\n
//! ```

use super::encoding::{EncodedRequest, resolve_url};
use super::error::EncodeError;
use super::resource::{ApiService, Parameters};
use serde_json::Value;
use url::Url;

pub const BOUNDARY: &str = "myRandomBoundary12345";

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Text written for a parameter value. Strings are written without quotes.
pub fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Field name as written inside `name="..."`. Quotes and line breaks are
/// percent-escaped the way browsers do, so a key can't break the part headers.
pub fn escape_field_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn multipart_body(file_bytes: &[u8], parameters: Option<&Parameters>) -> Vec<u8> {
    let mut body = Vec::with_capacity(file_bytes.len() + 256);

    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"file.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(file_bytes);

    for (key, value) in parameters.into_iter().flatten() {
        body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                escape_field_name(key),
                form_value(value)
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build an upload request for `service` carrying `file_bytes` as a PNG.
///
/// The method comes from the resource. Resource headers are copied, except
/// that `Content-Type` is always the multipart type.
pub fn build_multipart_upload(
    base: &Url,
    service: &dyn ApiService,
    file_bytes: &[u8],
) -> Result<EncodedRequest, EncodeError> {
    let resource = service.resource();
    let url = resolve_url(base, service.path())?;
    let mut request = EncodedRequest::new(resource.method, url);

    if let Some(headers) = &resource.headers {
        for (name, value) in headers {
            request.set_header(name, value.clone());
        }
    }
    request.set_header("Content-Type", content_type());
    request.body = Some(multipart_body(
        file_bytes,
        resource.parameters.as_ref(),
    ));
    Ok(request)
}
