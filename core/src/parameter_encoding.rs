//! Encodings for untyped parameter dictionaries.
//!
//! These predate [`ParameterEncoder`](crate::encoder::ParameterEncoder) and
//! take a `serde_json` object instead of a `Serialize` value. Failures are
//! reported as [`Error::ParameterEncodingFailed`].

use serde_json::{Map, Value};
use tracing::trace;

use crate::encoder::{Destination, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::error::{Error, ParameterEncodingFailureReason, Result};
use crate::form::{append_query, UrlEncodedFormEncoder};
use crate::headers::Header;
use crate::method::HttpMethod;
use crate::request::Request;

pub type Parameters = Map<String, Value>;

pub trait ParameterEncoding {
    fn encode(&self, request: Request, parameters: Option<&Parameters>) -> Result<Request>;
}

/// Writes the parameters as a JSON body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonEncoding {
    pub pretty: bool,
}

impl JsonEncoding {
    pub fn pretty_printed() -> Self {
        Self { pretty: true }
    }
}

impl ParameterEncoding for JsonEncoding {
    fn encode(&self, mut request: Request, parameters: Option<&Parameters>) -> Result<Request> {
        let Some(parameters) = parameters else {
            return Ok(request);
        };

        let data = if self.pretty {
            serde_json::to_vec_pretty(parameters)
        } else {
            serde_json::to_vec(parameters)
        }
        .map_err(|error| {
            Error::from(ParameterEncodingFailureReason::JsonEncodingFailed {
                error: Box::new(error),
            })
        })?;

        if !request.headers.contains("Content-Type") {
            request.headers.update_header(Header::content_type(JSON_CONTENT_TYPE));
        }
        request.body = Some(data);
        Ok(request)
    }
}

/// Writes the parameters form-encoded, into the query string or the body.
///
/// An unrecognized method token is treated as GET.
#[derive(Debug, Clone, Default)]
pub struct UrlEncoding {
    pub destination: Destination,
    pub encoder: UrlEncodedFormEncoder,
}

impl UrlEncoding {
    pub fn query_string() -> Self {
        Self {
            destination: Destination::QueryString,
            ..Self::default()
        }
    }

    pub fn http_body() -> Self {
        Self {
            destination: Destination::HttpBody,
            ..Self::default()
        }
    }
}

impl ParameterEncoding for UrlEncoding {
    fn encode(&self, mut request: Request, parameters: Option<&Parameters>) -> Result<Request> {
        let Some(parameters) = parameters else {
            return Ok(request);
        };

        let method = request.method().unwrap_or(HttpMethod::Get);
        let query = self.encoder.encode_object(parameters);

        if self.destination.encodes_parameters_in_url(method) {
            let Some(url) = request.url.as_mut() else {
                return Err(ParameterEncodingFailureReason::MissingUrl.into());
            };
            trace!(%method, "dictionary parameters go to the query string");
            append_query(url, &query);
        } else {
            if !request.headers.contains("Content-Type") {
                request.headers.update_header(Header::content_type(FORM_CONTENT_TYPE));
            }
            request.body = Some(query.into_bytes());
        }
        Ok(request)
    }
}
