//! Typed parameter encoders.
//!
//! # Design
//! A [`ParameterEncoder`] takes a request by value, writes the encoded
//! parameters into it and returns it. The body encoder delegates
//! serialization to a [`StructuredEncoder`], so JSON formatting is
//! pluggable; the form encoder picks query string or body through its
//! [`Destination`]. Failures are wrapped once into
//! [`Error::ParameterEncoderFailed`] with the cause attached.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{BoxError, Error, ParameterEncoderFailureReason, RequiredComponent, Result};
use crate::form::{append_query, UrlEncodedFormEncoder};
use crate::headers::Header;
use crate::method::HttpMethod;
use crate::request::Request;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Serializes a typed value to bytes.
pub trait StructuredEncoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> std::result::Result<Vec<u8>, BoxError>;
}

/// `serde_json` output, compact or pretty-printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl StructuredEncoder for JsonEncoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> std::result::Result<Vec<u8>, BoxError> {
        let data = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(data)
    }
}

/// Writes typed parameters into a request.
pub trait ParameterEncoder {
    /// `None` parameters return the request untouched.
    fn encode<P: Serialize + ?Sized>(
        &self,
        parameters: Option<&P>,
        request: Request,
    ) -> Result<Request>;
}

fn encoder_failed(error: impl Into<BoxError>) -> Error {
    ParameterEncoderFailureReason::EncoderFailed {
        error: error.into(),
    }
    .into()
}

fn missing(component: RequiredComponent) -> Error {
    ParameterEncoderFailureReason::MissingRequiredComponent(component).into()
}

/// Encodes parameters as the request body.
///
/// Sets `Content-Type: application/json` unless the request already has a
/// content type.
#[derive(Debug, Clone, Default)]
pub struct JsonParameterEncoder<E = JsonEncoder> {
    pub encoder: E,
}

impl JsonParameterEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty_printed() -> Self {
        Self::with_encoder(JsonEncoder::pretty())
    }
}

impl<E: StructuredEncoder> JsonParameterEncoder<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }
}

impl<E: StructuredEncoder> ParameterEncoder for JsonParameterEncoder<E> {
    fn encode<P: Serialize + ?Sized>(
        &self,
        parameters: Option<&P>,
        mut request: Request,
    ) -> Result<Request> {
        let Some(parameters) = parameters else {
            return Ok(request);
        };

        let data = self.encoder.encode(parameters).map_err(encoder_failed)?;
        trace!(bytes = data.len(), "encoded request body");
        request.body = Some(data);

        if !request.headers.contains("Content-Type") {
            request.headers.update_header(Header::content_type(JSON_CONTENT_TYPE));
        }
        Ok(request)
    }
}

/// Where form-encoded parameters go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Query string for GET, HEAD and DELETE, body otherwise.
    #[default]
    MethodDependent,
    QueryString,
    HttpBody,
}

impl Destination {
    pub fn encodes_parameters_in_url(&self, method: HttpMethod) -> bool {
        match self {
            Destination::MethodDependent => matches!(
                method,
                HttpMethod::Get | HttpMethod::Head | HttpMethod::Delete
            ),
            Destination::QueryString => true,
            Destination::HttpBody => false,
        }
    }
}

/// Encodes parameters as `application/x-www-form-urlencoded`, into the
/// query string or the body depending on [`Destination`].
///
/// The request must carry a URL and a recognized method.
#[derive(Debug, Clone, Default)]
pub struct UrlEncodedFormParameterEncoder {
    pub encoder: UrlEncodedFormEncoder,
    pub destination: Destination,
}

impl UrlEncodedFormParameterEncoder {
    pub fn new(encoder: UrlEncodedFormEncoder, destination: Destination) -> Self {
        Self {
            encoder,
            destination,
        }
    }

    pub fn with_destination(destination: Destination) -> Self {
        Self::new(UrlEncodedFormEncoder::default(), destination)
    }
}

impl ParameterEncoder for UrlEncodedFormParameterEncoder {
    fn encode<P: Serialize + ?Sized>(
        &self,
        parameters: Option<&P>,
        mut request: Request,
    ) -> Result<Request> {
        let Some(parameters) = parameters else {
            return Ok(request);
        };

        if request.url.is_none() {
            return Err(missing(RequiredComponent::Url));
        }
        let Some(method) = request.method() else {
            return Err(missing(RequiredComponent::HttpMethod {
                raw_value: request.http_method.clone(),
            }));
        };

        let query = self.encoder.encode(parameters).map_err(encoder_failed)?;

        if self.destination.encodes_parameters_in_url(method) {
            trace!(%method, "form parameters go to the query string");
            if let Some(url) = request.url.as_mut() {
                append_query(url, &query);
            }
        } else {
            trace!(%method, "form parameters go to the body");
            if !request.headers.contains("Content-Type") {
                request.headers.update_header(Header::content_type(FORM_CONTENT_TYPE));
            }
            request.body = Some(query.into_bytes());
        }
        Ok(request)
    }
}
