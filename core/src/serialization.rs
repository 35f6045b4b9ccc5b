//! Turning a response body into bytes, text or a typed value.
//!
//! # Design
//! An empty body is only acceptable for a HEAD request or a 204/205
//! status. For those, typed decoding tries to build the target from JSON
//! `null`, so `()` and `Option<T>` succeed while a struct reports
//! [`InvalidEmptyResponse`](ResponseSerializationFailureReason::InvalidEmptyResponse).
//! Any other empty body is an input error.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ResponseSerializationFailureReason};
use crate::method::HttpMethod;
use crate::request::Request;
use crate::response::Response;

pub const EMPTY_RESPONSE_CODES: [u16; 2] = [204, 205];

/// Text encodings understood by [`decode_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Ascii,
    IsoLatin1,
    /// Byte order taken from a leading BOM, big-endian without one.
    Utf16,
    Utf16Le,
    Utf16Be,
}

impl StringEncoding {
    /// Map an IANA charset name, as found in `Content-Type`.
    pub fn from_charset(name: &str) -> Option<Self> {
        match name.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(StringEncoding::Utf8),
            "us-ascii" | "ascii" => Some(StringEncoding::Ascii),
            "iso-8859-1" | "latin1" | "iso_8859-1" => Some(StringEncoding::IsoLatin1),
            "utf-16le" => Some(StringEncoding::Utf16Le),
            "utf-16" => Some(StringEncoding::Utf16),
            "utf-16be" => Some(StringEncoding::Utf16Be),
            _ => None,
        }
    }

    pub fn decode(&self, data: &[u8]) -> Option<String> {
        match self {
            StringEncoding::Utf8 => String::from_utf8(data.to_vec()).ok(),
            StringEncoding::Ascii => data
                .is_ascii()
                .then(|| data.iter().map(|&b| char::from(b)).collect()),
            StringEncoding::IsoLatin1 => Some(data.iter().map(|&b| char::from(b)).collect()),
            StringEncoding::Utf16 => match data {
                [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
                [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
                _ => utf16(data, u16::from_be_bytes),
            },
            StringEncoding::Utf16Le => utf16(data, u16::from_le_bytes),
            StringEncoding::Utf16Be => utf16(data, u16::from_be_bytes),
        }
    }
}

fn utf16(data: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = data.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).ok()
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringEncoding::Utf8 => "utf-8",
            StringEncoding::Ascii => "us-ascii",
            StringEncoding::IsoLatin1 => "iso-8859-1",
            StringEncoding::Utf16 => "utf-16",
            StringEncoding::Utf16Le => "utf-16le",
            StringEncoding::Utf16Be => "utf-16be",
        };
        f.write_str(name)
    }
}

/// The `charset` parameter of a `Content-Type` value, if any.
pub fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim().eq_ignore_ascii_case("charset").then(|| value.trim())
    })
}

fn allows_empty_body(request: Option<&Request>, response: &Response) -> bool {
    EMPTY_RESPONSE_CODES.contains(&response.status)
        || request.and_then(Request::method) == Some(HttpMethod::Head)
}

/// The raw body. Empty is an error unless the exchange allows it.
pub fn decode_data(request: Option<&Request>, response: &Response) -> Result<Vec<u8>> {
    if response.body.is_empty() && !allows_empty_body(request, response) {
        return Err(ResponseSerializationFailureReason::InputDataNilOrZeroLength.into());
    }
    Ok(response.body.clone())
}

/// The body as text.
///
/// `encoding` overrides the `Content-Type` charset; without either, UTF-8
/// is assumed.
pub fn decode_string(
    request: Option<&Request>,
    response: &Response,
    encoding: Option<StringEncoding>,
) -> Result<String> {
    let data = decode_data(request, response)?;
    if data.is_empty() {
        return Ok(String::new());
    }

    let encoding = encoding
        .or_else(|| {
            response
                .content_type()
                .and_then(charset)
                .and_then(StringEncoding::from_charset)
        })
        .unwrap_or(StringEncoding::Utf8);

    encoding.decode(&data).ok_or_else(|| {
        ResponseSerializationFailureReason::StringSerializationFailed { encoding }.into()
    })
}

/// The body as JSON, decoded into `T`.
pub fn decode_json<T: DeserializeOwned>(
    request: Option<&Request>,
    response: &Response,
) -> Result<T> {
    let data = decode_data(request, response)?;

    if data.is_empty() {
        debug!(status = response.status, "decoding empty response body");
        return serde_json::from_value(Value::Null).map_err(|_| {
            ResponseSerializationFailureReason::InvalidEmptyResponse {
                type_name: std::any::type_name::<T>().to_string(),
            }
            .into()
        });
    }

    serde_json::from_slice(&data).map_err(|error| {
        ResponseSerializationFailureReason::DecodingFailed {
            error: Box::new(error),
        }
        .into()
    })
}
