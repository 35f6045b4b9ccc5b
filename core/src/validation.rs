//! Response checks run after the host executes a request.
//!
//! Failures are reported as
//! [`Error::ResponseValidationFailed`](crate::error::Error::ResponseValidationFailed)
//! so they sit next to encoding and serialization errors in the same
//! taxonomy.

use std::ops::{Range, RangeInclusive};

use tracing::debug;

use crate::error::{Result, ResponseValidationFailureReason};
use crate::request::Request;
use crate::response::Response;

/// A set of status codes a response may carry.
pub trait AcceptableStatus {
    fn accepts(&self, code: u16) -> bool;
}

impl AcceptableStatus for Range<u16> {
    fn accepts(&self, code: u16) -> bool {
        self.contains(&code)
    }
}

impl AcceptableStatus for RangeInclusive<u16> {
    fn accepts(&self, code: u16) -> bool {
        self.contains(&code)
    }
}

impl AcceptableStatus for [u16] {
    fn accepts(&self, code: u16) -> bool {
        self.contains(&code)
    }
}

impl<const N: usize> AcceptableStatus for [u16; N] {
    fn accepts(&self, code: u16) -> bool {
        self.contains(&code)
    }
}

impl<T: AcceptableStatus + ?Sized> AcceptableStatus for &T {
    fn accepts(&self, code: u16) -> bool {
        (**self).accepts(code)
    }
}

pub fn validate_status(response: &Response, acceptable: impl AcceptableStatus) -> Result<()> {
    if acceptable.accepts(response.status) {
        return Ok(());
    }
    debug!(status = response.status, "unacceptable status code");
    Err(ResponseValidationFailureReason::UnacceptableStatusCode {
        code: response.status,
    }
    .into())
}

/// A `type/subtype` pair with parameters stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MimeType {
    kind: String,
    subtype: String,
}

impl MimeType {
    fn parse(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        })
    }

    fn matches(&self, other: &MimeType) -> bool {
        let part = |a: &str, b: &str| a == "*" || b == "*" || a == b;
        part(&self.kind, &other.kind) && part(&self.subtype, &other.subtype)
    }

    fn is_wildcard(&self) -> bool {
        self.kind == "*" && self.subtype == "*"
    }
}

/// Check the response `Content-Type` against `acceptable`.
///
/// An empty body passes. A response without a parseable content type only
/// passes when `*/*` is acceptable.
pub fn validate_content_type<S: AsRef<str>>(response: &Response, acceptable: &[S]) -> Result<()> {
    if response.body.is_empty() {
        return Ok(());
    }

    let acceptable_names = || acceptable.iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>();
    let acceptable_types: Vec<MimeType> = acceptable
        .iter()
        .filter_map(|s| MimeType::parse(s.as_ref()))
        .collect();

    let Some(response_type) = response.content_type().and_then(MimeType::parse) else {
        if acceptable_types.iter().any(MimeType::is_wildcard) {
            return Ok(());
        }
        return Err(ResponseValidationFailureReason::MissingContentType {
            acceptable: acceptable_names(),
        }
        .into());
    };

    if acceptable_types.iter().any(|t| t.matches(&response_type)) {
        return Ok(());
    }

    let response_content_type = response.content_type().unwrap_or_default().to_string();
    debug!(%response_content_type, "unacceptable content type");
    Err(ResponseValidationFailureReason::UnacceptableContentType {
        acceptable: acceptable_names(),
        response_content_type,
    }
    .into())
}

/// The default validation: a 2xx status and a content type matching the
/// request's `Accept` header (`*/*` when it has none).
pub fn validate(request: &Request, response: &Response) -> Result<()> {
    validate_status(response, 200..300)?;

    let accept: Vec<&str> = match request.headers.value("Accept") {
        Some(value) => value.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
        None => vec!["*/*"],
    };
    validate_content_type(response, &accept)
}

impl Response {
    /// Shorthand for [`validate`] that hands the response back on success.
    pub fn validated(self, request: &Request) -> Result<Self> {
        validate(request, &self)?;
        Ok(self)
    }
}
