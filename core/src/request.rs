//! The request skeleton handed from construction to the transport.
//!
//! # Design
//! `Request` is plain owned data, like the response the host hands back.
//! Every construction step takes it by value and returns the updated value;
//! a caller that wants to keep the original clones it first. No step
//! holds on to a request after returning it.

use url::Url;

use crate::error::Result;
use crate::headers::Headers;
use crate::method::HttpMethod;
use crate::resolve::UrlConvertible;

/// An HTTP request described as plain data.
///
/// `http_method` is the raw method token. Use [`Request::method`] for the
/// parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Option<Url>,
    pub http_method: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: None,
            http_method: HttpMethod::Get.as_str().to_string(),
            headers: Headers::new(),
            body: None,
        }
    }
}

impl Request {
    /// Resolve `url` and build a skeleton with `method` and the caller's
    /// headers. No default headers are added.
    pub fn new(
        url: impl UrlConvertible,
        method: HttpMethod,
        headers: Option<Headers>,
    ) -> Result<Self> {
        Ok(Self {
            url: Some(url.as_url()?),
            http_method: method.as_str().to_string(),
            headers: headers.unwrap_or_default(),
            body: None,
        })
    }

    pub fn get(url: impl UrlConvertible) -> Result<Self> {
        Self::new(url, HttpMethod::Get, None)
    }

    pub fn post(url: impl UrlConvertible) -> Result<Self> {
        Self::new(url, HttpMethod::Post, None)
    }

    /// The parsed method, or `None` for an unrecognized token.
    pub fn method(&self) -> Option<HttpMethod> {
        self.http_method.parse().ok()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.update(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}
