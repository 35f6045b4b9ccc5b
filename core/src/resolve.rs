//! Conversion of URL-like and request-like inputs.
//!
//! # Design
//! Call sites accept anything implementing [`UrlConvertible`]: a literal
//! string, a parsed [`Url`], or a [`UrlComponents`] value. Conversion is
//! pure and fails only with [`Error::InvalidUrl`], which carries the input
//! as the caller wrote it.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::request::Request;

/// A value that can be resolved into an absolute URL.
pub trait UrlConvertible {
    fn as_url(&self) -> Result<Url>;
}

impl UrlConvertible for str {
    fn as_url(&self) -> Result<Url> {
        Url::parse(self).map_err(|_| Error::InvalidUrl {
            url: self.to_string(),
        })
    }
}

impl UrlConvertible for String {
    fn as_url(&self) -> Result<Url> {
        self.as_str().as_url()
    }
}

impl UrlConvertible for Url {
    fn as_url(&self) -> Result<Url> {
        Ok(self.clone())
    }
}

impl<T: UrlConvertible + ?Sized> UrlConvertible for &T {
    fn as_url(&self) -> Result<Url> {
        (**self).as_url()
    }
}

/// A URL given as separate parts.
///
/// `scheme` and `host` are required. `path` is used as written; a missing
/// leading `/` is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlComponents {
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl UrlComponents {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            host: Some(host.into()),
            ..Self::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.user = Some(user.into());
        self.password = password;
        self
    }
}

impl fmt::Display for UrlComponents {
    /// Renders the parts in URL order whether or not they form a valid URL.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        let has_credentials = self.user.is_some() || self.password.is_some();
        if self.host.is_some() || has_credentials {
            f.write_str("//")?;
        }
        if has_credentials {
            f.write_str(self.user.as_deref().unwrap_or_default())?;
            if let Some(password) = &self.password {
                write!(f, ":{password}")?;
            }
            f.write_str("@")?;
        }
        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if !self.path.is_empty() && !self.path.starts_with('/') && self.host.is_some() {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl UrlConvertible for UrlComponents {
    /// Only `scheme://host[:port]` goes through the parser. The other parts
    /// are applied one by one, so a `?` or `#` inside the path or query is
    /// escaped rather than starting a new component.
    fn as_url(&self) -> Result<Url> {
        let invalid = || Error::InvalidUrl {
            url: self.to_string(),
        };

        let (Some(scheme), Some(host)) = (non_empty(&self.scheme), non_empty(&self.host)) else {
            return Err(invalid());
        };
        if host.contains(['/', '?', '#', '@']) {
            return Err(invalid());
        }

        let authority = match self.port {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        };
        let mut url = Url::parse(&authority).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }

        if self.user.is_some() || self.password.is_some() {
            url.set_username(self.user.as_deref().unwrap_or_default())
                .map_err(|_| invalid())?;
            url.set_password(self.password.as_deref()).map_err(|_| invalid())?;
        }
        if !self.path.is_empty() {
            url.set_path(&self.path);
        }
        url.set_query(self.query.as_deref());
        url.set_fragment(self.fragment.as_deref());
        Ok(url)
    }
}

fn non_empty(part: &Option<String>) -> Option<&str> {
    part.as_deref().filter(|s| !s.is_empty())
}

/// A value that can produce a request skeleton.
pub trait RequestConvertible {
    fn as_request(&self) -> Result<Request>;

    /// The request, or `None` if conversion fails.
    fn request(&self) -> Option<Request> {
        self.as_request().ok()
    }
}

impl RequestConvertible for Request {
    fn as_request(&self) -> Result<Request> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_resolves() {
        let url = "https://example.com/search?q=1".as_url().unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.query(), Some("q=1"));
    }

    #[test]
    fn malformed_string_keeps_the_exact_input() {
        for input in ["", "not a url", "/relative/path", "http://exa mple.com"] {
            let err = input.as_url().unwrap_err();
            assert!(err.is_invalid_url_error());
            assert_eq!(err.url_input(), Some(input));
        }
    }

    #[test]
    fn parsed_url_passes_through() {
        let url = Url::parse("https://example.com/a").unwrap();
        assert_eq!(url.as_url().unwrap(), url);
    }

    #[test]
    fn components_build_a_url() {
        let components = UrlComponents::new("https", "api.example.com")
            .port(8443)
            .path("v1/items")
            .query("page=2");
        let url = components.as_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com:8443/v1/items?page=2");
    }

    #[test]
    fn components_without_host_are_invalid() {
        let components = UrlComponents {
            scheme: Some("https".into()),
            path: "/items".into(),
            ..UrlComponents::default()
        };
        let err = components.as_url().unwrap_err();
        assert!(err.is_invalid_url_error());
        assert_eq!(err.url_input(), Some("https:/items"));
    }

    #[test]
    fn components_with_malformed_host_are_invalid() {
        let components = UrlComponents::new("http", "exa mple.com");
        let err = components.as_url().unwrap_err();
        assert_eq!(err.url_input(), Some("http://exa mple.com"));
    }

    #[test]
    fn reserved_characters_stay_in_their_component() {
        let url = UrlComponents::new("https", "example.com")
            .path("/files/a?b#c")
            .as_url()
            .unwrap();
        assert_eq!(url.path(), "/files/a%3Fb%23c");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = UrlComponents::new("https", "example.com")
            .path("/search")
            .query("q=a#b")
            .fragment("top")
            .as_url()
            .unwrap();
        assert_eq!(url.path(), "/search");
        assert_eq!(url.query(), Some("q=a%23b"));
        assert_eq!(url.fragment(), Some("top"));
    }

    #[test]
    fn credentials_are_applied() {
        let url = UrlComponents::new("https", "example.com")
            .credentials("ann", Some("s3cret".into()))
            .as_url()
            .unwrap();
        assert_eq!(url.username(), "ann");
        assert_eq!(url.password(), Some("s3cret"));

        let password_only = UrlComponents {
            password: Some("s3cret".into()),
            ..UrlComponents::new("https", "example.com")
        };
        let url = password_only.as_url().unwrap();
        assert_eq!(url.username(), "");
        assert_eq!(url.password(), Some("s3cret"));
    }

    #[test]
    fn host_with_path_characters_is_invalid() {
        let err = UrlComponents::new("https", "example.com/evil").as_url().unwrap_err();
        assert_eq!(err.url_input(), Some("https://example.com/evil"));
    }

    #[test]
    fn request_passes_through() {
        let request = Request::get("https://example.com").unwrap();
        let converted = request.as_request().unwrap();
        assert_eq!(converted, request);
        assert_eq!(request.request(), Some(request.clone()));
    }
}
