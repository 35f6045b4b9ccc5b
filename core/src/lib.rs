//! Request construction core for HTTP clients.
//!
//! # Overview
//! Builds `Request` values (URL, method, headers, encoded parameters) and
//! checks and decodes `Response` values without touching the network
//! (host-does-IO pattern). The caller executes the actual HTTP round-trip.
//!
//! # Design
//! - `Headers` keeps one entry per case-insensitive name, in insertion order.
//! - `Request` is passed by value through every construction step, so a
//!   step never mutates a request someone else still holds.
//! - All failures are `error::Error`, a two-level taxonomy: a top-level
//!   category plus a reason enum, with the lower-layer cause attached.
//! - Encoders are stateless once configured and can be shared freely.

pub mod config;
pub mod defaults;
pub mod encoder;
pub mod error;
pub mod form;
pub mod headers;
pub mod method;
pub mod parameter_encoding;
pub mod request;
pub mod resolve;
pub mod response;
pub mod serialization;
pub mod trust;
pub mod validation;

pub use config::EncodingConfig;
pub use encoder::{
    Destination, JsonEncoder, JsonParameterEncoder, ParameterEncoder,
    UrlEncodedFormParameterEncoder,
};
pub use error::{Error, Result};
pub use form::UrlEncodedFormEncoder;
pub use headers::{Header, Headers};
pub use method::HttpMethod;
pub use parameter_encoding::{JsonEncoding, ParameterEncoding, Parameters, UrlEncoding};
pub use request::Request;
pub use resolve::{RequestConvertible, UrlComponents, UrlConvertible};
pub use response::Response;
pub use serialization::StringEncoding;
