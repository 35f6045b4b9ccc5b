//! Error taxonomy for request construction and response handling.
//!
//! # Design
//! `Error` is a closed two-level tree: top-level variants name the stage
//! that failed, and the stages with several failure modes nest a reason
//! enum. Causes from lower layers are kept as `BoxError` and surface both
//! through `underlying_error()` and the standard `source()` chain.
//!
//! Every leaf carries a `#[error]` message, so a variant added without a
//! description does not compile. `underlying_error()` matches without a
//! wildcard arm so a new cause-carrying leaf cannot be missed either.

use url::Url;

use crate::serialization::StringEncoding;
use crate::trust::{Certificate, PublicKey, ServerTrust, TrustOutput};

/// Type-erased cause from a lower layer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Borrowed form of [`BoxError`] returned by the accessors.
pub type DynError = dyn std::error::Error + Send + Sync + 'static;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the library can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The owning session was dropped while work was still attached to it.
    #[error(
        "Session was invalidated without error, so it was likely dropped unexpectedly. \
         Keep a reference to the session for the duration of its requests."
    )]
    SessionDeinitialized,

    #[error("Session was invalidated with error: {}", describe_optional(.error))]
    SessionInvalidated {
        #[source]
        error: Option<BoxError>,
    },

    #[error("Request explicitly cancelled.")]
    ExplicitlyCancelled,

    /// `url` is the offending input exactly as given.
    #[error("URL is not valid: {url}")]
    InvalidUrl { url: String },

    #[error(transparent)]
    ParameterEncodingFailed(ParameterEncodingFailureReason),

    #[error(transparent)]
    ParameterEncoderFailed(ParameterEncoderFailureReason),

    #[error(transparent)]
    MultipartEncodingFailed(MultipartEncodingFailureReason),

    #[error("Request adaptation failed with error: {error}")]
    RequestAdaptationFailed {
        #[source]
        error: BoxError,
    },

    #[error(transparent)]
    ResponseValidationFailed(ResponseValidationFailureReason),

    #[error(transparent)]
    ResponseSerializationFailed(ResponseSerializationFailureReason),

    #[error(transparent)]
    ServerTrustEvaluationFailed(ServerTrustFailureReason),

    #[error("Request retry failed with retry error: {retry_error}, original error: {original_error}")]
    RequestRetryFailed {
        #[source]
        retry_error: BoxError,
        original_error: BoxError,
    },
}

fn describe_optional(error: &Option<BoxError>) -> String {
    match error {
        Some(error) => error.to_string(),
        None => "No description.".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParameterEncodingFailureReason {
    #[error("URL request to encode was missing a URL")]
    MissingUrl,

    #[error("JSON could not be encoded because of error:\n{error}")]
    JsonEncodingFailed {
        #[source]
        error: BoxError,
    },
}

/// Request part an encoder needed but could not find.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequiredComponent {
    #[error("URL")]
    Url,

    /// The request's method token did not name a known method.
    #[error("HTTP method {raw_value:?}")]
    HttpMethod { raw_value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ParameterEncoderFailureReason {
    #[error("Encoding failed due to a missing request component: {0}")]
    MissingRequiredComponent(RequiredComponent),

    #[error("The underlying encoder failed with the error: {error}")]
    EncoderFailed {
        #[source]
        error: BoxError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartEncodingFailureReason {
    #[error("The URL provided is not a file URL: {url}")]
    BodyPartUrlInvalid { url: Url },

    #[error("The URL provided does not have a valid filename: {url}")]
    BodyPartFilenameInvalid { url: Url },

    #[error("The URL provided is not reachable: {url}")]
    BodyPartFileNotReachable { url: Url },

    #[error(
        "The system returned an error while checking the provided URL for reachability.\n\
         URL: {url}\nError: {error}"
    )]
    BodyPartFileNotReachableWithError {
        url: Url,
        #[source]
        error: BoxError,
    },

    #[error("The URL provided is a directory: {url}")]
    BodyPartFileIsDirectory { url: Url },

    #[error("Could not fetch the file size from the provided URL: {url}")]
    BodyPartFileSizeNotAvailable { url: Url },

    #[error(
        "The system returned an error while attempting to fetch the file size from the \
         provided URL.\nURL: {url}\nError: {error}"
    )]
    BodyPartFileSizeQueryFailedWithError {
        url: Url,
        #[source]
        error: BoxError,
    },

    #[error("Failed to create an input stream for the provided URL: {url}")]
    BodyPartInputStreamCreationFailed { url: Url },

    #[error("Failed to create an output stream for URL: {url}")]
    OutputStreamCreationFailed { url: Url },

    #[error("A file already exists at the provided URL: {url}")]
    OutputStreamFileAlreadyExists { url: Url },

    #[error("The provided output stream URL is invalid: {url}")]
    OutputStreamUrlInvalid { url: Url },

    #[error("Output stream write failed with error: {error}")]
    OutputStreamWriteFailed {
        #[source]
        error: BoxError,
    },

    #[error("Input stream read failed with error: {error}")]
    InputStreamReadFailed {
        #[source]
        error: BoxError,
    },
}

impl MultipartEncodingFailureReason {
    pub fn url(&self) -> Option<&Url> {
        use MultipartEncodingFailureReason::*;
        match self {
            BodyPartUrlInvalid { url }
            | BodyPartFilenameInvalid { url }
            | BodyPartFileNotReachable { url }
            | BodyPartFileNotReachableWithError { url, .. }
            | BodyPartFileIsDirectory { url }
            | BodyPartFileSizeNotAvailable { url }
            | BodyPartFileSizeQueryFailedWithError { url, .. }
            | BodyPartInputStreamCreationFailed { url }
            | OutputStreamCreationFailed { url }
            | OutputStreamFileAlreadyExists { url }
            | OutputStreamUrlInvalid { url } => Some(url),
            OutputStreamWriteFailed { .. } | InputStreamReadFailed { .. } => None,
        }
    }

    pub fn underlying_error(&self) -> Option<&DynError> {
        use MultipartEncodingFailureReason::*;
        match self {
            BodyPartFileNotReachableWithError { error, .. }
            | BodyPartFileSizeQueryFailedWithError { error, .. }
            | OutputStreamWriteFailed { error }
            | InputStreamReadFailed { error } => Some(error.as_ref()),
            BodyPartUrlInvalid { .. }
            | BodyPartFilenameInvalid { .. }
            | BodyPartFileNotReachable { .. }
            | BodyPartFileIsDirectory { .. }
            | BodyPartFileSizeNotAvailable { .. }
            | BodyPartInputStreamCreationFailed { .. }
            | OutputStreamCreationFailed { .. }
            | OutputStreamFileAlreadyExists { .. }
            | OutputStreamUrlInvalid { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseValidationFailureReason {
    #[error("Response could not be validated because data file was nil.")]
    DataFileNil,

    #[error("Response could not be validated because data file could not be read: {url}.")]
    DataFileReadFailed { url: Url },

    #[error(
        "Response Content-Type was missing and acceptable content types ({}) do not match \"*/*\".",
        .acceptable.join(",")
    )]
    MissingContentType { acceptable: Vec<String> },

    #[error(
        "Response Content-Type \"{response_content_type}\" does not match any acceptable types: {}.",
        .acceptable.join(",")
    )]
    UnacceptableContentType {
        acceptable: Vec<String>,
        response_content_type: String,
    },

    #[error("Response status code was unacceptable: {code}.")]
    UnacceptableStatusCode { code: u16 },
}

impl ResponseValidationFailureReason {
    pub fn acceptable_content_types(&self) -> Option<&[String]> {
        match self {
            ResponseValidationFailureReason::MissingContentType { acceptable }
            | ResponseValidationFailureReason::UnacceptableContentType { acceptable, .. } => {
                Some(acceptable)
            }
            ResponseValidationFailureReason::DataFileNil
            | ResponseValidationFailureReason::DataFileReadFailed { .. }
            | ResponseValidationFailureReason::UnacceptableStatusCode { .. } => None,
        }
    }

    pub fn response_content_type(&self) -> Option<&str> {
        match self {
            ResponseValidationFailureReason::UnacceptableContentType {
                response_content_type,
                ..
            } => Some(response_content_type),
            _ => None,
        }
    }

    pub fn response_code(&self) -> Option<u16> {
        match self {
            ResponseValidationFailureReason::UnacceptableStatusCode { code } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseSerializationFailureReason {
    #[error("Response could not be serialized, input data was nil or zero length.")]
    InputDataNilOrZeroLength,

    #[error("Response could not be serialized, input file was nil.")]
    InputFileNil,

    #[error("Response could not be serialized, input file could not be read: {url}.")]
    InputFileReadFailed { url: Url },

    #[error("String could not be serialized with encoding: {encoding}.")]
    StringSerializationFailed { encoding: StringEncoding },

    #[error("JSON could not be serialized because of error:\n{error}")]
    JsonSerializationFailed {
        #[source]
        error: BoxError,
    },

    #[error("Response could not be decoded because of error:\n{error}")]
    DecodingFailed {
        #[source]
        error: BoxError,
    },

    #[error(
        "Empty response could not be serialized to type: {type_name}. \
         Use a type that accepts an empty body for such responses."
    )]
    InvalidEmptyResponse { type_name: String },

    #[error("Response serializer was added after the request had already finished.")]
    ResponseSerializerAddedAfterRequestFinished,
}

impl ResponseSerializationFailureReason {
    pub fn failed_string_encoding(&self) -> Option<StringEncoding> {
        match self {
            ResponseSerializationFailureReason::StringSerializationFailed { encoding } => {
                Some(*encoding)
            }
            _ => None,
        }
    }

    pub fn underlying_error(&self) -> Option<&DynError> {
        use ResponseSerializationFailureReason::*;
        match self {
            JsonSerializationFailed { error } | DecodingFailed { error } => Some(error.as_ref()),
            InputDataNilOrZeroLength
            | InputFileNil
            | InputFileReadFailed { .. }
            | StringSerializationFailed { .. }
            | InvalidEmptyResponse { .. }
            | ResponseSerializerAddedAfterRequestFinished => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerTrustFailureReason {
    #[error("A trust evaluator is required for host {host} but none was found.")]
    NoRequiredEvaluator { host: String },

    #[error("No certificates were found or provided for evaluation.")]
    NoCertificatesFound,

    #[error("No public keys were found or provided for evaluation.")]
    NoPublicKeysFound,

    #[error("Applying the trust policy {policy} failed with status {status}.")]
    PolicyApplicationFailed {
        trust: ServerTrust,
        policy: String,
        status: i32,
    },

    #[error(
        "Setting {} certificate(s) as anchor certificates failed with status {status}.",
        .certificates.len()
    )]
    SettingAnchorCertificatesFailed {
        status: i32,
        certificates: Vec<Certificate>,
    },

    #[error("Attempting to create a revocation policy failed.")]
    RevocationPolicyCreationFailed,

    #[error(
        "Default evaluation failed for host {} (status {}, result: {}).",
        .output.host, .output.status, .output.result
    )]
    DefaultEvaluationFailed { output: TrustOutput },

    #[error(
        "Host validation failed for host {} (status {}, result: {}).",
        .output.host, .output.status, .output.result
    )]
    HostValidationFailed { output: TrustOutput },

    #[error("Certificate pinning failed for host {host}.")]
    CertificatePinningFailed {
        host: String,
        trust: ServerTrust,
        pinned_certificates: Vec<Certificate>,
        server_certificates: Vec<Certificate>,
    },

    #[error("Public key pinning failed for host {host}.")]
    PublicKeyPinningFailed {
        host: String,
        trust: ServerTrust,
        pinned_keys: Vec<PublicKey>,
        server_keys: Vec<PublicKey>,
    },
}

impl ServerTrustFailureReason {
    pub fn output(&self) -> Option<&TrustOutput> {
        match self {
            ServerTrustFailureReason::DefaultEvaluationFailed { output }
            | ServerTrustFailureReason::HostValidationFailed { output } => Some(output),
            _ => None,
        }
    }
}

impl ParameterEncodingFailureReason {
    pub fn underlying_error(&self) -> Option<&DynError> {
        match self {
            ParameterEncodingFailureReason::MissingUrl => None,
            ParameterEncodingFailureReason::JsonEncodingFailed { error } => Some(error.as_ref()),
        }
    }
}

impl ParameterEncoderFailureReason {
    pub fn underlying_error(&self) -> Option<&DynError> {
        match self {
            ParameterEncoderFailureReason::MissingRequiredComponent(_) => None,
            ParameterEncoderFailureReason::EncoderFailed { error } => Some(error.as_ref()),
        }
    }
}

impl Error {
    /// Recover a taxonomy value from a type-erased error.
    pub fn from_dyn<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a Error> {
        error.downcast_ref::<Error>()
    }

    pub fn is_session_deinitialized_error(&self) -> bool {
        matches!(self, Error::SessionDeinitialized)
    }

    pub fn is_session_invalidated_error(&self) -> bool {
        matches!(self, Error::SessionInvalidated { .. })
    }

    pub fn is_explicitly_cancelled_error(&self) -> bool {
        matches!(self, Error::ExplicitlyCancelled)
    }

    pub fn is_invalid_url_error(&self) -> bool {
        matches!(self, Error::InvalidUrl { .. })
    }

    pub fn is_parameter_encoding_error(&self) -> bool {
        matches!(self, Error::ParameterEncodingFailed(_))
    }

    pub fn is_parameter_encoder_error(&self) -> bool {
        matches!(self, Error::ParameterEncoderFailed(_))
    }

    pub fn is_multipart_encoding_error(&self) -> bool {
        matches!(self, Error::MultipartEncodingFailed(_))
    }

    pub fn is_request_adaptation_error(&self) -> bool {
        matches!(self, Error::RequestAdaptationFailed { .. })
    }

    pub fn is_response_validation_error(&self) -> bool {
        matches!(self, Error::ResponseValidationFailed(_))
    }

    pub fn is_response_serialization_error(&self) -> bool {
        matches!(self, Error::ResponseSerializationFailed(_))
    }

    pub fn is_server_trust_evaluation_error(&self) -> bool {
        matches!(self, Error::ServerTrustEvaluationFailed(_))
    }

    pub fn is_request_retry_error(&self) -> bool {
        matches!(self, Error::RequestRetryFailed { .. })
    }

    /// The lower-layer error this failure wraps, if any.
    ///
    /// For retry failures this is the retry error; see [`Error::original_error`].
    pub fn underlying_error(&self) -> Option<&DynError> {
        match self {
            Error::SessionInvalidated { error } => error.as_deref(),
            Error::ParameterEncodingFailed(reason) => reason.underlying_error(),
            Error::ParameterEncoderFailed(reason) => reason.underlying_error(),
            Error::MultipartEncodingFailed(reason) => reason.underlying_error(),
            Error::ResponseSerializationFailed(reason) => reason.underlying_error(),
            Error::RequestAdaptationFailed { error } => Some(error.as_ref()),
            Error::RequestRetryFailed { retry_error, .. } => Some(retry_error.as_ref()),
            Error::SessionDeinitialized
            | Error::ExplicitlyCancelled
            | Error::InvalidUrl { .. }
            | Error::ResponseValidationFailed(_)
            | Error::ServerTrustEvaluationFailed(_) => None,
        }
    }

    /// The error that triggered the retry that then failed.
    pub fn original_error(&self) -> Option<&DynError> {
        match self {
            Error::RequestRetryFailed { original_error, .. } => Some(original_error.as_ref()),
            _ => None,
        }
    }

    /// File URL a multipart failure refers to.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Error::MultipartEncodingFailed(reason) => reason.url(),
            _ => None,
        }
    }

    /// Input rejected by URL resolution.
    pub fn url_input(&self) -> Option<&str> {
        match self {
            Error::InvalidUrl { url } => Some(url),
            _ => None,
        }
    }

    pub fn acceptable_content_types(&self) -> Option<&[String]> {
        match self {
            Error::ResponseValidationFailed(reason) => reason.acceptable_content_types(),
            _ => None,
        }
    }

    pub fn response_content_type(&self) -> Option<&str> {
        match self {
            Error::ResponseValidationFailed(reason) => reason.response_content_type(),
            _ => None,
        }
    }

    pub fn response_code(&self) -> Option<u16> {
        match self {
            Error::ResponseValidationFailed(reason) => reason.response_code(),
            _ => None,
        }
    }

    pub fn failed_string_encoding(&self) -> Option<StringEncoding> {
        match self {
            Error::ResponseSerializationFailed(reason) => reason.failed_string_encoding(),
            _ => None,
        }
    }

    pub fn server_trust_output(&self) -> Option<&TrustOutput> {
        match self {
            Error::ServerTrustEvaluationFailed(reason) => reason.output(),
            _ => None,
        }
    }
}

impl From<ParameterEncodingFailureReason> for Error {
    fn from(reason: ParameterEncodingFailureReason) -> Self {
        Error::ParameterEncodingFailed(reason)
    }
}

impl From<ParameterEncoderFailureReason> for Error {
    fn from(reason: ParameterEncoderFailureReason) -> Self {
        Error::ParameterEncoderFailed(reason)
    }
}

impl From<MultipartEncodingFailureReason> for Error {
    fn from(reason: MultipartEncodingFailureReason) -> Self {
        Error::MultipartEncodingFailed(reason)
    }
}

impl From<ResponseValidationFailureReason> for Error {
    fn from(reason: ResponseValidationFailureReason) -> Self {
        Error::ResponseValidationFailed(reason)
    }
}

impl From<ResponseSerializationFailureReason> for Error {
    fn from(reason: ResponseSerializationFailureReason) -> Self {
        Error::ResponseSerializationFailed(reason)
    }
}

impl From<ServerTrustFailureReason> for Error {
    fn from(reason: ServerTrustFailureReason) -> Self {
        Error::ServerTrustEvaluationFailed(reason)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::trust::TrustResult;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("cause #{0}")]
    struct Cause(u32);

    fn cause(n: u32) -> BoxError {
        Box::new(Cause(n))
    }

    fn file_url() -> Url {
        Url::parse("file:///tmp/upload.bin").unwrap()
    }

    fn output() -> TrustOutput {
        TrustOutput::new(
            "example.com",
            ServerTrust::default(),
            -9813,
            TrustResult::RecoverableTrustFailure,
        )
    }

    /// One value of every leaf in the taxonomy.
    fn every_variant() -> Vec<Error> {
        use MultipartEncodingFailureReason as M;
        use ResponseSerializationFailureReason as S;
        use ResponseValidationFailureReason as V;
        use ServerTrustFailureReason as T;

        vec![
            Error::SessionDeinitialized,
            Error::SessionInvalidated { error: None },
            Error::SessionInvalidated { error: Some(cause(1)) },
            Error::ExplicitlyCancelled,
            Error::InvalidUrl { url: String::new() },
            ParameterEncodingFailureReason::MissingUrl.into(),
            ParameterEncodingFailureReason::JsonEncodingFailed { error: cause(2) }.into(),
            ParameterEncoderFailureReason::MissingRequiredComponent(RequiredComponent::Url).into(),
            ParameterEncoderFailureReason::MissingRequiredComponent(RequiredComponent::HttpMethod {
                raw_value: "FETCH".into(),
            })
            .into(),
            ParameterEncoderFailureReason::EncoderFailed { error: cause(3) }.into(),
            M::BodyPartUrlInvalid { url: file_url() }.into(),
            M::BodyPartFilenameInvalid { url: file_url() }.into(),
            M::BodyPartFileNotReachable { url: file_url() }.into(),
            M::BodyPartFileNotReachableWithError { url: file_url(), error: cause(4) }.into(),
            M::BodyPartFileIsDirectory { url: file_url() }.into(),
            M::BodyPartFileSizeNotAvailable { url: file_url() }.into(),
            M::BodyPartFileSizeQueryFailedWithError { url: file_url(), error: cause(5) }.into(),
            M::BodyPartInputStreamCreationFailed { url: file_url() }.into(),
            M::OutputStreamCreationFailed { url: file_url() }.into(),
            M::OutputStreamFileAlreadyExists { url: file_url() }.into(),
            M::OutputStreamUrlInvalid { url: file_url() }.into(),
            M::OutputStreamWriteFailed { error: cause(6) }.into(),
            M::InputStreamReadFailed { error: cause(7) }.into(),
            Error::RequestAdaptationFailed { error: cause(8) },
            V::DataFileNil.into(),
            V::DataFileReadFailed { url: file_url() }.into(),
            V::MissingContentType { acceptable: vec!["application/json".into()] }.into(),
            V::UnacceptableContentType {
                acceptable: vec!["application/json".into()],
                response_content_type: "text/html".into(),
            }
            .into(),
            V::UnacceptableStatusCode { code: 500 }.into(),
            S::InputDataNilOrZeroLength.into(),
            S::InputFileNil.into(),
            S::InputFileReadFailed { url: file_url() }.into(),
            S::StringSerializationFailed { encoding: StringEncoding::Ascii }.into(),
            S::JsonSerializationFailed { error: cause(9) }.into(),
            S::DecodingFailed { error: cause(10) }.into(),
            S::InvalidEmptyResponse { type_name: "Inventory".into() }.into(),
            S::ResponseSerializerAddedAfterRequestFinished.into(),
            T::NoRequiredEvaluator { host: "example.com".into() }.into(),
            T::NoCertificatesFound.into(),
            T::NoPublicKeysFound.into(),
            T::PolicyApplicationFailed {
                trust: ServerTrust::default(),
                policy: "ssl".into(),
                status: -50,
            }
            .into(),
            T::SettingAnchorCertificatesFailed { status: -50, certificates: vec![] }.into(),
            T::RevocationPolicyCreationFailed.into(),
            T::DefaultEvaluationFailed { output: output() }.into(),
            T::HostValidationFailed { output: output() }.into(),
            T::CertificatePinningFailed {
                host: "example.com".into(),
                trust: ServerTrust::default(),
                pinned_certificates: vec![Certificate(vec![1])],
                server_certificates: vec![Certificate(vec![2])],
            }
            .into(),
            T::PublicKeyPinningFailed {
                host: "example.com".into(),
                trust: ServerTrust::default(),
                pinned_keys: vec![PublicKey(vec![1])],
                server_keys: vec![PublicKey(vec![2])],
            }
            .into(),
            Error::RequestRetryFailed { retry_error: cause(11), original_error: cause(12) },
        ]
    }

    #[test]
    fn every_variant_has_a_description() {
        for error in every_variant() {
            assert!(!error.to_string().trim().is_empty(), "{error:?} has no description");
        }
    }

    #[test]
    fn exactly_one_predicate_holds_per_variant() {
        for error in every_variant() {
            let predicates = [
                error.is_session_deinitialized_error(),
                error.is_session_invalidated_error(),
                error.is_explicitly_cancelled_error(),
                error.is_invalid_url_error(),
                error.is_parameter_encoding_error(),
                error.is_parameter_encoder_error(),
                error.is_multipart_encoding_error(),
                error.is_request_adaptation_error(),
                error.is_response_validation_error(),
                error.is_response_serialization_error(),
                error.is_server_trust_evaluation_error(),
                error.is_request_retry_error(),
            ];
            assert_eq!(predicates.iter().filter(|p| **p).count(), 1, "{error:?}");
        }
    }

    #[test]
    fn underlying_error_returns_the_wrapped_json_cause() {
        let json_error = serde_json::from_str::<u8>("nope").unwrap_err();
        let expected = json_error.to_string();
        let error: Error = ParameterEncodingFailureReason::JsonEncodingFailed {
            error: Box::new(json_error),
        }
        .into();

        let underlying = error.underlying_error().unwrap();
        let json = underlying.downcast_ref::<serde_json::Error>().unwrap();
        assert_eq!(json.to_string(), expected);
    }

    #[test]
    fn underlying_error_is_none_without_a_cause() {
        assert!(Error::SessionDeinitialized.underlying_error().is_none());
        assert!(Error::ExplicitlyCancelled.underlying_error().is_none());
        assert!(Error::SessionInvalidated { error: None }.underlying_error().is_none());
        let missing: Error = ParameterEncodingFailureReason::MissingUrl.into();
        assert!(missing.underlying_error().is_none());
    }

    #[test]
    fn underlying_error_reaches_through_nested_reasons() {
        let cases: Vec<(Error, u32)> = vec![
            (ParameterEncoderFailureReason::EncoderFailed { error: cause(1) }.into(), 1),
            (MultipartEncodingFailureReason::InputStreamReadFailed { error: cause(2) }.into(), 2),
            (ResponseSerializationFailureReason::DecodingFailed { error: cause(3) }.into(), 3),
            (Error::RequestAdaptationFailed { error: cause(4) }, 4),
            (Error::SessionInvalidated { error: Some(cause(5)) }, 5),
        ];
        for (error, n) in cases {
            let underlying = error.underlying_error().and_then(|e| e.downcast_ref::<Cause>());
            assert_eq!(underlying, Some(&Cause(n)), "{error:?}");
        }
    }

    #[test]
    fn source_chain_matches_underlying_error() {
        for error in every_variant() {
            let via_source = error.source().map(|e| e.to_string());
            let via_accessor = error.underlying_error().map(|e| e.to_string());
            assert_eq!(via_source, via_accessor, "{error:?}");
        }
    }

    #[test]
    fn retry_failure_keeps_both_errors() {
        let error = Error::RequestRetryFailed { retry_error: cause(1), original_error: cause(2) };
        assert_eq!(error.underlying_error().unwrap().downcast_ref::<Cause>(), Some(&Cause(1)));
        assert_eq!(error.original_error().unwrap().downcast_ref::<Cause>(), Some(&Cause(2)));
        assert_eq!(
            error.to_string(),
            "Request retry failed with retry error: cause #1, original error: cause #2"
        );
    }

    #[test]
    fn validation_accessors_are_scoped_to_their_reason() {
        let unacceptable: Error = ResponseValidationFailureReason::UnacceptableContentType {
            acceptable: vec!["application/json".into(), "text/plain".into()],
            response_content_type: "text/html".into(),
        }
        .into();
        assert_eq!(
            unacceptable.acceptable_content_types(),
            Some(&["application/json".to_string(), "text/plain".to_string()][..])
        );
        assert_eq!(unacceptable.response_content_type(), Some("text/html"));
        assert_eq!(unacceptable.response_code(), None);

        let status: Error =
            ResponseValidationFailureReason::UnacceptableStatusCode { code: 404 }.into();
        assert_eq!(status.response_code(), Some(404));
        assert_eq!(status.acceptable_content_types(), None);
        assert_eq!(status.to_string(), "Response status code was unacceptable: 404.");

        assert_eq!(Error::ExplicitlyCancelled.response_code(), None);
    }

    #[test]
    fn string_encoding_accessor() {
        let error: Error = ResponseSerializationFailureReason::StringSerializationFailed {
            encoding: StringEncoding::Utf16Be,
        }
        .into();
        assert_eq!(error.failed_string_encoding(), Some(StringEncoding::Utf16Be));
        assert_eq!(Error::ExplicitlyCancelled.failed_string_encoding(), None);
    }

    #[test]
    fn multipart_url_accessor() {
        let with_url: Error =
            MultipartEncodingFailureReason::BodyPartFileIsDirectory { url: file_url() }.into();
        assert_eq!(with_url.url(), Some(&file_url()));
        assert_eq!(with_url.to_string(), "The URL provided is a directory: file:///tmp/upload.bin");

        let without_url: Error =
            MultipartEncodingFailureReason::OutputStreamWriteFailed { error: cause(1) }.into();
        assert_eq!(without_url.url(), None);
    }

    #[test]
    fn trust_output_accessor() {
        let error: Error =
            ServerTrustFailureReason::HostValidationFailed { output: output() }.into();
        assert_eq!(error.server_trust_output().map(|o| o.host.as_str()), Some("example.com"));
        assert_eq!(
            error.to_string(),
            "Host validation failed for host example.com (status -9813, result: recoverable trust failure)."
        );
        let none: Error = ServerTrustFailureReason::NoCertificatesFound.into();
        assert!(none.server_trust_output().is_none());
    }

    #[test]
    fn invalid_url_carries_input() {
        let error = Error::InvalidUrl { url: "not a url".into() };
        assert_eq!(error.url_input(), Some("not a url"));
        assert_eq!(error.to_string(), "URL is not valid: not a url");
    }

    #[test]
    fn from_dyn_recovers_the_taxonomy_value() {
        let boxed: BoxError = Box::new(Error::ExplicitlyCancelled);
        let recovered = Error::from_dyn(boxed.as_ref()).unwrap();
        assert!(recovered.is_explicitly_cancelled_error());

        let other: BoxError = cause(1);
        assert!(Error::from_dyn(other.as_ref()).is_none());
    }

    #[test]
    fn missing_method_component_names_the_raw_token() {
        let error: Error = ParameterEncoderFailureReason::MissingRequiredComponent(
            RequiredComponent::HttpMethod { raw_value: "FETCH".into() },
        )
        .into();
        assert_eq!(
            error.to_string(),
            "Encoding failed due to a missing request component: HTTP method \"FETCH\""
        );
    }
}
