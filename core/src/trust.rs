//! Data recorded about a failed server trust evaluation.
//!
//! Evaluation happens in the TLS layer; these types only carry what it
//! observed so the failure can be classified and audited.

use std::fmt;

/// DER-encoded X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Certificate(pub Vec<u8>);

/// DER-encoded SubjectPublicKeyInfo.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub Vec<u8>);

/// Snapshot of the trust object presented by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerTrust {
    /// Leaf first.
    pub certificate_chain: Vec<Certificate>,
}

/// Outcome reported by the platform evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustResult {
    Invalid,
    Proceed,
    Deny,
    Unspecified,
    RecoverableTrustFailure,
    FatalTrustFailure,
    OtherError,
}

impl fmt::Display for TrustResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrustResult::Invalid => "invalid",
            TrustResult::Proceed => "proceed",
            TrustResult::Deny => "deny",
            TrustResult::Unspecified => "unspecified",
            TrustResult::RecoverableTrustFailure => "recoverable trust failure",
            TrustResult::FatalTrustFailure => "fatal trust failure",
            TrustResult::OtherError => "other error",
        };
        f.write_str(name)
    }
}

/// Full diagnostic payload of an evaluation that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustOutput {
    pub host: String,
    pub trust: ServerTrust,
    /// Platform status code, 0 on success.
    pub status: i32,
    pub result: TrustResult,
}

impl TrustOutput {
    pub fn new(
        host: impl Into<String>,
        trust: ServerTrust,
        status: i32,
        result: TrustResult,
    ) -> Self {
        Self {
            host: host.into(),
            trust,
            status,
            result,
        }
    }
}
