//! Encoder settings loaded from TOML.
//!
//! ```toml
//! destination = "query_string"
//! array_encoding = "no_brackets"
//! pretty_json = true
//!
//! [identity]
//! app_name = "inventory"
//! app_version = "2.1.0"
//! ```
//!
//! Every key is optional; missing keys take the encoder defaults.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::defaults::PlatformInfo;
use crate::encoder::{
    Destination, JsonEncoder, JsonParameterEncoder, UrlEncodedFormParameterEncoder,
};
use crate::form::{ArrayEncoding, BoolEncoding, NilEncoding, SpaceEncoding, UrlEncodedFormEncoder};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub destination: Destination,
    pub array_encoding: ArrayEncoding,
    pub bool_encoding: BoolEncoding,
    pub space_encoding: SpaceEncoding,
    pub nil_encoding: NilEncoding,
    pub pretty_json: bool,
    pub identity: Option<IdentityOverrides>,
}

/// Application facts that replace the detected ones in `User-Agent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityOverrides {
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub bundle: Option<String>,
    pub build: Option<String>,
}

impl EncodingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`load`](Self::load), but falls back to the defaults when the
    /// file is missing or invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "falling back to default encoding config");
                Self::default()
            }
        }
    }

    pub fn form_encoder(&self) -> UrlEncodedFormParameterEncoder {
        let encoder = UrlEncodedFormEncoder {
            array_encoding: self.array_encoding,
            bool_encoding: self.bool_encoding,
            space_encoding: self.space_encoding,
            nil_encoding: self.nil_encoding,
        };
        UrlEncodedFormParameterEncoder::new(encoder, self.destination)
    }

    pub fn json_encoder(&self) -> JsonParameterEncoder {
        let encoder = if self.pretty_json {
            JsonEncoder::pretty()
        } else {
            JsonEncoder::compact()
        };
        JsonParameterEncoder::with_encoder(encoder)
    }

    /// Detected platform facts with the configured identity applied.
    pub fn platform_info(&self) -> PlatformInfo {
        let mut info = PlatformInfo::detect();
        if let Some(identity) = &self.identity {
            if identity.app_name.is_some() {
                info.executable = identity.app_name.clone();
            }
            if identity.app_version.is_some() {
                info.app_version = identity.app_version.clone();
            }
            if identity.bundle.is_some() {
                info.bundle = identity.bundle.clone();
            }
            if identity.build.is_some() {
                info.app_build = identity.build.clone();
            }
        }
        info
    }
}
