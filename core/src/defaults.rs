//! Default `Accept-Encoding`, `Accept-Language` and `User-Agent` headers.
//!
//! The values are derived from platform facts once per process and cached;
//! the builders below are pure so tests can feed them fixed facts.

use std::sync::OnceLock;

use crate::headers::{Header, Headers};

const UNKNOWN: &str = "Unknown";
const LIBRARY_NAME: &str = "courier";
const MAX_LANGUAGES: usize = 6;
const MAX_QUALITY_VALUES: usize = 10;

static DEFAULT_HEADERS: OnceLock<Headers> = OnceLock::new();

/// Facts about the host application and OS used to build `User-Agent`.
///
/// Any field left `None` is rendered as `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    pub executable: Option<String>,
    pub bundle: Option<String>,
    pub app_version: Option<String>,
    pub app_build: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub library_version: Option<String>,
}

impl PlatformInfo {
    /// Look the facts up from the running process. Never fails.
    pub fn detect() -> Self {
        let executable = std::env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()));

        Self {
            executable,
            bundle: None,
            app_version: None,
            app_build: None,
            os_name: os_name(),
            os_version: os_version(),
            library_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

fn os_name() -> Option<String> {
    let name = match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "macOS",
        "ios" => "iOS",
        "windows" => "Windows",
        "android" => "Android",
        "freebsd" => "FreeBSD",
        _ => return None,
    };
    Some(name.to_string())
}

fn os_version() -> Option<String> {
    if cfg!(target_os = "linux") {
        let release = std::fs::read_to_string("/proc/sys/kernel/osrelease").ok()?;
        let release = release.trim();
        return (!release.is_empty()).then(|| release.to_string());
    }
    None
}

/// `"a;q=1.0, b;q=0.9, ..."` with weights dropping by 0.1 per position.
///
/// Only the first ten values are kept, so the lowest weight is `0.1`.
pub fn quality_encoded<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .take(MAX_QUALITY_VALUES)
        .enumerate()
        .map(|(index, value)| {
            let quality = 1.0 - index as f64 * 0.1;
            format!("{};q={:.1}", value.as_ref(), quality)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<executable>/<version> (<bundle>; build:<build>; <os> <os version>) courier/<version>`
pub fn user_agent(info: &PlatformInfo) -> String {
    fn or_unknown(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or(UNKNOWN)
    }

    let library = match &info.library_version {
        Some(version) => format!("{LIBRARY_NAME}/{version}"),
        None => UNKNOWN.to_string(),
    };

    format!(
        "{}/{} ({}; build:{}; {} {}) {}",
        or_unknown(&info.executable),
        or_unknown(&info.app_version),
        or_unknown(&info.bundle),
        or_unknown(&info.app_build),
        or_unknown(&info.os_name),
        or_unknown(&info.os_version),
        library,
    )
}

/// Quality-encoded `Accept-Language` value for the first six locales.
pub fn accept_language<S: AsRef<str>>(languages: &[S]) -> String {
    let end = languages.len().min(MAX_LANGUAGES);
    quality_encoded(&languages[..end])
}

/// Preferred locales from `LANGUAGE`, `LC_ALL`, `LC_MESSAGES` and `LANG`,
/// as BCP 47 tags. Falls back to `en`.
pub fn preferred_languages() -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();

    let mut push = |raw: &str| {
        if let Some(tag) = locale_to_language_tag(raw) {
            if !languages.contains(&tag) {
                languages.push(tag);
            }
        }
    };

    if let Ok(list) = std::env::var("LANGUAGE") {
        list.split(':').for_each(&mut push);
    }
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            push(&value);
        }
    }

    if languages.is_empty() {
        languages.push("en".to_string());
    }
    languages
}

/// `en_US.UTF-8@euro` → `en-US`. `C` and `POSIX` carry no language.
pub fn locale_to_language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next().unwrap_or("").trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

pub fn default_accept_encoding() -> Header {
    Header::accept_encoding(quality_encoded(&["br", "gzip", "deflate"]))
}

impl Headers {
    /// `Accept-Encoding`, `Accept-Language` and `User-Agent` for this process.
    ///
    /// Computed on first use and cloned afterwards.
    pub fn default_headers() -> Headers {
        DEFAULT_HEADERS
            .get_or_init(|| {
                Headers::from([
                    default_accept_encoding(),
                    Header::accept_language(accept_language(&preferred_languages())),
                    Header::user_agent(user_agent(&PlatformInfo::detect())),
                ])
            })
            .clone()
    }
}
