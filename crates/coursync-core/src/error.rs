//! Error types for each subsystem.
//!
//! Configuration and handshake errors are fatal to a run; fetch errors are
//! isolated to one course; rule errors abort the classification pass.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the configuration file or its contents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing in configuration")]
    Missing(&'static str),
    #[error("rule #{index} of course {course:?} sets no pattern and would never match")]
    InactiveRule { course: String, index: usize },
    #[error("course {0:?} is configured more than once")]
    DuplicateCourse(String),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no config found; a template was written to {0}")]
    TemplateCreated(PathBuf),
    #[error("config directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Failures of the SSO handshake. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unexpected response from SSO entry point (HTTP {status})")]
    UnexpectedResponse { status: u32 },
    #[error("identity provider did not redirect to an SSO login URL")]
    MissingSsoUrl,
    #[error("login page carries no csrf_token")]
    MissingCsrfToken,
    #[error("login rejected (HTTP {status})")]
    LoginRejected { status: u32 },
    #[error("login response has no SAML assertion form")]
    MissingAssertionForm,
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
}

/// Failure of a single course download. Logged and isolated to that course.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    #[error("{url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u32 },
    #[error("download page has no confirmation form")]
    MissingConfirmForm,
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors of the classification pass.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
