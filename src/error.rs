use core::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::QueryType;

/// Problems detected before any request leaves the machine.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no credentials configured: set INSEE_API_KEY, or INSEE_CLIENT_ID and INSEE_CLIENT_SECRET")]
    MissingCredentials,

    #[error("both an API key and OAuth2 client credentials are configured, pick one")]
    AmbiguousCredentials,

    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("incomplete OAuth2 client credentials: {missing} is not set")]
    IncompleteClientCredentials { missing: &'static str },

    #[error("invalid {kind} '{value}': expected exactly {digits} digits")]
    InvalidIdentifier {
        kind: QueryType,
        value: String,
        digits: usize,
    },

    #[error("invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-2xx status
    #[error("token endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Transport failure, or a 2xx answer without a usable `access_token`
    #[error("token exchange failed: {0}")]
    Exchange(String),
}

/// Classification of a non-2xx answer from the Sirene API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiException {
    /// Invalid API key or bearer token
    InvalidCredentials,
    /// The application is not subscribed to the Sirene API
    NotSubscribed,
    /// No unit matches the identifier
    UnknownIdentifier,
    /// Too many requests
    TooManyRequests,
    UnknownError,
}

impl ApiException {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => ApiException::InvalidCredentials,
            403 => ApiException::NotSubscribed,
            404 => ApiException::UnknownIdentifier,
            429 => ApiException::TooManyRequests,
            _ => ApiException::UnknownError,
        }
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ApiException::InvalidCredentials => "invalid credentials",
            ApiException::NotSubscribed => "application not subscribed",
            ApiException::UnknownIdentifier => "unknown identifier",
            ApiException::TooManyRequests => "too many requests",
            ApiException::UnknownError => "unknown error",
        };
        write!(f, "{}", reason)
    }
}

/// Failure of a single registry lookup. Never aborts a run.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no authentication header available, authenticate first")]
    NotAuthenticated,

    #[error("HTTP {status} ({kind}): {body}")]
    Status {
        status: StatusCode,
        kind: ApiException,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("authentication failed")]
    Auth(#[from] AuthError),

    #[error("no data retrieved for any of the {attempted} lookups")]
    NoResults { attempted: usize },

    #[error("cannot write report to {}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            RunError::Auth(_) => 3,
            RunError::NoResults { .. } => 4,
            RunError::Report { .. } => 1,
        }
    }
}
