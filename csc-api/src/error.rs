use std::env::VarError;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Failures that abort a run. Configuration errors happen before any request is made, network
/// errors name the page that could not be fetched, and parse errors name the page whose markup did
/// not have the expected shape.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing environment variable `{name}`")]
    MissingVar {
        name: &'static str,
        #[source]
        source: VarError,
    },

    #[error("session token cannot be sent as a cookie")]
    InvalidSession,

    #[error("request for {url} failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: Url, status: StatusCode },

    #[error("unexpected page shape at {url}: {reason}")]
    Parse { url: Url, reason: String },
}

impl Error {
    pub(crate) fn parse(url: &Url, reason: impl Into<String>) -> Self {
        Self::Parse {
            url: url.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingVar { .. } | Self::InvalidSession)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Status { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Short name of the failure class, for logs and exit messages.
    pub fn kind(&self) -> &'static str {
        if self.is_config() {
            "configuration"
        } else if self.is_network() {
            "network"
        } else {
            "parse"
        }
    }
}
