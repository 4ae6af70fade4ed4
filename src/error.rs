/// Problems with the command line input, detected before any request is made.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("url or hostname length must be > 0")]
    MissingTarget,
    #[error("specify url or hostname, not both")]
    ConflictingTarget,
    #[error("hostname specified but port is invalid")]
    InvalidPort { port: i64 },
    #[error("header field must be in the format \"key:value\"")]
    MalformedHeader { raw: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Config {
        #[from]
        source: ConfigError,
    },
    #[error(transparent)]
    InvalidUrl {
        #[from]
        source: url::ParseError,
    },
    #[error(transparent)]
    InvalidMethod {
        #[from]
        source: http::method::InvalidMethod,
    },
    #[error(transparent)]
    InvalidHeaderName {
        #[from]
        source: http::header::InvalidHeaderName,
    },
    #[error(transparent)]
    InvalidHeaderValue {
        #[from]
        source: http::header::InvalidHeaderValue,
    },
    #[error("could not build request")]
    Request { source: reqwest::Error },
    #[error("could not initialize http client")]
    Client { source: reqwest::Error },
    #[error(transparent)]
    Transport { source: reqwest::Error },
    #[error("resp code {actual} didn't match {expected}")]
    StatusMismatch { actual: u16, expected: u16 },
}

impl CheckError {
    /// True when the failure happened before anything was put on the wire.
    pub fn is_pre_flight(&self) -> bool {
        !matches!(
            self,
            CheckError::Transport { .. } | CheckError::StatusMismatch { .. }
        )
    }
}
