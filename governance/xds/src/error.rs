use std::path::PathBuf;
use std::time::Duration;

/// Errors surfaced by the discovery client.
#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    /// No management server address was configured.
    #[error("no management server address configured")]
    NotConfigured,

    #[error("failed to connect to the management server: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("discovery stream terminated: {0}")]
    Stream(#[from] tonic::Status),

    #[error("failed to decode a {type_url} resource: {source}")]
    Decode {
        type_url: String,
        #[source]
        source: prost::DecodeError,
    },

    /// No response of the requested type arrived within the deadline.
    #[error("timed out awaiting {type_url} resources after {timeout:?}")]
    Timeout {
        type_url: &'static str,
        timeout: Duration,
    },

    #[error("failed to read bearer token from {path}: {source}")]
    Token {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file held bytes that cannot appear in a gRPC header.
    #[error("bearer token is not valid header data")]
    InvalidToken,
}
