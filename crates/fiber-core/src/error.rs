//! Configuration error type shared by the document parsers.

use thiserror::Error;

/// Errors raised while loading or validating planner input documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed endpoint {0:?} (expected \"instance.port\")")]
    MalformedEndpoint(String),

    #[error("connection references unknown instance: {0}")]
    UnknownInstance(String),

    #[error("{0}")]
    Invalid(String),
}
