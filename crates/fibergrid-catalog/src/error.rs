//! Catalog error types.

use thiserror::Error;

/// Errors raised while loading a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
