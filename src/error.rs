//! Error types for binding resolution and the binding store

use thiserror::Error;

/// Errors surfaced by the resolver and controller
#[derive(Debug, Error)]
pub enum BindingError {
    /// A ruleset scope was built without a layout variant
    #[error("variant can not be unset when ruleset '{ruleset}' is provided")]
    InvalidScope { ruleset: String },

    /// The store could not be read; the previous mapping is still in effect
    #[error("binding store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Errors raised by a binding store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse binding store: {0}")]
    Parse(String),
}
