//! Errors raised while discovering and resolving user configuration.

use pagetree_core::{LocationId, LocationIdError};
use std::path::PathBuf;

/// Problems in user files. Bugs in the resolver itself panic instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("{path}: directory cannot be used as a location: {source}")]
    InvalidLocation {
        path: String,
        #[source]
        source: LocationIdError,
    },
    #[error("{path}: `extends` must be a package name or a list of package names")]
    InvalidExtends { path: String },
    #[error("{path}: extends `{package}` but node_modules/{package} was not found")]
    ExtendsNotFound { path: String, package: String },
    #[error("{path}: `{name}` must be a string starting with '/'")]
    InvalidRoutingRoot { path: String, name: String },
    #[error("{path}: `route` must be a string")]
    InvalidRoute { path: String },
    #[error("unknown page {0}")]
    UnknownPage(LocationId),
    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
