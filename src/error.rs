// src/error.rs

//! Crate-wide error type and result alias

use crate::rpmfile::FilenameError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while generating module metadata
#[derive(Debug, Error)]
pub enum Error {
    /// No file in the repository directory belongs to the main driver
    /// package. Fatal: carries the full listing for diagnosis.
    #[error(
        "no {pkgname} packages found in repository directory; files considered: {candidates:?}"
    )]
    NoDriverPackages {
        pkgname: String,
        candidates: Vec<String>,
    },

    /// Driver-prefixed files exist but none fit the filename grammar, so
    /// no release branch could be inferred. Fatal.
    #[error("no release branches could be inferred from driver packages: {candidates:?}")]
    NoBranches { candidates: Vec<String> },

    /// A driver package filename deviates from the expected convention
    #[error("malformed rpm filename: {0}")]
    Filename(#[from] FilenameError),

    /// The external epoch query failed for a package file
    #[error("epoch query for '{rpm}' failed: {message}")]
    EpochQuery { rpm: String, message: String },

    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config contents are structurally invalid
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Serializing a modulemd document failed
    #[error("failed to serialize modulemd document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem error with path context
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
