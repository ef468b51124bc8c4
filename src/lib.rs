// src/lib.rs

//! Modularity stream metadata generator for RPM driver repositories
//!
//! Scans a directory of pre-built rpm files, infers the driver release
//! branches from their filenames, and renders the modulemd YAML that
//! `modifyrepo` feeds to dnf so it knows how the streams are made up.
//!
//! # Pipeline
//!
//! - `rpmfile`: filename grammar, package-name classification, sort keys,
//!   NEVRA assembly
//! - `branch`: release-branch inference from the main driver packages
//! - `epoch`: epoch lookup behind a trait, shelling out to `rpm`
//! - `generate`: one forward pass from directory listing to document text
//! - `modulemd`: the serde document model
//! - `validate`: optional post-write schema validation

pub mod branch;
pub mod config;
pub mod epoch;
mod error;
pub mod generate;
pub mod modulemd;
pub mod rpmfile;
pub mod scan;
pub mod validate;

pub use branch::{infer_branches, Branch};
pub use config::GeneratorConfig;
pub use epoch::{EpochSource, FixedEpoch, RpmQuery};
pub use error::{Error, Result};
pub use generate::{generate, run_stamp};
pub use rpmfile::{FilenameError, RpmFilename};
