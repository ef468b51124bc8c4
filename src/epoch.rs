// src/epoch.rs

//! Epoch lookup for package files
//!
//! The epoch number is not recoverable from a filename, so it is obtained
//! by querying the `rpm` command-line tool per package file. The lookup
//! sits behind the [`EpochSource`] trait so generation can run against a
//! fixed epoch when `rpm` is unavailable, and so tests stay offline.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Source of epoch numbers for package files
pub trait EpochSource {
    /// Epoch of the package at `rpm_path`, as a decimal string
    fn epoch_of(&self, rpm_path: &Path) -> Result<String>;
}

/// Epoch lookup via `rpm -qp`
///
/// Signature checking is disabled for the query; repositories are built
/// from unsigned packages before signing. Benign unsigned-package notices
/// on stderr are filtered, anything else is surfaced as a warning.
pub struct RpmQuery;

impl EpochSource for RpmQuery {
    fn epoch_of(&self, rpm_path: &Path) -> Result<String> {
        debug!("Querying epoch of {}", rpm_path.display());

        let output = Command::new("rpm")
            .args(["-qp", "--nosignature", "--qf", "%{epochnum}"])
            .arg(rpm_path)
            .output()
            .map_err(|e| Error::EpochQuery {
                rpm: rpm_path.display().to_string(),
                message: format!("failed to run rpm: {}. Is rpm installed?", e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            if !is_benign_signature_noise(line) {
                warn!("rpm: {}", line);
            }
        }

        if !output.status.success() {
            return Err(Error::EpochQuery {
                rpm: rpm_path.display().to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl RpmQuery {
    /// Check if the `rpm` tool is available on this system
    pub fn is_available() -> bool {
        Command::new("rpm")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Fixed epoch for every package
///
/// Used with `--assume-epoch` to generate without `rpm` on the path, and
/// by tests.
pub struct FixedEpoch(pub String);

impl FixedEpoch {
    pub fn new(epoch: impl Into<String>) -> Self {
        Self(epoch.into())
    }
}

impl EpochSource for FixedEpoch {
    fn epoch_of(&self, _rpm_path: &Path) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Expected stderr noise when querying unsigned packages
fn is_benign_signature_noise(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line.contains("NOKEY")
        || line.contains("not signed")
        || line.contains("signatures not checked")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_noise_filter() {
        assert!(is_benign_signature_noise(""));
        assert!(is_benign_signature_noise(
            "warning: pkg.rpm: Header V4 RSA/SHA512 Signature, key ID 7fa2af80: NOKEY"
        ));
        assert!(is_benign_signature_noise(
            "warning: pkg.rpm: digests signatures not checked"
        ));
        assert!(!is_benign_signature_noise(
            "error: pkg.rpm: not an rpm package"
        ));
    }

    #[test]
    fn test_fixed_epoch() {
        let source = FixedEpoch::new("2");
        assert_eq!(
            source.epoch_of(Path::new("anything.rpm")).unwrap(),
            "2".to_string()
        );
    }

    #[test]
    fn test_rpm_query_availability_probe() {
        // Only checks the probe runs without panicking; rpm may or may
        // not be installed where tests run.
        let _ = RpmQuery::is_available();
    }
}
