// src/validate.rs

//! Post-write schema validation
//!
//! Runs `modulemd-validator` on the produced file to catch schema bugs
//! early, since `modifyrepo` does not. Strictly diagnostic: the validator
//! may be missing, and a failing validation prints its output without
//! changing the generator's own exit status.

use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Validate the written document when a validator is on the system
pub fn validate_modulemd(path: &Path) {
    let validator = match which::which("modulemd-validator") {
        Ok(validator) => validator,
        Err(_) => {
            debug!("modulemd-validator not found, skipping validation");
            return;
        }
    };

    match Command::new(&validator).arg(path).output() {
        Ok(output) if output.status.success() => {
            debug!("{} passed validation", path.display());
        }
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                println!("{}", stdout.trim_end());
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                eprintln!("{}", stderr.trim_end());
            }
        }
        Err(e) => warn!("Failed to run {}: {}", validator.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tolerates_missing_file_and_validator() {
        // Whatever the host has installed, validation never panics or
        // fails the caller.
        validate_modulemd(Path::new("/nonexistent/modules.yaml"));
    }
}
