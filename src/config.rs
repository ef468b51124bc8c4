// src/config.rs

//! Generator configuration
//!
//! All package names, thresholds and text templates used while generating
//! module metadata. The defaults describe the shipped NVIDIA driver
//! repositories; a TOML file passed via `--config` overrides individual
//! fields for forks and test repositories.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one generator run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Module name emitted in every document
    pub module_name: String,

    /// Filename prefix of precompiled kernel-module packages
    pub kmod_prefix: String,

    /// Marker distinguishing DKMS packages and branches
    pub dkms_marker: String,

    /// Kernel-module package attached to DKMS branches
    pub dkms_kmod_pkg: String,

    /// Per-branch packages, main driver package first
    pub branch_pkgs: Vec<String>,

    /// Packages always taken at their newest version, whatever the branch
    pub latest_pkgs: Vec<String>,

    /// Meta packages installed by the default profile but excluded from
    /// kickstart installs
    pub meta_pkgs: Vec<String>,

    /// Devel package referenced by the src profile
    pub devel_pkg: String,

    /// CUDA driver package referenced by the fm profile
    pub cuda_pkg: String,

    /// Fabric-manager package name for current branches
    pub fabric_manager_pkg: String,

    /// Prefix of the major-suffixed fabric-manager package used before
    /// the rename
    pub legacy_fabric_manager_prefix: String,

    /// First driver major shipping fabric manager at all
    pub fabric_manager_min_major: u32,

    /// First driver major shipping the renamed fabric-manager package
    pub fabric_manager_rename_major: u32,

    /// Architectures fabric manager exists for
    pub fabric_manager_arches: Vec<String>,

    /// Module license list
    pub licenses: Vec<String>,

    /// Stream summary; `{stream}` is replaced per branch
    pub summary_template: String,

    /// Description lines; `{version}` is replaced per branch, an empty
    /// line separates paragraphs
    pub description_template: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            module_name: "nvidia-driver".to_string(),
            kmod_prefix: "kmod-nvidia".to_string(),
            dkms_marker: "dkms".to_string(),
            dkms_kmod_pkg: "kmod-nvidia-latest-dkms".to_string(),
            // Main package must be first
            branch_pkgs: vec![
                "nvidia-driver".to_string(),
                "nvidia-driver-libs".to_string(),
                "nvidia-driver-devel".to_string(),
                "nvidia-driver-NVML".to_string(),
                "nvidia-driver-NvFBCOpenGL".to_string(),
                "nvidia-driver-cuda".to_string(),
                "nvidia-driver-cuda-libs".to_string(),
                "nvidia-persistenced".to_string(),
                "nvidia-modprobe".to_string(),
                "nvidia-settings".to_string(),
                "nvidia-xconfig".to_string(),
                "cuda-drivers-redhat".to_string(),
            ],
            latest_pkgs: vec!["dnf-plugin-nvidia".to_string()],
            meta_pkgs: vec!["cuda-drivers-redhat".to_string()],
            devel_pkg: "nvidia-driver-devel".to_string(),
            cuda_pkg: "nvidia-driver-cuda".to_string(),
            fabric_manager_pkg: "nvidia-fabric-manager".to_string(),
            legacy_fabric_manager_prefix: "nvidia-fabricmanager-".to_string(),
            fabric_manager_min_major: 450,
            fabric_manager_rename_major: 460,
            fabric_manager_arches: vec!["x86_64".to_string()],
            licenses: vec!["MIT".to_string()],
            summary_template: "Nvidia driver for {stream} branch".to_string(),
            description_template: vec![
                "This package provides the most recent NVIDIA display driver which allows for"
                    .to_string(),
                "hardware accelerated rendering with recent NVIDIA chipsets.".to_string(),
                String::new(),
                "For the full product support list, please consult the release notes for"
                    .to_string(),
                "driver version {version}.".to_string(),
            ],
        }
    }
}

impl GeneratorConfig {
    /// Load overrides from a TOML file on top of the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GeneratorConfig = toml::from_str(&text).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The main driver package, whose files define the branches
    pub fn main_pkg(&self) -> &str {
        &self.branch_pkgs[0]
    }

    /// Structural checks beyond what serde enforces
    pub fn validate(&self) -> Result<()> {
        if self.branch_pkgs.is_empty() {
            return Err(Error::ConfigInvalid(
                "branch_pkgs must list at least the main driver package".to_string(),
            ));
        }
        if self.module_name.is_empty() {
            return Err(Error::ConfigInvalid("module_name must not be empty".to_string()));
        }
        if self.fabric_manager_min_major > self.fabric_manager_rename_major {
            return Err(Error::ConfigInvalid(
                "fabric_manager_min_major must not exceed fabric_manager_rename_major".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.main_pkg(), "nvidia-driver");
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "module_name = \"nouveau\"").unwrap();
        writeln!(file, "latest_pkgs = [\"dnf-plugin-nouveau\"]").unwrap();

        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.module_name, "nouveau");
        assert_eq!(config.latest_pkgs, ["dnf-plugin-nouveau"]);
        // Untouched fields keep their defaults.
        assert_eq!(config.main_pkg(), "nvidia-driver");
        assert_eq!(config.kmod_prefix, "kmod-nvidia");
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "modulename = \"typo\"").unwrap();

        assert!(matches!(
            GeneratorConfig::load(file.path()),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_empty_branch_pkgs() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "branch_pkgs = []").unwrap();

        assert!(matches!(
            GeneratorConfig::load(file.path()),
            Err(Error::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            GeneratorConfig::load(Path::new("/nonexistent/modgen.toml")),
            Err(Error::ConfigRead { .. })
        ));
    }
}
