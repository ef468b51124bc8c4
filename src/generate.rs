// src/generate.rs

//! Module metadata generation
//!
//! One forward pass: list the repository, infer the branches, then render
//! one stream document per branch followed by the defaults document.
//! Missing packages are warnings and leave gaps in the artifact list; a
//! repository with no driver packages at all is fatal.

use crate::branch::{self, Branch};
use crate::config::GeneratorConfig;
use crate::epoch::EpochSource;
use crate::error::{Error, Result};
use crate::modulemd::{
    self, Artifacts, DefaultsData, DefaultsDoc, License, ModuleData, ModuleDoc, Profile,
};
use crate::rpmfile::{self, RpmFilename};
use crate::scan;
use chrono::{Datelike, Local, Timelike};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Timestamp of this run as one `YYYYMMDDHHMMSS` integer
///
/// Captured once at startup so every document of a run carries the same
/// version, and injected into [`generate`] so tests are deterministic.
pub fn run_stamp() -> u64 {
    let now = Local::now();
    (now.year() as u64) * 10_000_000_000
        + (now.month() as u64) * 100_000_000
        + (now.day() as u64) * 1_000_000
        + (now.hour() as u64) * 10_000
        + (now.minute() as u64) * 100
        + now.second() as u64
}

/// Generate the complete module metadata document for a repository
pub fn generate(
    config: &GeneratorConfig,
    repodir: &Path,
    epoch_source: &dyn EpochSource,
    stamp: u64,
) -> Result<String> {
    let rpm_files = scan::list_rpm_files(repodir)?;

    let driver_candidates: Vec<String> = rpm_files
        .iter()
        .filter(|f| f.starts_with(config.main_pkg()))
        .cloned()
        .collect();
    if driver_candidates.is_empty() {
        return Err(Error::NoDriverPackages {
            pkgname: config.main_pkg().to_string(),
            candidates: rpm_files,
        });
    }

    let driver_rpms = driver_candidates
        .iter()
        .filter(|f| rpmfile::is_pkgname(f, config.main_pkg(), None))
        .map(|f| RpmFilename::parse(f))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let branches = branch::infer_branches(&driver_rpms)?;
    let Some(newest) = branches.first() else {
        return Err(Error::NoBranches {
            candidates: driver_candidates,
        });
    };
    info!("Latest branch: {}", newest.version());

    let mut modules = Vec::with_capacity(branches.len());
    for branch in &branches {
        info!("Branch: {}", branch);
        let (artifacts, dist) = collect_artifacts(config, repodir, &rpm_files, branch, epoch_source);
        let context = modulemd::stream_context(
            &config.module_name,
            &branch.name,
            stamp,
            dist.as_deref().unwrap_or_default(),
        );
        modules.push(ModuleDoc::new(ModuleData {
            name: config.module_name.clone(),
            stream: branch.name.clone(),
            version: stamp,
            context,
            arch: branch.arch.clone(),
            summary: config.summary_template.replace("{stream}", &branch.name),
            description: render_description(&config.description_template, branch.version()),
            license: License {
                module: config.licenses.clone(),
            },
            profiles: build_profiles(config, branch),
            artifacts: Artifacts { rpms: artifacts },
        }));
    }

    let defaults = DefaultsDoc::new(DefaultsData {
        module: config.module_name.clone(),
        stream: "latest-dkms".to_string(),
        profiles: branches
            .iter()
            .map(|b| (b.name.clone(), vec!["default".to_string()]))
            .collect(),
    });

    modulemd::render(&modules, &defaults)
}

/// NEVRA list for one branch, plus the dist tag of its main package
///
/// Branch packages contribute every file of the branch's major version;
/// always-latest packages contribute their single newest file; kernel
/// modules attach by version substring, except DKMS branches which attach
/// the single DKMS kmod package instead.
fn collect_artifacts(
    config: &GeneratorConfig,
    repodir: &Path,
    rpm_files: &[String],
    branch: &Branch,
    epoch_source: &dyn EpochSource,
) -> (Vec<String>, Option<String>) {
    let mut nevras = Vec::new();
    let mut dist = None;

    for pkg in &config.branch_pkgs {
        let matches = scan::rpms_for_branch_major(rpm_files, pkg, branch.major);
        if matches.is_empty() {
            warn!("Branch {} does not have a {} package", branch.name, pkg);
            continue;
        }
        if pkg == config.main_pkg() && dist.is_none() {
            dist = matches[0].dist.clone();
        }
        for rpm in &matches {
            push_nevra(&mut nevras, repodir, rpm, epoch_source);
        }
    }

    for pkg in &config.latest_pkgs {
        match scan::newest_rpm(rpm_files, pkg) {
            Some(rpm) => push_nevra(&mut nevras, repodir, &rpm, epoch_source),
            None => warn!("Branch {} does not have a {} package", branch.name, pkg),
        }
    }

    if branch.is_dkms() {
        match scan::rpm_at_version(rpm_files, &config.dkms_kmod_pkg, branch.version()) {
            Some(rpm) => push_nevra(&mut nevras, repodir, &rpm, epoch_source),
            None => warn!(
                "Branch {} does not have a {} package",
                branch.name, config.dkms_kmod_pkg
            ),
        }
    } else {
        for rpm in scan::kmods_for_branch(
            rpm_files,
            &config.kmod_prefix,
            &config.dkms_marker,
            branch.version(),
        ) {
            push_nevra(&mut nevras, repodir, &rpm, epoch_source);
        }
    }

    (nevras, dist)
}

fn push_nevra(
    nevras: &mut Vec<String>,
    repodir: &Path,
    rpm: &RpmFilename,
    epoch_source: &dyn EpochSource,
) {
    match epoch_source.epoch_of(&repodir.join(&rpm.filename)) {
        Ok(epoch) => nevras.push(rpm.nevra(&epoch)),
        Err(e) => warn!("Omitting {}: {}", rpm.filename, e),
    }
}

/// Installation profiles for one branch
fn build_profiles(config: &GeneratorConfig, branch: &Branch) -> BTreeMap<String, Profile> {
    let mut profiles = BTreeMap::new();

    let mut default_rpms = vec![config.main_pkg().to_string()];
    default_rpms.extend(config.meta_pkgs.iter().cloned());
    let mut ks_rpms = vec![config.main_pkg().to_string()];
    if branch.is_dkms() {
        default_rpms.push(config.dkms_kmod_pkg.clone());
        ks_rpms.push(config.dkms_kmod_pkg.clone());
    }

    profiles.insert(
        "default".to_string(),
        Profile {
            description: "Default installation".to_string(),
            rpms: default_rpms,
        },
    );
    // Kickstart chokes on the meta packages, so it gets the same set
    // without them.
    profiles.insert(
        "ks".to_string(),
        Profile {
            description: "Installation via kickstart".to_string(),
            rpms: ks_rpms,
        },
    );

    if wants_fabric_manager(config, branch) {
        profiles.insert(
            "fm".to_string(),
            Profile {
                description: "FabricManager installation".to_string(),
                rpms: vec![config.cuda_pkg.clone(), fabric_manager_pkgname(config, branch)],
            },
        );
    }

    if !branch.is_dkms() {
        profiles.insert(
            "src".to_string(),
            Profile {
                description: "Source headers for compilation".to_string(),
                rpms: vec![config.main_pkg().to_string(), config.devel_pkg.clone()],
            },
        );
    }

    profiles
}

/// Whether this branch's arch and version line ship fabric manager
fn wants_fabric_manager(config: &GeneratorConfig, branch: &Branch) -> bool {
    config.fabric_manager_arches.iter().any(|a| *a == branch.arch)
        && (branch.is_latest() || branch.major >= config.fabric_manager_min_major)
}

/// Fabric-manager package name for a branch
///
/// The package lost its major-version suffix at the rename line; the
/// synthetic latest pair always tracks the current name.
fn fabric_manager_pkgname(config: &GeneratorConfig, branch: &Branch) -> String {
    if branch.is_latest() || branch.major >= config.fabric_manager_rename_major {
        config.fabric_manager_pkg.clone()
    } else {
        format!("{}{}", config.legacy_fabric_manager_prefix, branch.major)
    }
}

/// Fold the description template into paragraphs
///
/// Consecutive lines join with spaces, an empty line starts a new
/// paragraph, and `{version}` is replaced by the branch version.
fn render_description(template: &[String], version: &str) -> String {
    let mut paragraphs: Vec<Vec<String>> = vec![Vec::new()];
    for line in template {
        if line.is_empty() {
            paragraphs.push(Vec::new());
        } else {
            paragraphs
                .last_mut()
                .expect("paragraphs starts non-empty")
                .push(line.replace("{version}", version));
        }
    }
    paragraphs
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_description_folds_paragraphs() {
        let template = vec![
            "first line".to_string(),
            "second line of paragraph.".to_string(),
            String::new(),
            "driver version {version}.".to_string(),
        ];
        assert_eq!(
            render_description(&template, "495.10"),
            "first line second line of paragraph.\ndriver version 495.10."
        );
    }

    #[test]
    fn test_profiles_for_precompiled_branch() {
        let config = GeneratorConfig::default();
        let branch = Branch::new("495", 495, 10, None);
        let profiles = build_profiles(&config, &branch);

        assert_eq!(
            profiles.keys().collect::<Vec<_>>(),
            ["default", "fm", "ks", "src"]
        );
        assert_eq!(
            profiles["default"].rpms,
            ["nvidia-driver", "cuda-drivers-redhat"]
        );
        assert_eq!(profiles["ks"].rpms, ["nvidia-driver"]);
        assert_eq!(
            profiles["src"].rpms,
            ["nvidia-driver", "nvidia-driver-devel"]
        );
    }

    #[test]
    fn test_profiles_for_dkms_branch() {
        let config = GeneratorConfig::default();
        let branch = Branch::new("495-dkms", 495, 10, None);
        let profiles = build_profiles(&config, &branch);

        assert!(!profiles.contains_key("src"));
        assert_eq!(
            profiles["default"].rpms,
            ["nvidia-driver", "cuda-drivers-redhat", "kmod-nvidia-latest-dkms"]
        );
        assert_eq!(
            profiles["ks"].rpms,
            ["nvidia-driver", "kmod-nvidia-latest-dkms"]
        );
    }

    #[test]
    fn test_fabric_manager_gating() {
        let config = GeneratorConfig::default();

        // Too old for fabric manager at all.
        let old = Branch::new("440", 440, 33, Some(1));
        assert!(!wants_fabric_manager(&config, &old));

        // Pre-rename line keeps the major-suffixed package.
        let legacy = Branch::new("450", 450, 80, Some(2));
        assert!(wants_fabric_manager(&config, &legacy));
        assert_eq!(
            fabric_manager_pkgname(&config, &legacy),
            "nvidia-fabricmanager-450"
        );

        // Renamed package from the rename line on.
        let current = Branch::new("470", 470, 57, Some(2));
        assert_eq!(
            fabric_manager_pkgname(&config, &current),
            "nvidia-fabric-manager"
        );

        // The latest pair always tracks the current name.
        let latest = Branch::new("latest", 440, 33, Some(1));
        assert!(wants_fabric_manager(&config, &latest));
        assert_eq!(
            fabric_manager_pkgname(&config, &latest),
            "nvidia-fabric-manager"
        );
    }

    #[test]
    fn test_fabric_manager_needs_supported_arch() {
        let config = GeneratorConfig::default();
        let mut branch = Branch::new("495", 495, 10, None);
        branch.arch = "aarch64".to_string();
        assert!(!wants_fabric_manager(&config, &branch));
    }

    #[test]
    fn test_run_stamp_shape() {
        let stamp = run_stamp();
        // Fourteen digits: YYYYMMDDHHMMSS.
        assert!(stamp >= 10_000_000_000_000);
        assert!(stamp < 100_000_000_000_000);
    }
}
