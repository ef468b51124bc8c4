// src/scan.rs

//! Repository directory scanning and package selection
//!
//! One flat directory listing feeds the whole run. Selection helpers work
//! on raw filenames so classification never requires a successful parse;
//! files that match a name filter but fall outside the filename grammar
//! are skipped with a debug log (they cannot be driver packages, which
//! are validated separately and loudly).

use crate::error::{Error, Result};
use crate::rpmfile::{self, RpmFilename};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// List regular files in the repository directory, sorted by name
pub fn list_rpm_files(repodir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(repodir).map_err(|e| Error::Io {
        path: repodir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io {
            path: repodir.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| Error::Io {
            path: entry.path(),
            source: e,
        })?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => debug!("Skipping non-UTF-8 filename {:?}", name),
        }
    }
    files.sort();
    Ok(files)
}

/// All files of `pkgname` whose major version equals `major`, newest first
pub fn rpms_for_branch_major(rpm_files: &[String], pkgname: &str, major: u32) -> Vec<RpmFilename> {
    let matches = rpm_files
        .iter()
        .filter(|f| rpmfile::is_pkgname(f, pkgname, None));
    parse_sorted(matches)
        .into_iter()
        .filter(|rpm| rpm.major == major)
        .collect()
}

/// The single newest file of `pkgname`, whatever its branch
pub fn newest_rpm(rpm_files: &[String], pkgname: &str) -> Option<RpmFilename> {
    let matches = rpm_files
        .iter()
        .filter(|f| rpmfile::is_pkgname(f, pkgname, None));
    parse_sorted(matches).into_iter().next()
}

/// The single file of `pkgname` carrying `version` as a substring
///
/// More than one match means the repository layout is off; the newest is
/// used and the rest reported, like package managers do.
pub fn rpm_at_version(rpm_files: &[String], pkgname: &str, version: &str) -> Option<RpmFilename> {
    let matches = rpm_files
        .iter()
        .filter(|f| rpmfile::is_pkgname(f, pkgname, Some(version)));
    let parsed = parse_sorted(matches);
    if parsed.len() > 1 {
        warn!(
            "Expected exactly one rpm for package '{}' in version {} but found {:?}",
            pkgname,
            version,
            parsed.iter().map(|r| r.filename.as_str()).collect::<Vec<_>>()
        );
    }
    parsed.into_iter().next()
}

/// Precompiled kernel-module files belonging to a branch version
pub fn kmods_for_branch(
    rpm_files: &[String],
    kmod_prefix: &str,
    dkms_marker: &str,
    version: &str,
) -> Vec<RpmFilename> {
    let matches = rpm_files
        .iter()
        .filter(|f| rpmfile::is_kmod(f, kmod_prefix, dkms_marker) && f.contains(version));
    parse_sorted(matches)
}

/// Parse candidate filenames and order them newest first
///
/// Malformed or unsortable names are dropped with a debug log; ties break
/// on the filename so runs stay deterministic.
fn parse_sorted<'a>(matches: impl Iterator<Item = &'a String>) -> Vec<RpmFilename> {
    let mut parsed: Vec<(u64, RpmFilename)> = Vec::new();
    for filename in matches {
        match RpmFilename::parse(filename).and_then(|rpm| rpm.sort_key().map(|key| (key, rpm))) {
            Ok(entry) => parsed.push(entry),
            Err(e) => debug!("Skipping unparseable candidate: {}", e),
        }
    }
    parsed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.filename.cmp(&b.1.filename)));
    parsed.into_iter().map(|(_, rpm)| rpm).collect()
}
