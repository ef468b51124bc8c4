// src/branch.rs

//! Release branches inferred from driver package filenames
//!
//! A branch is one release line of the driver: one per distinct major
//! version found in the repository, each paired with a `-dkms` twin, plus
//! the synthetic `latest`/`latest-dkms` pair tracking the newest line.

use crate::error::Result;
use crate::rpmfile::RpmFilename;
use std::cmp::Ordering;
use std::fmt;

/// Placeholder architecture for branches constructed without one
pub const DEFAULT_ARCH: &str = "x86_64";

/// One release line of the driver
///
/// Constructed once during inference and immutable afterwards. Equality
/// and ordering consider only the version triple: branches sort newest
/// first, and two branches with the same major/minor/micro compare equal
/// regardless of their names.
#[derive(Debug, Clone)]
pub struct Branch {
    /// Logical name: `470`, `470-dkms`, `latest`, `latest-dkms`
    pub name: String,
    /// Dotted version exactly as it appears in the driver filename
    /// (`470.57.02`), so substring matching against other filenames keeps
    /// any zero padding
    pub version: String,
    pub major: u32,
    pub minor: u32,
    pub micro: Option<u32>,
    pub arch: String,
}

impl Branch {
    /// Create a branch with the placeholder architecture
    pub fn new(name: impl Into<String>, major: u32, minor: u32, micro: Option<u32>) -> Self {
        let version = match micro {
            Some(micro) => format!("{major}.{minor}.{micro}"),
            None => format!("{major}.{minor}"),
        };
        Self {
            name: name.into(),
            version,
            major,
            minor,
            micro,
            arch: DEFAULT_ARCH.to_string(),
        }
    }

    /// Branch for a parsed main-driver filename, named after its major
    pub fn from_rpm(rpm: &RpmFilename) -> Self {
        Self {
            name: rpm.major.to_string(),
            version: rpm.version.clone(),
            major: rpm.major,
            minor: rpm.minor,
            micro: rpm.micro,
            arch: rpm.arch.clone(),
        }
    }

    /// Copy of this branch under a different logical name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// The `-dkms` twin sharing this branch's version numbers
    pub fn dkms_twin(&self) -> Self {
        self.renamed(format!("{}-dkms", self.name))
    }

    /// Dotted version string of this branch
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this is a DKMS (kernel-module-source) variant
    pub fn is_dkms(&self) -> bool {
        self.name.contains("dkms")
    }

    /// Whether this is one of the synthetic latest branches
    pub fn is_latest(&self) -> bool {
        self.name == "latest" || self.name == "latest-dkms"
    }

    fn sort_triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.micro.unwrap_or(0))
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.sort_triple() == other.sort_triple()
    }
}

impl Eq for Branch {}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: highest version triple sorts first
        other.sort_triple().cmp(&self.sort_triple())
    }
}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Infer the full branch set from the main-driver filenames
///
/// The inputs are ordered newest-first by sort key; a new branch starts at
/// every change of major version, so each branch carries the newest
/// minor/micro (and arch) seen for its major. Every real branch gets a
/// `-dkms` twin, and the synthetic `latest`/`latest-dkms` pair copying the
/// newest branch is prepended.
///
/// Returns an empty vec for empty input; the caller decides whether that
/// is fatal.
pub fn infer_branches(driver_rpms: &[RpmFilename]) -> Result<Vec<Branch>> {
    let mut keyed = Vec::with_capacity(driver_rpms.len());
    for rpm in driver_rpms {
        keyed.push((rpm, rpm.sort_key()?));
    }
    keyed.sort_by(|a, b| b.1.cmp(&a.1));

    let mut real: Vec<Branch> = Vec::new();
    for (rpm, _) in &keyed {
        if real.last().map(|b| b.major) != Some(rpm.major) {
            real.push(Branch::from_rpm(rpm));
        }
    }
    real.sort();

    let Some(newest) = real.first().cloned() else {
        return Ok(Vec::new());
    };

    let mut branches = Vec::with_capacity(real.len() * 2 + 2);
    branches.push(newest.renamed("latest"));
    branches.push(newest.renamed("latest-dkms"));
    for branch in real {
        let twin = branch.dkms_twin();
        branches.push(branch);
        branches.push(twin);
    }
    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpmfile::RpmFilename;

    fn parsed(names: &[&str]) -> Vec<RpmFilename> {
        names
            .iter()
            .map(|n| RpmFilename::parse(n).unwrap())
            .collect()
    }

    #[test]
    fn test_branch_ordering_newest_first() {
        let mut branches = vec![
            Branch::new("470", 470, 57, Some(2)),
            Branch::new("495", 495, 10, None),
            Branch::new("460", 460, 91, Some(3)),
        ];
        branches.sort();
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["495", "470", "460"]);
    }

    #[test]
    fn test_branch_equality_ignores_name() {
        let a = Branch::new("470", 470, 57, Some(2));
        let b = Branch::new("470-dkms", 470, 57, Some(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_branch_flags() {
        assert!(Branch::new("470-dkms", 470, 57, None).is_dkms());
        assert!(!Branch::new("470", 470, 57, None).is_dkms());
        assert!(Branch::new("latest", 495, 10, None).is_latest());
        assert!(Branch::new("latest-dkms", 495, 10, None).is_latest());
        assert!(Branch::new("latest-dkms", 495, 10, None).is_dkms());
        assert!(!Branch::new("495", 495, 10, None).is_latest());
    }

    #[test]
    fn test_version_preserves_filename_padding() {
        let rpm = RpmFilename::parse("nvidia-driver-470.57.02-1.el8.x86_64.rpm").unwrap();
        let branch = Branch::from_rpm(&rpm);
        assert_eq!(branch.version(), "470.57.02");
        assert_eq!(branch.micro, Some(2));
    }

    #[test]
    fn test_infer_branches_two_majors() {
        let rpms = parsed(&[
            "nvidia-driver-470.42.1-5.el8.x86_64.rpm",
            "nvidia-driver-495.10-1.el8.x86_64.rpm",
            "nvidia-driver-470.57.2-3.el8.x86_64.rpm",
        ]);
        let branches = infer_branches(&rpms).unwrap();
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["latest", "latest-dkms", "495", "495-dkms", "470", "470-dkms"]
        );
        // The latest pair copies the newest branch's version.
        assert_eq!(branches[0].version(), "495.10");
        assert_eq!(branches[1].version(), "495.10");
        // First occurrence per major wins: 470 keeps 470.57.2.
        let b470 = branches.iter().find(|b| b.name == "470").unwrap();
        assert_eq!(b470.version(), "470.57.2");
    }

    #[test]
    fn test_infer_branches_empty_input() {
        assert!(infer_branches(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_infer_branches_carries_arch() {
        let rpms = parsed(&["nvidia-driver-510.47.03-1.el9.aarch64.rpm"]);
        let branches = infer_branches(&rpms).unwrap();
        assert!(branches.iter().all(|b| b.arch == "aarch64"));
    }
}
