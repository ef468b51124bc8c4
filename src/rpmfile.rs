// src/rpmfile.rs

//! Filename grammar for pre-built rpm files
//!
//! Repository filenames follow the fixed convention
//! `<name-parts>-<version>-<release>.<dist>.<arch>.<ext>`, where
//! `<name-parts>` may itself contain hyphens and the dist tag is optional.
//! The grammar is an external contract: the trailing two hyphen segments
//! are always version and release+metadata. Package names whose own
//! version-like suffix adds extra hyphens (`kmod-nvidia-latest-dkms`,
//! `cuda-drivers-redhat`) are handled by the hyphen-count membership rule,
//! not by widening the parser.
//!
//! Examples:
//! - `nvidia-driver-470.57.02-1.el8.x86_64.rpm`
//! - `dnf-plugin-nvidia-2.0-1.el8.noarch.rpm`
//! - `kmod-nvidia-latest-dkms-495.10-1.el8.x86_64.rpm`

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A parsed rpm filename
///
/// Immutable after parsing; all derived fields are computed by pure
/// string splitting on the grammar above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmFilename {
    /// Original filename, including extension
    pub filename: String,
    /// Logical package name (head hyphen segments re-joined)
    pub name: String,
    /// Version exactly as it appears in the filename (`470.57.02`)
    pub version: String,
    /// Numeric major version
    pub major: u32,
    /// Numeric minor version
    pub minor: u32,
    /// Numeric micro version, when the filename carries one
    pub micro: Option<u32>,
    /// Release identifier with dist and arch stripped
    pub release: String,
    /// Distro tag (`el8`), absent for three-dot trailers
    pub dist: Option<String>,
    /// Target architecture (`x86_64`, `noarch`)
    pub arch: String,
}

impl RpmFilename {
    /// Parse a filename following the repository convention
    ///
    /// Fails loudly on names outside the grammar; input directories are
    /// tightly controlled and a deviation means the repository layout
    /// changed under us.
    pub fn parse(filename: &str) -> Result<Self, FilenameError> {
        let parts: Vec<&str> = filename.split('-').collect();
        if parts.len() < 3 {
            return Err(FilenameError::TooFewHyphenSegments(filename.to_string()));
        }

        let version = parts[parts.len() - 2].to_string();
        let trailer = parts[parts.len() - 1];

        let dots: Vec<&str> = trailer.split('.').collect();
        if dots.len() < 3 {
            return Err(FilenameError::TooFewDotSegments(filename.to_string()));
        }

        // Last dot segment is the extension, next-to-last the arch. A
        // fourth segment from the right is the dist tag; whatever is left
        // in front of it is the release identifier.
        let arch = dots[dots.len() - 2].to_string();
        let (release_dots, dist) = if dots.len() >= 4 {
            (&dots[..dots.len() - 3], Some(dots[dots.len() - 3].to_string()))
        } else {
            (&dots[..dots.len() - 2], None)
        };
        let release = release_dots.join(".");
        let name = parts[..parts.len() - 2].join("-");

        let vparts: Vec<&str> = version.split('.').collect();
        if vparts.len() < 2 {
            return Err(FilenameError::MissingMinor {
                filename: filename.to_string(),
                version,
            });
        }
        let major = numeric_component(filename, vparts[0])?;
        let minor = numeric_component(filename, vparts[1])?;
        let micro = if vparts.len() > 2 {
            Some(numeric_component(filename, vparts[2])?)
        } else {
            None
        };

        Ok(Self {
            filename: filename.to_string(),
            name,
            version,
            major,
            minor,
            micro,
            release,
            dist,
            arch,
        })
    }

    /// Totally ordered sort key consistent with numeric version precedence
    ///
    /// Major, minor, micro (0 when absent) and release are zero-padded to
    /// four digits each and concatenated into one integer. Components
    /// above 9999 fall outside the guaranteed order.
    pub fn sort_key(&self) -> Result<u64, FilenameError> {
        let key = format!(
            "{:04}{:04}{:04}{:0>4}",
            self.major,
            self.minor,
            self.micro.unwrap_or(0),
            self.release
        );
        key.parse::<u64>()
            .map_err(|_| FilenameError::UnsortableRelease {
                filename: self.filename.clone(),
                release: self.release.clone(),
            })
    }

    /// Canonical `name-epoch:version-release.dist.arch` identifier
    ///
    /// The epoch comes from an external query; everything else is the
    /// exact inverse of the filename convention.
    pub fn nevra(&self, epoch: &str) -> String {
        match &self.dist {
            Some(dist) => format!(
                "{}-{}:{}-{}.{}.{}",
                self.name, epoch, self.version, self.release, dist, self.arch
            ),
            None => format!(
                "{}-{}:{}-{}.{}",
                self.name, epoch, self.version, self.release, self.arch
            ),
        }
    }
}

impl fmt::Display for RpmFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename)
    }
}

impl FromStr for RpmFilename {
    type Err = FilenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RpmFilename::parse(s)
    }
}

fn numeric_component(filename: &str, component: &str) -> Result<u32, FilenameError> {
    component
        .parse::<u32>()
        .map_err(|_| FilenameError::NonNumericVersion {
            filename: filename.to_string(),
            component: component.to_string(),
        })
}

/// Check whether a filename belongs to the given logical package name
///
/// Membership requires the filename to start with the package name, to
/// contain the version substring when one is given, and to have exactly
/// two more hyphen segments than the package name (version plus
/// release+metadata). The fixed offset of two is what keeps
/// `nvidia-driver` from matching `nvidia-driver-libs-…` files.
pub fn is_pkgname(filename: &str, pkgname: &str, version: Option<&str>) -> bool {
    let file_stops = filename.split('-').count();
    let pkg_stops = pkgname.split('-').count();
    if file_stops != pkg_stops + 2 || !filename.starts_with(pkgname) {
        return false;
    }
    match version {
        Some(v) => filename.contains(v),
        None => true,
    }
}

/// Check whether a filename is a precompiled kernel-module package
///
/// Prefix match on the kmod prefix, excluding the DKMS variants.
pub fn is_kmod(filename: &str, kmod_prefix: &str, dkms_marker: &str) -> bool {
    filename.starts_with(kmod_prefix) && !filename.contains(dkms_marker)
}

/// Errors raised for filenames outside the repository convention
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// Fewer than the mandatory name/version/release hyphen segments
    #[error("expected at least 3 hyphen-separated segments in '{0}'")]
    TooFewHyphenSegments(String),
    /// Trailer does not carry release, arch and extension
    #[error("expected at least 3 dot-separated segments after the last hyphen in '{0}'")]
    TooFewDotSegments(String),
    /// Version carries no minor component
    #[error("version '{version}' in '{filename}' has no minor component")]
    MissingMinor { filename: String, version: String },
    /// A version component is not a number
    #[error("non-numeric version component '{component}' in '{filename}'")]
    NonNumericVersion {
        filename: String,
        component: String,
    },
    /// Release cannot be folded into the numeric sort key
    #[error("release '{release}' in '{filename}' does not form a numeric sort key")]
    UnsortableRelease { filename: String, release: String },
}
