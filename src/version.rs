use crate::error::{ReleaseError, Result};

/// Represents a semantic version with major, minor, and patch components.
///
/// Follows semantic versioning specification (major.minor.patch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Selects which version segment a bump increments and which are reset.
///
/// The mode is decided by the flow, not the user: `feat` picks
/// [BumpMode::DevelopMinor] when a remote develop branch exists and
/// [BumpMode::NoDevelopPatch] otherwise; `fix` always uses
/// [BumpMode::MasterPatch].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpMode {
    /// Hotfix on master: patch += 1
    MasterPatch,
    /// Release via develop: minor += 1, patch = 0
    DevelopMinor,
    /// Release without a develop branch: patch += 1
    NoDevelopPatch,
}

impl Version {
    /// Creates a new Version with the specified major, minor, and patch components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses a `major.minor.patch` version string.
///
/// Expects exactly three dot-separated non-negative integers. Anything
/// else (prefixes, prerelease suffixes, missing segments) is rejected.
///
/// # Arguments
/// * `raw` - Version string to parse (e.g., "1.2.3")
///
/// # Returns
/// * `Ok(Version)` - Successfully parsed version
/// * `Err(ReleaseError::ManifestRead)` - If the string is malformed
pub fn parse_version(raw: &str) -> Result<Version> {
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
        return Err(ReleaseError::manifest_read(format!(
            "version '{}' is not of the form major.minor.patch",
            raw
        )));
    }

    let parse_segment = |s: &str| {
        s.parse::<u32>().map_err(|_| {
            ReleaseError::manifest_read(format!("version segment '{}' is not a number", s))
        })
    };

    Ok(Version::new(
        parse_segment(parts[0])?,
        parse_segment(parts[1])?,
        parse_segment(parts[2])?,
    ))
}

/// Bumps a version according to the given mode.
///
/// - [BumpMode::MasterPatch]: patch += 1
/// - [BumpMode::DevelopMinor]: minor += 1, patch = 0
/// - [BumpMode::NoDevelopPatch]: patch += 1
///
/// The major segment is never changed. Not idempotent: bumping twice
/// advances the version twice. A segment already at `u32::MAX` cannot
/// be incremented and is an error.
pub fn bump_version(mut version: Version, mode: BumpMode) -> Result<Version> {
    let rendered = version.to_string();
    match mode {
        BumpMode::MasterPatch | BumpMode::NoDevelopPatch => {
            version.patch = version
                .patch
                .checked_add(1)
                .ok_or_else(|| segment_overflow(&rendered))?;
        }
        BumpMode::DevelopMinor => {
            version.minor = version
                .minor
                .checked_add(1)
                .ok_or_else(|| segment_overflow(&rendered))?;
            version.patch = 0;
        }
    }
    Ok(version)
}

fn segment_overflow(version: &str) -> ReleaseError {
    ReleaseError::manifest_read(format!(
        "version segment overflow bumping '{}'",
        version
    ))
}
