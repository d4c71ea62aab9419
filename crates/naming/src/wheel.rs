//! Wheel Filenames
//!
//! Wheel filenames encode the project, version, optional build tag and the
//! compatibility tags: `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.

use crate::compare::{VersionKey, version_sort_key};
use crate::consts::{BUILD_TAG_REGEX, WHEEL_SUFFIX};
use crate::error::{Error, ErrorKind};
use crate::name::normalize_name;
use exn::{OptionExt, ResultExt};
use std::str::FromStr;

/// Returns `true` if the filename has the wheel extension.
pub fn is_wheel(filename: &str) -> bool {
    filename.ends_with(WHEEL_SUFFIX)
}

/// Numeric build tag with its optional trailing label (`1`, `2ubuntu`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildTag {
    pub number: u64,
    pub suffix: String,
}

/// The components of a wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    pub project: String,
    pub version: String,
    pub build: Option<BuildTag>,
    pub python: String,
    pub abi: String,
    pub platform: String,
}
impl FromStr for WheelFilename {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::InvalidWheelFilename(s.to_string());
        let stem = s.strip_suffix(WHEEL_SUFFIX).ok_or_raise(invalid)?;
        let parts = stem.split('-').collect::<Vec<_>>();
        if parts.iter().any(|part| part.is_empty()) {
            exn::bail!(invalid());
        }
        let (project, version, build, python, abi, platform) = match parts.as_slice() {
            [project, version, python, abi, platform] => (*project, *version, None, *python, *abi, *platform),
            [project, version, build, python, abi, platform] => {
                let caps = BUILD_TAG_REGEX.captures(build).ok_or_raise(invalid)?;
                let number = caps[1].parse::<u64>().or_raise(invalid)?;
                let build = BuildTag { number, suffix: caps[2].to_string() };
                (*project, *version, Some(build), *python, *abi, *platform)
            },
            _ => exn::bail!(invalid()),
        };
        Ok(Self {
            project: project.to_string(),
            version: version.to_string(),
            build,
            python: python.to_string(),
            abi: abi.to_string(),
            platform: platform.to_string(),
        })
    }
}

/// Deterministic sort key for the wheels of a single version.
///
/// Filenames that can't be parsed sort first, by filename. The trailing
/// filename in [`WheelKey::Parsed`] breaks ties between wheels whose tags only
/// differ in case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WheelKey {
    Unparsed(String),
    Parsed {
        project: String,
        version: VersionKey,
        build: Option<BuildTag>,
        python: String,
        abi: String,
        platform: String,
        filename: String,
    },
}

/// Build the [`WheelKey`] for a filename.
pub fn wheel_sort_key(filename: &str) -> WheelKey {
    match filename.parse::<WheelFilename>() {
        Ok(wheel) => WheelKey::Parsed {
            project: normalize_name(&wheel.project),
            version: version_sort_key(&wheel.version),
            build: wheel.build,
            python: wheel.python,
            abi: wheel.abi,
            platform: wheel.platform,
            filename: filename.to_string(),
        },
        Err(_) => WheelKey::Unparsed(filename.to_string()),
    }
}
