//! Name and version normalization for the wheelhouse catalog.
//!
//! The package index is lenient about spelling: `FooBar`, `foobar` and
//! `foo_bar` name the same project, and `1.0`, `1.0.0` and `v1.0` name the
//! same release. Everything the catalog stores is keyed by the canonical form
//! produced here, while the raw spelling is kept separately for display.
//!
//! This crate also owns the two sort keys the catalog ranks siblings with:
//! [`version_sort_key`] for the versions of a project, and [`wheel_sort_key`]
//! for the wheels of a version.

mod compare;
mod consts;
pub mod error;
mod name;
mod version;
mod wheel;

pub use crate::compare::{VersionKey, latest_version, version_sort_key};
pub use crate::consts::WHEEL_SUFFIX;
pub use crate::name::normalize_name;
pub use crate::version::{LocalSegment, Numeral, Pep440, PreRelease, canonicalize_version};
pub use crate::wheel::{BuildTag, WheelFilename, WheelKey, is_wheel, wheel_sort_key};
