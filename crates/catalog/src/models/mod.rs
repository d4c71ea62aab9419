mod artifact;
mod inspection;
mod orphan;
mod project;
mod version;

pub use self::artifact::{Artifact, NewArtifact};
pub(crate) use self::artifact::ArtifactRow;
pub use self::inspection::{Inspection, InspectionError};
pub(crate) use self::inspection::{ErrorRow, InspectionRow};
pub use self::orphan::Orphan;
pub(crate) use self::orphan::OrphanRow;
pub use self::project::{Project, ProjectRef};
pub(crate) use self::project::ProjectRow;
pub use self::version::Version;
pub(crate) use self::version::VersionRow;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

/// Timestamps are stored as whole seconds since the Unix epoch.
pub(crate) fn timestamp(seconds: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn rank(ordering: i64) -> Result<u32> {
    u32::try_from(ordering).or_raise(|| ErrorKind::InvalidData("ordering"))
}
