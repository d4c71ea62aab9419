use crate::error::{Error, ErrorKind};
use crate::models::{rank, timestamp};
use exn::ResultExt;
use time::UtcDateTime;

/// A wheel registered under a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: i64,
    pub version_id: i64,
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
    pub uploaded: UtcDateTime,
    /// Rank among the version's artifacts by wheel filename sort key.
    pub ordering: u32,
}

/// Everything needed to register an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
    pub uploaded: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct ArtifactRow {
    id: i64,
    version_id: i64,
    filename: String,
    url: String,
    size: i64,
    md5: String,
    sha256: String,
    uploaded: i64,
    ordering: i64,
}
impl TryFrom<ArtifactRow> for Artifact {
    type Error = Error;
    fn try_from(row: ArtifactRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            version_id: row.version_id,
            filename: row.filename,
            url: row.url,
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("artifact size"))?,
            md5: row.md5,
            sha256: row.sha256,
            uploaded: timestamp(row.uploaded, "upload time")?,
            ordering: rank(row.ordering)?,
        })
    }
}
