use crate::error::Error;
use crate::models::timestamp;
use time::UtcDateTime;

/// A wheel seen in the changelog before the index could describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    pub id: i64,
    pub version_id: i64,
    pub filename: String,
    /// When the changelog last mentioned the file.
    pub uploaded: UtcDateTime,
    /// Normalized name of the owning project.
    pub project: String,
    /// Display string of the owning version, as the index knows it.
    pub version: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct OrphanRow {
    id: i64,
    version_id: i64,
    filename: String,
    uploaded: i64,
    project: String,
    version: String,
}
impl TryFrom<OrphanRow> for Orphan {
    type Error = Error;
    fn try_from(row: OrphanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            version_id: row.version_id,
            filename: row.filename,
            uploaded: timestamp(row.uploaded, "orphan upload time")?,
            project: row.project,
            version: row.version,
        })
    }
}
