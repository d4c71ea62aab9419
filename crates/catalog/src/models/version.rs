use crate::error::Error;
use crate::models::rank;

/// A release of a project, keyed by its canonical version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub id: i64,
    pub project_id: i64,
    /// Canonical version (`1`, `2.1.dev1`).
    pub name: String,
    /// The spelling first seen (`1.0`, `2.1-dev1`).
    pub display_name: String,
    /// Dense rank among the project's versions; highest is latest.
    pub ordering: u32,
}

#[derive(sqlx::FromRow)]
pub(crate) struct VersionRow {
    pub(crate) id: i64,
    pub(crate) project_id: i64,
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) ordering: i64,
}
impl TryFrom<VersionRow> for Version {
    type Error = Error;
    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            display_name: row.display_name,
            ordering: rank(row.ordering)?,
        })
    }
}
