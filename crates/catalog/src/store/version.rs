use super::{Transaction, reranked};
use crate::error::{ErrorKind, Result};
use crate::models::{ProjectRef, Version, VersionRow};
use exn::ResultExt;
use wheelhouse_naming::{canonicalize_version, version_sort_key};

impl Transaction {
    /// Register a version of a project, creating the project if needed.
    ///
    /// Repeat registrations (under any spelling that canonicalizes the same)
    /// return the existing version untouched. A new version triggers a
    /// re-rank of all of the project's versions.
    pub async fn add_version<'a>(&mut self, project: impl Into<ProjectRef<'a>>, version: &str) -> Result<Version> {
        let project = self.resolve_project(project.into()).await?;
        let name = canonicalize_version(version);
        if let Some(existing) = self.find_version(project.id, &name).await? {
            return Ok(existing);
        }
        let id: i64 = sqlx::query_scalar(include_str!("../../queries/insert_version.sql"))
            .bind(project.id)
            .bind(&name)
            .bind(version)
            .fetch_one(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(project = %project.name, version = %name, "registered version");
        self.rank_versions(project.id).await?;
        self.version_by_id(id).await
    }

    /// Look up a version by any spelling of the project name and version.
    pub async fn get_version(&mut self, project: &str, version: &str) -> Result<Option<Version>> {
        let Some(project) = self.get_project(project).await? else {
            return Ok(None);
        };
        self.find_version(project.id, &canonicalize_version(version)).await
    }

    /// The highest-ranked version of a project, if it has any.
    pub async fn latest_version(&mut self, project: &str) -> Result<Option<Version>> {
        let Some(project) = self.get_project(project).await? else {
            return Ok(None);
        };
        let row: Option<VersionRow> = sqlx::query_as(include_str!("../../queries/latest_version.sql"))
            .bind(project.id)
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Version::try_from).transpose()
    }

    /// All versions of a project, oldest first.
    pub async fn list_versions(&mut self, project: &str) -> Result<Vec<Version>> {
        let Some(project) = self.get_project(project).await? else {
            return Ok(Vec::new());
        };
        let rows: Vec<VersionRow> = sqlx::query_as(include_str!("../../queries/list_versions.sql"))
            .bind(project.id)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Version::try_from).collect()
    }

    /// Delete a version with everything under it. Returns `false` if there
    /// was nothing to delete.
    pub async fn remove_version(&mut self, project: &str, version: &str) -> Result<bool> {
        let Some(version) = self.get_version(project, version).await? else {
            return Ok(false);
        };
        self.delete_version(&version).await?;
        Ok(true)
    }

    pub(crate) async fn delete_version(&mut self, version: &Version) -> Result<()> {
        sqlx::query(include_str!("../../queries/delete_version.sql"))
            .bind(version.id)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(version = %version.name, project_id = version.project_id, "removed version");
        self.rank_versions(version.project_id).await
    }

    async fn find_version(&mut self, project_id: i64, name: &str) -> Result<Option<Version>> {
        let row: Option<VersionRow> = sqlx::query_as(include_str!("../../queries/find_version.sql"))
            .bind(project_id)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Version::try_from).transpose()
    }

    /// Load a version by row id, e.g. the `version_id` of an artifact or orphan.
    pub async fn version_by_id(&mut self, id: i64) -> Result<Version> {
        let row: VersionRow = sqlx::query_as(include_str!("../../queries/get_version_by_id.sql"))
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.try_into()
    }

    /// Re-read the project's versions from the database and write back any
    /// ranks that moved.
    async fn rank_versions(&mut self, project_id: i64) -> Result<()> {
        let siblings: Vec<(i64, String, i64)> = sqlx::query_as(include_str!("../../queries/list_version_ranks.sql"))
            .bind(project_id)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (id, ordering) in reranked(siblings, version_sort_key) {
            sqlx::query(include_str!("../../queries/update_version_rank.sql"))
                .bind(id)
                .bind(ordering)
                .execute(&mut *self.tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }
}
