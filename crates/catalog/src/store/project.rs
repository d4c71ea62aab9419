use super::Transaction;
use crate::error::{ErrorKind, Result};
use crate::models::{Project, ProjectRef, ProjectRow};
use exn::ResultExt;
use wheelhouse_naming::normalize_name;

impl Transaction {
    /// Register a project, or refresh the display name of the existing one.
    pub async fn add_project(&mut self, name: &str) -> Result<Project> {
        let row: ProjectRow = sqlx::query_as(include_str!("../../queries/upsert_project.sql"))
            .bind(normalize_name(name))
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.try_into()
    }

    /// Look up a project by any spelling of its name.
    pub async fn get_project(&mut self, name: &str) -> Result<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(include_str!("../../queries/get_project.sql"))
            .bind(normalize_name(name))
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Project::try_from).transpose()
    }

    pub async fn list_projects(&mut self) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(include_str!("../../queries/list_projects.sql"))
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Project::try_from).collect()
    }

    /// Delete every version of a project (and, by cascade, their artifacts,
    /// inspection results, errors and orphans). The project itself stays.
    ///
    /// Returns the number of versions deleted; unknown projects delete nothing.
    pub async fn remove_project(&mut self, name: &str) -> Result<u64> {
        let Some(project) = self.get_project(name).await? else {
            return Ok(0);
        };
        let result = sqlx::query(include_str!("../../queries/delete_project_versions.sql"))
            .bind(project.id)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(project = %project.name, versions = result.rows_affected(), "removed all versions of project");
        Ok(result.rows_affected())
    }

    pub(crate) async fn resolve_project(&mut self, project: ProjectRef<'_>) -> Result<Project> {
        match project {
            ProjectRef::Name(name) => self.add_project(name).await,
            ProjectRef::Project(project) => Ok(project.clone()),
        }
    }
}
