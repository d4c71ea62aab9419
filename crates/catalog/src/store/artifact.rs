use super::{Transaction, reranked};
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, ArtifactRow, NewArtifact, Version};
use exn::ResultExt;
use wheelhouse_naming::wheel_sort_key;

impl Transaction {
    /// Register a wheel under a version.
    ///
    /// Filenames are unique across the whole catalog and the first
    /// registration wins: if the filename is already known the existing
    /// artifact is returned and everything else in `artifact` is ignored.
    pub async fn add_artifact(&mut self, version: &Version, artifact: &NewArtifact) -> Result<Artifact> {
        if let Some(existing) = self.get_artifact(&artifact.filename).await? {
            return Ok(existing);
        }
        let size = i64::try_from(artifact.size).or_raise(|| ErrorKind::InvalidData("artifact size"))?;
        let id: i64 = sqlx::query_scalar(include_str!("../../queries/insert_artifact.sql"))
            .bind(version.id)
            .bind(&artifact.filename)
            .bind(&artifact.url)
            .bind(size)
            .bind(artifact.md5.to_ascii_lowercase())
            .bind(artifact.sha256.to_ascii_lowercase())
            .bind(artifact.uploaded.unix_timestamp())
            .fetch_one(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(filename = %artifact.filename, version = %version.name, "registered artifact");
        self.rank_artifacts(version.id).await?;
        self.artifact_by_id(id).await
    }

    pub async fn get_artifact(&mut self, filename: &str) -> Result<Option<Artifact>> {
        let row: Option<ArtifactRow> = sqlx::query_as(include_str!("../../queries/get_artifact.sql"))
            .bind(filename)
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Artifact::try_from).transpose()
    }

    /// All artifacts of a version, in rank order.
    pub async fn list_artifacts(&mut self, version: &Version) -> Result<Vec<Artifact>> {
        let rows: Vec<ArtifactRow> = sqlx::query_as(include_str!("../../queries/list_artifacts.sql"))
            .bind(version.id)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Artifact::try_from).collect()
    }

    /// Delete an artifact along with any orphan record of the same filename.
    ///
    /// Returns `false` if no artifact had that filename.
    pub async fn remove_artifact(&mut self, filename: &str) -> Result<bool> {
        self.remove_orphan(filename).await?;
        let Some(artifact) = self.get_artifact(filename).await? else {
            return Ok(false);
        };
        sqlx::query(include_str!("../../queries/delete_artifact.sql"))
            .bind(artifact.id)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(filename, "removed artifact");
        self.rank_artifacts(artifact.version_id).await?;
        Ok(true)
    }

    async fn artifact_by_id(&mut self, id: i64) -> Result<Artifact> {
        let row: ArtifactRow = sqlx::query_as(include_str!("../../queries/get_artifact_by_id.sql"))
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.try_into()
    }

    async fn rank_artifacts(&mut self, version_id: i64) -> Result<()> {
        let siblings: Vec<(i64, String, i64)> = sqlx::query_as(include_str!("../../queries/list_artifact_ranks.sql"))
            .bind(version_id)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (id, ordering) in reranked(siblings, wheel_sort_key) {
            sqlx::query(include_str!("../../queries/update_artifact_rank.sql"))
                .bind(id)
                .bind(ordering)
                .execute(&mut *self.tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }
}
