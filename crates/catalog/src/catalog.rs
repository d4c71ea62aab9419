//! One-shot catalog operations.
//!
//! Each method opens a transaction, performs a single [`Transaction`]
//! operation and commits. Use [`Catalog::begin()`] directly when several
//! changes must land together.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, Inspection, InspectionError, NewArtifact, Orphan, Project, ProjectRef, Version};
use crate::store::Transaction;
use exn::ResultExt;
use sqlx::SqlitePool;

/// Handle on the catalog database.
///
/// # Relationships
///
/// - A project has many versions, ranked by version precedence
/// - A version has many artifacts (wheels), ranked by wheel filename
/// - An artifact has at most one inspection result, and any number of errors
/// - Deleting a version cascades to its artifacts, their inspection results
///   and errors, and to orphans expected under it
/// - Projects are never deleted
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
}
impl From<&Database> for Catalog {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Catalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction.
    pub async fn begin(&self) -> Result<Transaction> {
        let tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Ok(Transaction::new(tx))
    }

    // =========================================================================
    // Projects & Versions
    // =========================================================================

    pub async fn add_project(&self, name: &str) -> Result<Project> {
        let mut tx = self.begin().await?;
        let project = tx.add_project(name).await?;
        tx.commit().await?;
        Ok(project)
    }

    pub async fn get_project(&self, name: &str) -> Result<Option<Project>> {
        self.begin().await?.get_project(name).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.begin().await?.list_projects().await
    }

    pub async fn remove_project(&self, name: &str) -> Result<u64> {
        let mut tx = self.begin().await?;
        let removed = tx.remove_project(name).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn add_version<'a>(&self, project: impl Into<ProjectRef<'a>>, version: &str) -> Result<Version> {
        let mut tx = self.begin().await?;
        let version = tx.add_version(project, version).await?;
        tx.commit().await?;
        Ok(version)
    }

    pub async fn get_version(&self, project: &str, version: &str) -> Result<Option<Version>> {
        self.begin().await?.get_version(project, version).await
    }

    pub async fn latest_version(&self, project: &str) -> Result<Option<Version>> {
        self.begin().await?.latest_version(project).await
    }

    pub async fn list_versions(&self, project: &str) -> Result<Vec<Version>> {
        self.begin().await?.list_versions(project).await
    }

    pub async fn remove_version(&self, project: &str, version: &str) -> Result<bool> {
        let mut tx = self.begin().await?;
        let removed = tx.remove_version(project, version).await?;
        tx.commit().await?;
        Ok(removed)
    }

    // =========================================================================
    // Artifacts & Orphans
    // =========================================================================

    pub async fn add_artifact(&self, version: &Version, artifact: &NewArtifact) -> Result<Artifact> {
        let mut tx = self.begin().await?;
        let artifact = tx.add_artifact(version, artifact).await?;
        tx.commit().await?;
        Ok(artifact)
    }

    pub async fn get_artifact(&self, filename: &str) -> Result<Option<Artifact>> {
        self.begin().await?.get_artifact(filename).await
    }

    pub async fn list_artifacts(&self, version: &Version) -> Result<Vec<Artifact>> {
        self.begin().await?.list_artifacts(version).await
    }

    pub async fn remove_artifact(&self, filename: &str) -> Result<bool> {
        let mut tx = self.begin().await?;
        let removed = tx.remove_artifact(filename).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn list_orphans(&self) -> Result<Vec<Orphan>> {
        self.begin().await?.list_orphans().await
    }

    // =========================================================================
    // Sync Cursor
    // =========================================================================

    pub async fn serial(&self) -> Result<Option<u64>> {
        self.begin().await?.serial().await
    }

    pub async fn set_serial(&self, serial: u64) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.set_serial(serial).await?;
        tx.commit().await
    }

    // =========================================================================
    // Inspector Write-back
    // =========================================================================

    pub async fn record_inspection(&self, filename: &str, payload: &serde_json::Value) -> Result<bool> {
        let mut tx = self.begin().await?;
        let recorded = tx.record_inspection(filename, payload).await?;
        tx.commit().await?;
        Ok(recorded)
    }

    pub async fn record_error(&self, filename: &str, message: &str) -> Result<bool> {
        let mut tx = self.begin().await?;
        let recorded = tx.record_error(filename, message).await?;
        tx.commit().await?;
        Ok(recorded)
    }

    pub async fn inspection(&self, filename: &str) -> Result<Option<Inspection>> {
        self.begin().await?.inspection(filename).await
    }

    pub async fn errors(&self, filename: &str) -> Result<Vec<InspectionError>> {
        self.begin().await?.errors(filename).await
    }
}
