//! Work queue for the artifact inspector.

use crate::Catalog;
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, ArtifactRow};
use exn::ResultExt;

impl Catalog {
    /// Artifacts still waiting for inspection.
    ///
    /// Only the latest version of each project is considered, and an artifact
    /// drops out of the queue as soon as it has an inspection result or at
    /// least one recorded error. Artifacts larger than `max_size` bytes are
    /// left out when a limit is given. Results are grouped by project, in
    /// artifact rank order.
    ///
    /// Nothing is claimed: two inspectors polling concurrently see the same
    /// artifacts.
    pub async fn pending_artifacts(&self, max_size: Option<u64>) -> Result<Vec<Artifact>> {
        // Anything past i64::MAX can't be stored, so it's as good as no limit.
        let max_size = max_size.map(|size| i64::try_from(size).unwrap_or(i64::MAX));
        let rows: Vec<ArtifactRow> = sqlx::query_as(include_str!("../queries/pending_artifacts.sql"))
            .bind(max_size)
            .fetch_all(self.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Artifact::try_from).collect()
    }
}
