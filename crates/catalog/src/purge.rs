//! Retention policy.
//!
//! For every project with more than one version, keep at most three:
//!
//! 1. the latest version,
//! 2. the latest version that has any artifacts,
//! 3. the latest version with an inspected artifact (only looked for when
//!    there is a version with artifacts at all),
//!
//! and delete the rest.

use crate::Catalog;
use crate::error::{ErrorKind, Result};
use crate::models::{Version, VersionRow};
use exn::ResultExt;
use std::collections::HashSet;
use tracing::instrument;

/// A version deleted by [`Catalog::purge_old_versions()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgedVersion {
    /// Display name of the owning project.
    pub project: String,
    pub version: Version,
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    #[sqlx(flatten)]
    version: VersionRow,
    project: String,
    has_artifacts: bool,
    has_data: bool,
}

struct Candidate {
    version: Version,
    project: String,
    has_artifacts: bool,
    has_data: bool,
}
impl TryFrom<CandidateRow> for Candidate {
    type Error = crate::error::Error;
    fn try_from(row: CandidateRow) -> Result<Self> {
        Ok(Self {
            version: row.version.try_into()?,
            project: row.project,
            has_artifacts: row.has_artifacts,
            has_data: row.has_data,
        })
    }
}

/// Pick the ids worth keeping out of one project's versions, latest first.
fn anchors(versions: &[Candidate]) -> HashSet<i64> {
    let latest = versions.first();
    let with_artifacts = versions.iter().find(|c| c.has_artifacts);
    let with_data = with_artifacts.and_then(|_| versions.iter().find(|c| c.has_data));
    [latest, with_artifacts, with_data].into_iter().flatten().map(|c| c.version.id).collect()
}

impl Catalog {
    /// Delete versions no longer worth keeping, returning what was deleted.
    ///
    /// Runs as a single transaction.
    #[instrument("purging old versions", skip(self))]
    pub async fn purge_old_versions(&self) -> Result<Vec<PurgedVersion>> {
        let mut tx = self.begin().await?;
        let rows: Vec<CandidateRow> = sqlx::query_as(include_str!("../queries/purge_candidates.sql"))
            .fetch_all(tx.conn())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let candidates = rows.into_iter().map(Candidate::try_from).collect::<Result<Vec<_>>>()?;

        let mut purged = Vec::new();
        // Rows arrive grouped by project, latest version first.
        for project in candidates.chunk_by(|a, b| a.version.project_id == b.version.project_id) {
            let keep = anchors(project);
            for candidate in project {
                if keep.contains(&candidate.version.id) {
                    tracing::info!(project = %candidate.project, version = %candidate.version.display_name, "keeping version");
                    continue;
                }
                tracing::info!(project = %candidate.project, version = %candidate.version.display_name, "deleting version");
                tx.delete_version(&candidate.version).await?;
                purged.push(PurgedVersion {
                    project: candidate.project.clone(),
                    version: candidate.version.clone(),
                });
            }
        }
        tx.commit().await?;
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::tests::{catalog, wheel};
    use serde_json::json;

    fn versions(catalog_versions: &[crate::Version]) -> Vec<&str> {
        catalog_versions.iter().map(|v| v.display_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_keeps_latest_and_latest_with_data() {
        let catalog = catalog().await;
        let v1 = catalog.add_version("FooBar", "1.0").await.unwrap();
        catalog.add_version("FooBar", "1.5").await.unwrap();
        let v2 = catalog.add_version("FooBar", "2.0").await.unwrap();
        catalog.add_artifact(&v1, &wheel("FooBar-1.0-py3-none-any.whl", 1)).await.unwrap();
        catalog.add_artifact(&v2, &wheel("FooBar-2.0-py3-none-any.whl", 1)).await.unwrap();
        catalog.record_inspection("FooBar-1.0-py3-none-any.whl", &json!({})).await.unwrap();

        let purged = catalog.purge_old_versions().await.unwrap();
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].project, "FooBar");
        assert_eq!(purged[0].version.display_name, "1.5");

        let remaining = catalog.list_versions("FooBar").await.unwrap();
        assert_eq!(versions(&remaining), vec!["1.0", "2.0"]);
        // Ranks stay dense.
        assert_eq!(remaining.iter().map(|v| v.ordering).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_no_artifacts_keeps_only_latest() {
        let catalog = catalog().await;
        for version in ["1.0", "1.5", "2.0"] {
            catalog.add_version("FooBar", version).await.unwrap();
        }
        let purged = catalog.purge_old_versions().await.unwrap();
        assert_eq!(purged.len(), 2);
        assert_eq!(versions(&catalog.list_versions("FooBar").await.unwrap()), vec!["2.0"]);
    }

    #[tokio::test]
    async fn test_latest_with_artifacts_without_data() {
        let catalog = catalog().await;
        catalog.add_version("FooBar", "1.0").await.unwrap();
        let v15 = catalog.add_version("FooBar", "1.5").await.unwrap();
        catalog.add_version("FooBar", "2.0").await.unwrap();
        catalog.add_artifact(&v15, &wheel("FooBar-1.5-py3-none-any.whl", 1)).await.unwrap();

        catalog.purge_old_versions().await.unwrap();
        assert_eq!(versions(&catalog.list_versions("FooBar").await.unwrap()), vec!["1.5", "2.0"]);
    }

    #[tokio::test]
    async fn test_single_version_projects_are_untouched() {
        let catalog = catalog().await;
        catalog.add_version("lonely", "0.1").await.unwrap();
        catalog.add_project("empty").await.unwrap();
        assert!(catalog.purge_old_versions().await.unwrap().is_empty());
        assert_eq!(versions(&catalog.list_versions("lonely").await.unwrap()), vec!["0.1"]);
    }

    #[tokio::test]
    async fn test_purges_each_project_independently() {
        let catalog = catalog().await;
        for version in ["1.0", "2.0"] {
            catalog.add_version("alpha", version).await.unwrap();
            catalog.add_version("beta", version).await.unwrap();
        }
        let purged = catalog.purge_old_versions().await.unwrap();
        let mut pairs = purged.iter().map(|p| (p.project.as_str(), p.version.name.as_str())).collect::<Vec<_>>();
        pairs.sort();
        assert_eq!(pairs, vec![("alpha", "1"), ("beta", "1")]);
    }
}
