use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Duration, UtcDateTime};
use wheelhouse_catalog::Catalog;
use wheelhouse_catalog::error::Result;

/// Snapshot of how far the catalog has synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub serial: Option<u64>,
    pub projects: usize,
    pub orphans: usize,
    /// Orphans older than the configured maximum age; the next
    /// reconciliation pass gives up on these.
    pub expired_orphans: usize,
}
impl Status {
    pub async fn collect(catalog: &Catalog, max_age: Duration) -> Result<Self> {
        let serial = catalog.serial().await?;
        let projects = catalog.list_projects().await?.len();
        let orphans = catalog.list_orphans().await?;
        let cutoff = UtcDateTime::now() - max_age;
        let expired_orphans = orphans.iter().filter(|orphan| orphan.uploaded < cutoff).count();
        Ok(Self {
            serial,
            projects,
            orphans: orphans.len(),
            expired_orphans,
        })
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.serial {
            Some(serial) => writeln!(f, "serial:   {serial}")?,
            None => writeln!(f, "serial:   none (run a full rescan first)")?,
        }
        writeln!(f, "projects: {}", self.projects)?;
        write!(f, "orphans:  {} ({} expired)", self.orphans, self.expired_orphans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelhouse_catalog::Database;

    #[tokio::test]
    async fn test_empty_catalog() {
        let db = Database::connect_in_memory().await.unwrap();
        let status = Status::collect(&Catalog::from(&db), Duration::DAY).await.unwrap();
        assert_eq!(
            status,
            Status {
                serial: None,
                projects: 0,
                orphans: 0,
                expired_orphans: 0
            }
        );
        assert!(status.to_string().contains("none (run a full rescan first)"));
    }

    #[tokio::test]
    async fn test_expired_orphans_follow_max_age() {
        let db = Database::connect_in_memory().await.unwrap();
        let catalog = Catalog::from(&db);
        catalog.set_serial(42).await.unwrap();
        let version = catalog.add_version("FooBar", "1.0").await.unwrap();
        catalog.add_project("Other").await.unwrap();
        let mut tx = catalog.begin().await.unwrap();
        tx.add_orphan(&version, "FooBar-1.0-py3-none-any.whl", UtcDateTime::now() - Duration::hours(2))
            .await
            .unwrap();
        tx.add_orphan(&version, "FooBar-1.0-py2-none-any.whl", UtcDateTime::now() - Duration::days(3))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let status = Status::collect(&catalog, Duration::DAY).await.unwrap();
        assert_eq!(status.serial, Some(42));
        assert_eq!(status.projects, 2);
        assert_eq!(status.orphans, 2);
        assert_eq!(status.expired_orphans, 1);
        assert_eq!(status.to_string(), "serial:   42\nprojects: 2\norphans:  2 (1 expired)");

        let status = Status::collect(&catalog, Duration::hours(1)).await.unwrap();
        assert_eq!(status.expired_orphans, 2);
    }
}
