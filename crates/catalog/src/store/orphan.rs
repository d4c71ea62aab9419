use super::Transaction;
use crate::error::{ErrorKind, Result};
use crate::models::{Orphan, OrphanRow, Version};
use exn::ResultExt;
use time::UtcDateTime;

impl Transaction {
    /// Remember a wheel the index couldn't describe yet. Seeing the same
    /// filename again only refreshes its timestamp.
    pub async fn add_orphan(&mut self, version: &Version, filename: &str, uploaded: UtcDateTime) -> Result<()> {
        sqlx::query(include_str!("../../queries/upsert_orphan.sql"))
            .bind(version.id)
            .bind(filename)
            .bind(uploaded.unix_timestamp())
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn list_orphans(&mut self) -> Result<Vec<Orphan>> {
        let rows: Vec<OrphanRow> = sqlx::query_as(include_str!("../../queries/list_orphans.sql"))
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Orphan::try_from).collect()
    }

    pub async fn remove_orphan(&mut self, filename: &str) -> Result<bool> {
        let result = sqlx::query(include_str!("../../queries/delete_orphan.sql"))
            .bind(filename)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
