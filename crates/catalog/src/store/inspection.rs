use super::Transaction;
use crate::error::{ErrorKind, Result};
use crate::models::{ErrorRow, Inspection, InspectionError, InspectionRow};
use exn::ResultExt;
use time::UtcDateTime;

impl Transaction {
    /// Store (or replace) the inspector's result for an artifact.
    ///
    /// Returns `false` if no artifact has that filename.
    pub async fn record_inspection(&mut self, filename: &str, payload: &serde_json::Value) -> Result<bool> {
        let Some(artifact) = self.get_artifact(filename).await? else {
            return Ok(false);
        };
        let payload = serde_json::to_string(payload).or_raise(|| ErrorKind::InvalidData("inspection payload"))?;
        sqlx::query(include_str!("../../queries/upsert_inspection.sql"))
            .bind(artifact.id)
            .bind(payload)
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(true)
    }

    /// Record a failed inspection attempt.
    ///
    /// Returns `false` if no artifact has that filename.
    pub async fn record_error(&mut self, filename: &str, message: &str) -> Result<bool> {
        let Some(artifact) = self.get_artifact(filename).await? else {
            return Ok(false);
        };
        sqlx::query(include_str!("../../queries/insert_error.sql"))
            .bind(artifact.id)
            .bind(message)
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(true)
    }

    pub async fn inspection(&mut self, filename: &str) -> Result<Option<Inspection>> {
        let row: Option<InspectionRow> = sqlx::query_as(include_str!("../../queries/get_inspection.sql"))
            .bind(filename)
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Inspection::try_from).transpose()
    }

    pub async fn errors(&mut self, filename: &str) -> Result<Vec<InspectionError>> {
        let rows: Vec<ErrorRow> = sqlx::query_as(include_str!("../../queries/list_errors.sql"))
            .bind(filename)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(InspectionError::try_from).collect()
    }
}
