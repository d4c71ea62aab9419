use super::Transaction;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;

impl Transaction {
    /// The serial of the last changelog event fully applied, if the catalog
    /// was ever synchronized.
    pub async fn serial(&mut self) -> Result<Option<u64>> {
        let serial: Option<i64> = sqlx::query_scalar(include_str!("../../queries/get_serial.sql"))
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        serial.map(|s| u64::try_from(s).or_raise(|| ErrorKind::InvalidData("serial"))).transpose()
    }

    /// Advance the cursor. A serial lower than the stored one is ignored.
    pub async fn set_serial(&mut self, serial: u64) -> Result<()> {
        let serial = i64::try_from(serial).or_raise(|| ErrorKind::InvalidData("serial"))?;
        sqlx::query(include_str!("../../queries/set_serial.sql"))
            .bind(serial)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
