use crate::error::{Error, ErrorKind};
use crate::models::timestamp;
use exn::ResultExt;
use time::UtcDateTime;

/// The inspector's findings for an artifact. The payload is opaque here.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub payload: serde_json::Value,
    pub recorded_at: UtcDateTime,
}

/// A failed attempt at inspecting an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionError {
    pub message: String,
    pub recorded_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct InspectionRow {
    payload: String,
    recorded_at: i64,
}
impl TryFrom<InspectionRow> for Inspection {
    type Error = Error;
    fn try_from(row: InspectionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payload: serde_json::from_str(&row.payload).or_raise(|| ErrorKind::InvalidData("inspection payload"))?,
            recorded_at: timestamp(row.recorded_at, "inspection time")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ErrorRow {
    message: String,
    recorded_at: i64,
}
impl TryFrom<ErrorRow> for InspectionError {
    type Error = Error;
    fn try_from(row: ErrorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            message: row.message,
            recorded_at: timestamp(row.recorded_at, "error time")?,
        })
    }
}
