//! Sync Error Types

use derive_more::{Display, Error};

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The package index failed to answer; the pass can be run again later.
    #[display("package index request failed")]
    Index,
    #[display("catalog update failed")]
    Catalog,
    /// Tailing needs a starting point. Run a full rescan first.
    #[display("catalog has never been synchronized")]
    NoCursor,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Index)
    }
}
