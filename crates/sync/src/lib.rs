//! Synchronization between a package index and the wheelhouse catalog.
//!
//! Three passes, each exposed as a [`Stream`](futures::Stream) of progress
//! events so the caller can report on them, or stop between items by
//! dropping the stream:
//!
//! - [`rescan`]: register the latest release of every project the index
//!   lists. Used to baseline an empty catalog.
//! - [`tail_changelog`] / [`resume`]: apply the index's changelog from a
//!   serial onwards, advancing the catalog's cursor with every event.
//! - [`reconcile_orphans`]: retry wheels the changelog mentioned before the
//!   index could describe them.
//!
//! None of the passes retry failed requests; a failure ends the stream with
//! an error and everything committed before it stays.

mod asset;
mod changelog;
pub mod error;
mod orphans;
mod rescan;

pub use crate::changelog::{Change, ChangelogEvent, resume, tail_changelog};
pub use crate::orphans::{DEFAULT_MAX_AGE, OrphanEvent, reconcile_orphans};
pub use crate::rescan::{RescanEvent, rescan};

#[cfg(test)]
pub(crate) mod tests {
    use time::UtcDateTime;
    use wheelhouse_catalog::{Catalog, Database};
    use wheelhouse_index::Asset;

    pub(crate) async fn catalog() -> Catalog {
        let db = Database::connect_in_memory().await.unwrap();
        Catalog::from(&db)
    }

    pub(crate) fn wheel(filename: &str) -> Asset {
        Asset::new(
            filename,
            format!("https://files.example/{filename}"),
            1024,
            "D41D8CD98F00B204E9800998ECF8427E",
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855",
            UtcDateTime::from_unix_timestamp(1_500_000_000).unwrap(),
        )
    }
}
