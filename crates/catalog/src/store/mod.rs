//! Transactional catalog mutations.
//!
//! Every read and write the catalog supports is a method on [`Transaction`],
//! split across the submodules by entity. Callers that need several changes
//! to land together (the sync engine commits an event's mutation and the
//! cursor advance as a unit) open one explicitly with
//! [`Catalog::begin()`](crate::Catalog::begin); everyone else uses the
//! one-shot wrappers on [`Catalog`](crate::Catalog).
//!
//! Dropping a [`Transaction`] without committing rolls it back.

mod artifact;
mod cursor;
mod inspection;
mod orphan;
mod project;
mod version;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::{Sqlite, SqliteConnection};

/// An open catalog transaction.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction {
    pub(crate) fn new(tx: sqlx::Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.or_raise(|| ErrorKind::Database)
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.or_raise(|| ErrorKind::Database)
    }

    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }
}

/// Compute dense ranks for a sibling set of `(id, sort source, current rank)`
/// rows, returning only the `(id, rank)` pairs that changed.
///
/// Ties on the sort key fall back to insertion order (row id) so the result
/// is deterministic.
fn reranked<K: Ord>(mut siblings: Vec<(i64, String, i64)>, key: impl Fn(&str) -> K) -> Vec<(i64, i64)> {
    siblings.sort_by_cached_key(|(id, source, _)| (key(source.as_str()), *id));
    siblings
        .into_iter()
        .enumerate()
        .filter_map(|(rank, (id, _, current))| {
            let rank = rank as i64;
            (rank != current).then_some((id, rank))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelhouse_naming::version_sort_key;

    fn row(id: i64, name: &str, rank: i64) -> (i64, String, i64) {
        (id, name.to_string(), rank)
    }

    #[test]
    fn test_reranked_only_returns_changes() {
        let siblings = vec![row(1, "1", 0), row(2, "2", 1), row(3, "1.5", 0)];
        let changes = reranked(siblings, version_sort_key);
        assert_eq!(changes, vec![(3, 1), (2, 2)]);
    }

    #[test]
    fn test_reranked_ties_by_id() {
        let siblings = vec![row(2, "same", 0), row(1, "same", 0)];
        assert_eq!(reranked(siblings, |s: &str| s.to_string()), vec![(2, 1)]);
    }

    #[test]
    fn test_reranked_nothing_to_do() {
        let siblings = vec![row(1, "1", 0), row(2, "2", 1)];
        assert!(reranked(siblings, version_sort_key).is_empty());
    }
}
