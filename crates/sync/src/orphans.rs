//! Orphan reconciliation.
//!
//! The changelog can mention a wheel before the index is able to describe
//! it. Such wheels are parked as orphans by [`tail_changelog`](crate::tail_changelog)
//! and retried here.

use crate::asset::new_artifact;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use time::{Duration, UtcDateTime};
use tracing::instrument;
use wheelhouse_catalog::error::Result as CatalogResult;
use wheelhouse_catalog::{Catalog, NewArtifact, Orphan};
use wheelhouse_index::ClientHandle;

/// How long to keep asking the index about an orphan before giving up.
pub const DEFAULT_MAX_AGE: Duration = Duration::DAY;

/// Progress events emitted by [`reconcile_orphans`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrphanEvent {
    /// Reconciliation has begun with this many orphans.
    Started(u64),
    /// The index now describes the wheel; it was registered as an artifact.
    Adopted(String),
    /// The orphan is older than the maximum age and was dropped.
    Abandoned(String),
    /// Still not described by the index; kept for a later pass.
    Waiting(String),
    Complete,
}

/// Retry every orphan against the index.
///
/// Orphans the index can now describe become artifacts. Those it still can't
/// are dropped once they're older than `max_age`, and left alone otherwise.
pub fn reconcile_orphans<'a>(
    client: &'a ClientHandle,
    catalog: &'a Catalog,
    max_age: Duration,
) -> impl Stream<Item = Result<OrphanEvent>> + 'a {
    stream!({
        let orphans = match catalog.list_orphans().await.or_raise(|| ErrorKind::Catalog) {
            Ok(orphans) => orphans,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(OrphanEvent::Started(u64::try_from(orphans.len()).unwrap_or(u64::MAX)));
        let cutoff = UtcDateTime::now() - max_age;
        for orphan in orphans {
            let event = reconcile(client, catalog, orphan, cutoff).await;
            let failed = event.is_err();
            yield event;
            if failed {
                return;
            }
        }
        yield Ok(OrphanEvent::Complete);
    })
}

#[instrument(skip_all, fields(filename = %orphan.filename))]
async fn reconcile(client: &ClientHandle, catalog: &Catalog, orphan: Orphan, cutoff: UtcDateTime) -> Result<OrphanEvent> {
    let asset = client
        .asset_data(&orphan.project, &orphan.version, &orphan.filename)
        .await
        .or_raise(|| ErrorKind::Index)?;
    let artifact = asset.as_ref().and_then(new_artifact);
    settle(catalog, orphan, artifact, cutoff).await.or_raise(|| ErrorKind::Catalog)
}

async fn settle(
    catalog: &Catalog,
    orphan: Orphan,
    artifact: Option<NewArtifact>,
    cutoff: UtcDateTime,
) -> CatalogResult<OrphanEvent> {
    let event = match artifact {
        Some(artifact) => {
            let mut tx = catalog.begin().await?;
            let version = tx.version_by_id(orphan.version_id).await?;
            tx.add_artifact(&version, &artifact).await?;
            tx.remove_orphan(&orphan.filename).await?;
            tx.commit().await?;
            tracing::info!("orphan adopted");
            OrphanEvent::Adopted(orphan.filename)
        },
        None if orphan.uploaded < cutoff => {
            let mut tx = catalog.begin().await?;
            tx.remove_orphan(&orphan.filename).await?;
            tx.commit().await?;
            tracing::info!(uploaded = %orphan.uploaded, "giving up on orphan");
            OrphanEvent::Abandoned(orphan.filename)
        },
        None => {
            tracing::debug!("orphan still not described by the index");
            OrphanEvent::Waiting(orphan.filename)
        },
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::tail_changelog;
    use crate::tests::{catalog, wheel};
    use futures::TryStreamExt;
    use std::sync::Arc;
    use wheelhouse_index::MockIndex;

    #[tokio::test]
    async fn test_orphan_lifecycle() {
        let catalog = catalog().await;
        let index = Arc::new(
            MockIndex::default()
                .with_event("FooBar", Some("1.0"), "add py3 file FooBar-1.0-py3-none-any.whl")
                .with_event("Stale", Some("0.1"), "add py3 file Stale-0.1-py3-none-any.whl"),
        );
        let client: ClientHandle = index.clone();
        let _: Vec<_> = tail_changelog(&client, &catalog, 0).try_collect().await.unwrap();
        assert_eq!(catalog.list_orphans().await.unwrap().len(), 2);

        // Nothing described yet. The mock's event timestamps are ancient, so
        // a short maximum age abandons them while a huge one keeps them.
        let events: Vec<OrphanEvent> =
            reconcile_orphans(&client, &catalog, Duration::days(365 * 100)).try_collect().await.unwrap();
        assert_eq!(
            events,
            vec![
                OrphanEvent::Started(2),
                OrphanEvent::Waiting("FooBar-1.0-py3-none-any.whl".to_string()),
                OrphanEvent::Waiting("Stale-0.1-py3-none-any.whl".to_string()),
                OrphanEvent::Complete,
            ]
        );

        index.add_asset("FooBar", "1.0", wheel("FooBar-1.0-py3-none-any.whl")).await;
        let events: Vec<OrphanEvent> = reconcile_orphans(&client, &catalog, DEFAULT_MAX_AGE).try_collect().await.unwrap();
        assert_eq!(
            events,
            vec![
                OrphanEvent::Started(2),
                OrphanEvent::Adopted("FooBar-1.0-py3-none-any.whl".to_string()),
                OrphanEvent::Abandoned("Stale-0.1-py3-none-any.whl".to_string()),
                OrphanEvent::Complete,
            ]
        );
        assert!(catalog.list_orphans().await.unwrap().is_empty());
        let artifact = catalog.get_artifact("FooBar-1.0-py3-none-any.whl").await.unwrap().unwrap();
        let version = catalog.get_version("foobar", "1.0").await.unwrap().unwrap();
        assert_eq!(artifact.version_id, version.id);
    }

    #[tokio::test]
    async fn test_failed_lookup_ends_pass() {
        let catalog = catalog().await;
        let index = Arc::new(MockIndex::default().with_event(
            "FooBar",
            Some("1.0"),
            "add py3 file FooBar-1.0-py3-none-any.whl",
        ));
        let client: ClientHandle = index.clone();
        let _: Vec<_> = tail_changelog(&client, &catalog, 0).try_collect().await.unwrap();

        index.fail_asset("FooBar-1.0-py3-none-any.whl").await;
        let result: Result<Vec<OrphanEvent>> = reconcile_orphans(&client, &catalog, DEFAULT_MAX_AGE).try_collect().await;
        assert!(result.is_err());
        assert_eq!(catalog.list_orphans().await.unwrap().len(), 1);
    }
}
