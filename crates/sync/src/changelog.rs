//! Incremental changelog tailing.

use crate::asset::new_artifact;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use time::UtcDateTime;
use wheelhouse_catalog::error::Result as CatalogResult;
use wheelhouse_catalog::{Catalog, NewArtifact, Transaction};
use wheelhouse_index::{Action, ChangelogEntry, ClientHandle};
use wheelhouse_naming::is_wheel;

/// Progress events emitted by [`tail_changelog`] and [`resume`].
///
/// An error terminates the stream early. Every [`Applied`](Self::Applied)
/// event before it has been committed, cursor included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogEvent {
    /// Tailing starts after this serial.
    Started { since: u64 },
    /// An event was applied and the cursor moved to its serial.
    Applied { serial: u64, change: Change },
    /// No more events; the cursor is at `serial`.
    Complete { serial: u64 },
}

/// What applying a single changelog event did to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    ArtifactAdded(String),
    /// The index couldn't describe the wheel yet; see [`reconcile_orphans`](crate::reconcile_orphans).
    OrphanRecorded(String),
    ArtifactRemoved(String),
    ProjectAdded(String),
    ProjectRemoved(String),
    VersionAdded { project: String, version: String },
    VersionRemoved { project: String, version: String },
    /// Nothing to do for this event; only the cursor moved.
    Ignored,
}

/// Apply every changelog event after `since`, in serial order.
///
/// Each event is applied in its own transaction together with the cursor
/// advance, so stopping at any point (an error, or dropping the stream)
/// leaves the catalog exactly as if the changelog ended at the last
/// committed event. Running again from the stored cursor carries on from
/// there.
pub fn tail_changelog<'a>(
    client: &'a ClientHandle,
    catalog: &'a Catalog,
    since: u64,
) -> impl Stream<Item = Result<ChangelogEvent>> + 'a {
    stream!({
        tracing::info!(index = client.name(), since, "tailing changelog");
        yield Ok(ChangelogEvent::Started { since });
        let mut serial = since;
        let mut entries = client.changelog_since(since);
        while let Some(entry) = entries.next().await {
            let entry = match entry.or_raise(|| ErrorKind::Index) {
                Ok(entry) => entry,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            match apply(client, catalog, &entry).await {
                Ok(change) => {
                    serial = entry.serial;
                    yield Ok(ChangelogEvent::Applied { serial, change });
                },
                Err(e) => {
                    yield Err(e);
                    return;
                },
            }
        }
        tracing::info!(serial, "changelog tailing complete");
        yield Ok(ChangelogEvent::Complete { serial });
    })
}

/// [`tail_changelog`] from wherever the catalog's cursor points.
///
/// Fails with [`NoCursor`](ErrorKind::NoCursor) if the catalog was never
/// synchronized.
pub fn resume<'a>(client: &'a ClientHandle, catalog: &'a Catalog) -> impl Stream<Item = Result<ChangelogEvent>> + 'a {
    stream!({
        let since = match catalog.serial().await.or_raise(|| ErrorKind::Catalog) {
            Ok(Some(serial)) => serial,
            Ok(None) => {
                yield Err(exn::Exn::from(ErrorKind::NoCursor));
                return;
            },
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        for await event in tail_changelog(client, catalog, since) {
            yield event;
        }
    })
}

/// What the network told us before the transaction opened.
enum Lookup {
    NotNeeded,
    Found(NewArtifact),
    Missing,
}

async fn apply(client: &ClientHandle, catalog: &Catalog, entry: &ChangelogEntry) -> Result<Change> {
    let lookup = match (&entry.action, &entry.release) {
        (Action::AddFile { filename, .. }, Some(release)) if is_wheel(filename) => {
            let asset = client.asset_data(&entry.project, release, filename).await.or_raise(|| ErrorKind::Index)?;
            match asset.as_ref().and_then(new_artifact) {
                Some(artifact) => Lookup::Found(artifact),
                None => Lookup::Missing,
            }
        },
        _ => Lookup::NotNeeded,
    };
    let mut tx = catalog.begin().await.or_raise(|| ErrorKind::Catalog)?;
    let change = mutate(&mut tx, entry, lookup).await.or_raise(|| ErrorKind::Catalog)?;
    tx.set_serial(entry.serial).await.or_raise(|| ErrorKind::Catalog)?;
    tx.commit().await.or_raise(|| ErrorKind::Catalog)?;
    Ok(change)
}

async fn mutate(tx: &mut Transaction, entry: &ChangelogEntry, lookup: Lookup) -> CatalogResult<Change> {
    let serial = entry.serial;
    let project = entry.project.as_str();
    let release = entry.release.as_deref();
    let change = match (&entry.action, release) {
        (Action::AddFile { filename, .. }, Some(release)) if is_wheel(filename) => {
            tracing::info!(serial, filename = %filename, "wheel added");
            let version = tx.add_version(project, release).await?;
            match lookup {
                Lookup::Found(artifact) => {
                    tx.add_artifact(&version, &artifact).await?;
                    tx.remove_orphan(filename).await?;
                    Change::ArtifactAdded(filename.clone())
                },
                Lookup::Missing | Lookup::NotNeeded => {
                    tracing::info!(filename = %filename, "asset not described by the index yet; will check later");
                    tx.add_orphan(&version, filename, event_time(entry)).await?;
                    Change::OrphanRecorded(filename.clone())
                },
            }
        },
        (Action::RemoveFile { filename }, _) if is_wheel(filename) => {
            tracing::info!(serial, filename = %filename, "wheel removed");
            tx.remove_artifact(filename).await?;
            Change::ArtifactRemoved(filename.clone())
        },
        (Action::CreateProject, _) => {
            tracing::info!(serial, project, "project created");
            tx.add_project(project).await?;
            Change::ProjectAdded(project.to_string())
        },
        (Action::RemoveProject, _) => {
            tracing::info!(serial, project, "project removed");
            tx.remove_project(project).await?;
            Change::ProjectRemoved(project.to_string())
        },
        (Action::NewRelease, Some(release)) => {
            tracing::info!(serial, project, version = release, "version released");
            tx.add_version(project, release).await?;
            Change::VersionAdded {
                project: project.to_string(),
                version: release.to_string(),
            }
        },
        (Action::RemoveRelease, Some(release)) => {
            tracing::info!(serial, project, version = release, "version removed");
            tx.remove_version(project, release).await?;
            Change::VersionRemoved {
                project: project.to_string(),
                version: release.to_string(),
            }
        },
        (action, None) if requires_release(action) => {
            tracing::warn!(serial, project, ?action, "event has no release; ignoring");
            Change::Ignored
        },
        (action, _) => {
            tracing::debug!(serial, ?action, "ignoring event");
            Change::Ignored
        },
    };
    Ok(change)
}

/// Whether the action would change the catalog, but only given a release.
fn requires_release(action: &Action) -> bool {
    match action {
        Action::AddFile { filename, .. } => is_wheel(filename),
        Action::NewRelease | Action::RemoveRelease => true,
        _ => false,
    }
}

fn event_time(entry: &ChangelogEntry) -> UtcDateTime {
    UtcDateTime::from_unix_timestamp(entry.timestamp).unwrap_or_else(|_| {
        tracing::warn!(serial = entry.serial, timestamp = entry.timestamp, "event timestamp out of range");
        UtcDateTime::now()
    })
}
