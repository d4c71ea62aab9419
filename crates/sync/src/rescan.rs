//! Full rescan of the package index.

use crate::asset::new_artifact;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use wheelhouse_catalog::Catalog;
use wheelhouse_catalog::error::Result as CatalogResult;
use wheelhouse_index::{ClientHandle, ProjectData};
use wheelhouse_naming::{is_wheel, latest_version};

/// Progress events emitted by [`rescan`].
///
/// 1. [`Started`](Self::Started): exactly once, after the cursor is set.
/// 2. [`ProjectScanned`](Self::ProjectScanned): once per project the index lists.
/// 3. [`Complete`](Self::Complete): exactly once.
///
/// An error terminates the stream early, in which case [`Complete`](Self::Complete)
/// is never emitted. Projects scanned up to that point stay committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescanEvent {
    /// The catalog's cursor now points at the index's latest serial.
    Started { serial: u64 },
    /// A project was registered along with the wheels of its latest release.
    ProjectScanned {
        project: String,
        /// The release used, or `None` if the project has no releases.
        version: Option<String>,
        wheels: u64,
    },
    Complete,
}

/// Register every project the index knows about, along with the wheels of
/// its latest release.
///
/// The index's current serial is stored as the cursor *before* anything else
/// happens, so a [`tail_changelog`](crate::tail_changelog) pass afterwards
/// picks up whatever changes while the rescan runs. Nothing is ever removed:
/// if upstream deletions happened since the last tailing pass, a rescan can
/// bring deleted projects and versions back.
pub fn rescan<'a>(client: &'a ClientHandle, catalog: &'a Catalog) -> impl Stream<Item = Result<RescanEvent>> + 'a {
    stream!({
        tracing::info!(index = client.name(), "starting full rescan");
        let serial = match client.changelog_last_serial().await.or_raise(|| ErrorKind::Index) {
            Ok(serial) => serial,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(serial, "index changelog is at serial");
        if let Err(e) = catalog.set_serial(serial).await.or_raise(|| ErrorKind::Catalog) {
            yield Err(e);
            return;
        }
        yield Ok(RescanEvent::Started { serial });

        let mut packages = client.list_packages_stream();
        while let Some(package) = packages.next().await {
            let event = match package.or_raise(|| ErrorKind::Index) {
                Ok(name) => scan_project(client, catalog, name).await,
                Err(e) => Err(e),
            };
            let failed = event.is_err();
            yield event;
            if failed {
                return;
            }
        }
        tracing::info!("full rescan complete");
        yield Ok(RescanEvent::Complete);
    })
}

async fn scan_project(client: &ClientHandle, catalog: &Catalog, name: String) -> Result<RescanEvent> {
    tracing::info!(project = %name, "adding wheels for project");
    let data = client.project_data(&name).await.or_raise(|| ErrorKind::Index)?;
    let (version, wheels) = register(catalog, &name, data).await.or_raise(|| ErrorKind::Catalog)?;
    Ok(RescanEvent::ProjectScanned {
        project: name,
        version,
        wheels,
    })
}

/// Write one project in a single transaction.
async fn register(catalog: &Catalog, name: &str, data: Option<ProjectData>) -> CatalogResult<(Option<String>, u64)> {
    let mut tx = catalog.begin().await?;
    let project = tx.add_project(name).await?;
    let Some(mut data) = data.filter(|data| !data.releases.is_empty()) else {
        tracing::info!(project = %name, "project has no releases");
        tx.commit().await?;
        return Ok((None, 0));
    };
    let Some(latest) = latest_version(data.releases.keys()).cloned() else {
        tx.commit().await?;
        return Ok((None, 0));
    };
    tracing::info!(project = %name, version = %latest, "using latest version");
    let version = tx.add_version(&project, &latest).await?;
    let mut wheels = 0;
    for asset in data.releases.remove(&latest).unwrap_or_default() {
        if !is_wheel(&asset.filename) {
            tracing::debug!(filename = %asset.filename, "not a wheel; skipping");
            continue;
        }
        let Some(artifact) = new_artifact(&asset) else {
            continue;
        };
        tx.add_artifact(&version, &artifact).await?;
        wheels += 1;
    }
    tx.commit().await?;
    tracing::info!(project = %name, wheels, "wheels added");
    Ok((Some(latest), wheels))
}
