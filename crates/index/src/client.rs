//! Package index client trait.
//!
//! The catalog never talks HTTP (or XML-RPC) itself. Everything it needs from
//! the upstream index goes through [`IndexClient`], so the sync pipelines can
//! be driven by a real client in production and by
//! [`MockIndex`](crate::MockIndex) in tests.

use crate::error::Result;
use crate::models::{Asset, ChangelogEntry, ProjectData};
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;
use std::sync::Arc;

pub type PackageStream<'a> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>;
pub type ChangelogStream<'a> = Pin<Box<dyn Stream<Item = Result<ChangelogEntry>> + Send + 'a>>;

/// Shared, type-erased client handle.
pub type ClientHandle = Arc<dyn IndexClient>;

/// Read-only view of an upstream package index.
///
/// # Examples
///
/// ```
/// use futures::TryStreamExt;
/// # use wheelhouse_index::{IndexClient, error::Result};
/// # async fn example(client: &dyn IndexClient) -> Result<()> {
/// let mut packages = client.list_packages_stream();
/// while let Some(name) = packages.try_next().await? {
///     if let Some(data) = client.project_data(&name).await? {
///         println!("{name}: {} releases", data.releases.len());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Name of the index (used for logging only).
    fn name(&self) -> &str;

    /// Every project name the index knows about, as the index spells it.
    ///
    /// Default implementation collects [`list_packages_stream()`](Self::list_packages_stream).
    async fn list_packages(&self) -> Result<Vec<String>> {
        self.list_packages_stream().try_collect().await
    }

    /// Stream every project name the index knows about.
    fn list_packages_stream<'a>(&'a self) -> PackageStream<'a>;

    /// All releases and assets of a project, or `None` if the index doesn't
    /// know the project (anymore).
    async fn project_data(&self, project: &str) -> Result<Option<ProjectData>>;

    /// Look up one asset of one release.
    ///
    /// Default implementation fetches the whole project via
    /// [`project_data()`](Self::project_data) and picks the asset out of it.
    async fn asset_data(&self, project: &str, release: &str, filename: &str) -> Result<Option<Asset>> {
        let Some(data) = self.project_data(project).await? else {
            return Ok(None);
        };
        Ok(data.find_asset(release, filename).cloned())
    }

    /// Stream changelog events with a serial strictly greater than `serial`,
    /// in ascending serial order.
    fn changelog_since<'a>(&'a self, serial: u64) -> ChangelogStream<'a>;

    /// The serial of the most recent changelog event.
    async fn changelog_last_serial(&self) -> Result<u64>;
}
