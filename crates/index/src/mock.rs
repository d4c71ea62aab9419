//! In-memory package index for testing.

use crate::client::{ChangelogStream, IndexClient, PackageStream};
use crate::error::{ErrorKind, Result};
use crate::models::{Asset, ChangelogEntry, ProjectData};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use wheelhouse_naming::normalize_name;

#[derive(Default)]
struct State {
    projects: BTreeMap<String, ProjectData>,
    changelog: Vec<ChangelogEntry>,
    failing: HashSet<String>,
}
impl State {
    fn project_key(&self, project: &str) -> Option<String> {
        let wanted = normalize_name(project);
        self.projects.keys().find(|key| normalize_name(key) == wanted).cloned()
    }

    fn project_mut(&mut self, project: &str) -> &mut ProjectData {
        let key = self.project_key(project).unwrap_or_else(|| project.to_string());
        self.projects.entry(key).or_default()
    }

    fn push_event(&mut self, project: &str, release: Option<&str>, action: &str) -> u64 {
        let serial = self.last_serial() + 1;
        self.changelog.push(ChangelogEntry::new(project, release, serial as i64, action, serial));
        serial
    }

    fn last_serial(&self) -> u64 {
        self.changelog.last().map_or(0, |entry| entry.serial)
    }
}

/// In-memory package index for testing.
///
/// Projects are looked up by normalized name, like the real index does.
/// Changelog events get consecutive serials starting at 1. Asset lookups for
/// filenames registered with [`fail_asset()`](Self::fail_asset) return a
/// retryable [`Network`](ErrorKind::Network) error until healed.
///
/// # Examples
///
/// ```
/// use wheelhouse_index::{Asset, IndexClient, MockIndex};
/// use time::UtcDateTime;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let wheel = Asset::new("FooBar-1.0-py3-none-any.whl", "https://files/foobar", 42, "aa", "bb", UtcDateTime::UNIX_EPOCH);
/// let index = MockIndex::default()
///     .with_release("FooBar", "1.0", vec![wheel])
///     .with_event("FooBar", Some("1.0"), "new release");
/// assert!(index.project_data("foobar").await?.is_some());
/// assert_eq!(index.changelog_last_serial().await?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockIndex {
    state: RwLock<State>,
}

impl MockIndex {
    /// Register a project without any releases.
    pub fn with_project(mut self, project: &str) -> Self {
        self.state.get_mut().project_mut(project);
        self
    }

    /// Register a release (and its project, if new).
    pub fn with_release(mut self, project: &str, release: &str, assets: Vec<Asset>) -> Self {
        let data = self.state.get_mut().project_mut(project);
        data.releases.entry(release.to_string()).or_default().extend(assets);
        self
    }

    /// Append a changelog event.
    pub fn with_event(mut self, project: &str, release: Option<&str>, action: &str) -> Self {
        self.state.get_mut().push_event(project, release, action);
        self
    }

    /// Add an asset to a release after construction.
    pub async fn add_asset(&self, project: &str, release: &str, asset: Asset) {
        let mut state = self.state.write().await;
        state.project_mut(project).releases.entry(release.to_string()).or_default().push(asset);
    }

    /// Forget a project entirely, as if it had been deleted upstream.
    ///
    /// No changelog event is recorded; push one separately if needed.
    pub async fn remove_project(&self, project: &str) {
        let mut state = self.state.write().await;
        if let Some(key) = state.project_key(project) {
            state.projects.remove(&key);
        }
    }

    /// Append a changelog event, returning its serial.
    pub async fn push_event(&self, project: &str, release: Option<&str>, action: &str) -> u64 {
        self.state.write().await.push_event(project, release, action)
    }

    /// Make every lookup of this asset fail.
    pub async fn fail_asset(&self, filename: &str) {
        self.state.write().await.failing.insert(filename.to_string());
    }

    /// Undo [`fail_asset()`](Self::fail_asset).
    pub async fn heal_asset(&self, filename: &str) {
        self.state.write().await.failing.remove(filename);
    }
}

#[async_trait]
impl IndexClient for MockIndex {
    fn name(&self) -> &str {
        "mock"
    }

    fn list_packages_stream<'a>(&'a self) -> PackageStream<'a> {
        Box::pin(stream! {
            // Snapshot under the read lock, then drop it before yielding.
            let names: Vec<String> = self.state.read().await.projects.keys().cloned().collect();
            for name in names {
                yield Ok(name);
            }
        })
    }

    async fn project_data(&self, project: &str) -> Result<Option<ProjectData>> {
        let state = self.state.read().await;
        Ok(state.project_key(project).and_then(|key| state.projects.get(&key).cloned()))
    }

    async fn asset_data(&self, project: &str, release: &str, filename: &str) -> Result<Option<Asset>> {
        let state = self.state.read().await;
        if state.failing.contains(filename) {
            exn::bail!(ErrorKind::Network(format!("injected failure looking up {filename}")));
        }
        let Some(key) = state.project_key(project) else {
            return Ok(None);
        };
        Ok(state.projects.get(&key).and_then(|data| data.find_asset(release, filename)).cloned())
    }

    fn changelog_since<'a>(&'a self, serial: u64) -> ChangelogStream<'a> {
        Box::pin(stream! {
            let entries: Vec<ChangelogEntry> = {
                let guard = self.state.read().await;
                guard.changelog.iter().filter(|entry| entry.serial > serial).cloned().collect()
            };
            for entry in entries {
                yield Ok(entry);
            }
        })
    }

    async fn changelog_last_serial(&self) -> Result<u64> {
        Ok(self.state.read().await.last_serial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use futures::TryStreamExt;
    use time::UtcDateTime;

    fn wheel(filename: &str) -> Asset {
        Asset::new(filename, format!("https://files/{filename}"), 10, "aa", "bb", UtcDateTime::UNIX_EPOCH)
    }

    #[tokio::test]
    async fn test_lookup_by_normalized_name() {
        let index = MockIndex::default().with_release("Foo_Bar", "1.0", vec![wheel("Foo_Bar-1.0-py3-none-any.whl")]);
        assert!(index.project_data("foo-bar").await.unwrap().is_some());
        assert!(index.project_data("FOO.BAR").await.unwrap().is_some());
        assert!(index.project_data("foobar").await.unwrap().is_none());
        assert_eq!(index.list_packages().await.unwrap(), vec!["Foo_Bar".to_string()]);
    }

    #[tokio::test]
    async fn test_asset_data() {
        let index = MockIndex::default().with_release("foo", "1.0", vec![wheel("foo-1.0-py3-none-any.whl")]);
        let asset = index.asset_data("foo", "1.0", "foo-1.0-py3-none-any.whl").await.unwrap();
        assert_eq!(asset.map(|a| a.url), Some("https://files/foo-1.0-py3-none-any.whl".to_string()));
        assert!(index.asset_data("foo", "2.0", "foo-1.0-py3-none-any.whl").await.unwrap().is_none());
        assert!(index.asset_data("bar", "1.0", "foo-1.0-py3-none-any.whl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let index = MockIndex::default().with_release("foo", "1.0", vec![wheel("foo-1.0-py3-none-any.whl")]);
        index.fail_asset("foo-1.0-py3-none-any.whl").await;
        let err = index.asset_data("foo", "1.0", "foo-1.0-py3-none-any.whl").await.unwrap_err();
        assert!(err.is_retryable());
        index.heal_asset("foo-1.0-py3-none-any.whl").await;
        assert!(index.asset_data("foo", "1.0", "foo-1.0-py3-none-any.whl").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_changelog_since() {
        let index = MockIndex::default()
            .with_event("foo", None, "create")
            .with_event("foo", Some("1.0"), "new release")
            .with_event("foo", Some("1.0"), "add py3 file foo-1.0-py3-none-any.whl");
        assert_eq!(index.changelog_last_serial().await.unwrap(), 3);

        let entries: Vec<ChangelogEntry> = index.changelog_since(1).try_collect().await.unwrap();
        assert_eq!(entries.iter().map(|e| e.serial).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(entries[0].action, Action::NewRelease);

        let serial = index.push_event("foo", None, "remove project").await;
        assert_eq!(serial, 4);
        let entries: Vec<ChangelogEntry> = index.changelog_since(3).try_collect().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, Action::RemoveProject);
    }
}
