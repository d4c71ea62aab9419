use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

pub(crate) const APPLICATION: &str = "wheelhouse";
const DATABASE_FILENAME: &str = "catalog.sqlite";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite catalog database.
    pub database: PathBuf,
    /// Default log filter, used when `RUST_LOG` isn't set.
    pub log_level: String,
    pub queue: QueueConfig,
    pub orphans: OrphanConfig,
}
impl Default for Config {
    fn default() -> Self {
        let database = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILENAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILENAME));
        Self {
            database,
            log_level: "info".to_string(),
            queue: QueueConfig::default(),
            orphans: OrphanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Leave artifacts larger than this many bytes out of the work queue.
    pub max_artifact_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrphanConfig {
    /// Seconds to keep retrying an orphan before giving up on it.
    pub max_age: u64,
}
impl Default for OrphanConfig {
    fn default() -> Self {
        Self { max_age: 86_400 }
    }
}
impl OrphanConfig {
    pub fn max_age(&self) -> Duration {
        Duration::seconds(i64::try_from(self.max_age).unwrap_or(i64::MAX))
    }
}
