use crate::action::Action;
use std::collections::{BTreeMap, HashMap};
use time::UtcDateTime;

/// Digest algorithm names as the index reports them.
pub const MD5: &str = "md5";
pub const SHA256: &str = "sha256";

/// One distribution file of a release, as described by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub filename: String,
    pub url: String,
    pub size: u64,
    /// Hex digests keyed by algorithm name (`md5`, `sha256`, ...).
    pub digests: HashMap<String, String>,
    pub upload_time: UtcDateTime,
}
impl Asset {
    pub fn new(
        filename: impl Into<String>,
        url: impl Into<String>,
        size: u64,
        md5: impl Into<String>,
        sha256: impl Into<String>,
        upload_time: UtcDateTime,
    ) -> Self {
        let digests = HashMap::from([(MD5.to_string(), md5.into()), (SHA256.to_string(), sha256.into())]);
        Self {
            filename: filename.into(),
            url: url.into(),
            size,
            digests,
            upload_time,
        }
    }

    /// Lowercase hex digest for the given algorithm, if the index reported one.
    pub fn digest(&self, algorithm: &str) -> Option<String> {
        self.digests.get(algorithm).map(|hex| hex.to_ascii_lowercase())
    }
}

/// Everything the index knows about a project, grouped by raw release string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectData {
    pub releases: BTreeMap<String, Vec<Asset>>,
}
impl ProjectData {
    pub fn find_asset(&self, release: &str, filename: &str) -> Option<&Asset> {
        self.releases.get(release)?.iter().find(|asset| asset.filename == filename)
    }
}

/// A single event from the index's changelog journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub project: String,
    pub release: Option<String>,
    pub timestamp: i64,
    pub action: Action,
    pub serial: u64,
}
impl ChangelogEntry {
    pub fn new(
        project: impl Into<String>,
        release: Option<&str>,
        timestamp: i64,
        action: impl Into<Action>,
        serial: u64,
    ) -> Self {
        Self {
            project: project.into(),
            release: release.map(str::to_string),
            timestamp,
            action: action.into(),
            serial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_lowercased() {
        let asset = Asset::new("a-1-py3-none-any.whl", "https://x/a", 1, "ABCDEF", "0123AB", UtcDateTime::UNIX_EPOCH);
        assert_eq!(asset.digest(MD5).as_deref(), Some("abcdef"));
        assert_eq!(asset.digest(SHA256).as_deref(), Some("0123ab"));
        assert_eq!(asset.digest("blake2b_256"), None);
    }

    #[test]
    fn test_find_asset() {
        let asset = Asset::new("a-1-py3-none-any.whl", "https://x/a", 1, "00", "11", UtcDateTime::UNIX_EPOCH);
        let data = ProjectData {
            releases: BTreeMap::from([("1".to_string(), vec![asset.clone()])]),
        };
        assert_eq!(data.find_asset("1", "a-1-py3-none-any.whl"), Some(&asset));
        assert_eq!(data.find_asset("1", "a-1.tar.gz"), None);
        assert_eq!(data.find_asset("2", "a-1-py3-none-any.whl"), None);
    }

    #[test]
    fn test_entry_parses_action() {
        let entry = ChangelogEntry::new("Foo", Some("1.0"), 0, "remove release", 7);
        assert_eq!(entry.action, Action::RemoveRelease);
        assert_eq!(entry.release.as_deref(), Some("1.0"));
    }
}
