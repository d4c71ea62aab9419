//! Version Precedence
//!
//! Two orderings live here. [`Pep440`] implements [`Ord`] with plain PEP 440
//! semantics. [`VersionKey`] is the catalog's notion of "newer": it wraps the
//! PEP 440 order but ranks every final release above every pre-release, so a
//! freshly uploaded `2.1.dev1` never displaces `2.0` as the latest version.

use crate::version::{LocalSegment, Numeral, Pep440, PreRelease};
use std::cmp::Ordering;

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PreKey<'a> {
    // A dev release of a final version (`1.0.dev0`) sorts before `1.0a0`.
    DevOnly,
    Tagged(PreRelease, &'a Numeral),
    Final,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum DevKey<'a> {
    Dev(&'a Numeral),
    Final,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct CmpKey<'a> {
    epoch: &'a Numeral,
    release: &'a [Numeral],
    pre: PreKey<'a>,
    post: Option<&'a Numeral>,
    dev: DevKey<'a>,
    local: Option<&'a [LocalSegment]>,
}

impl Pep440 {
    fn cmp_key(&self) -> CmpKey<'_> {
        let pre = match (&self.pre, &self.post, &self.dev) {
            (Some((phase, number)), _, _) => PreKey::Tagged(*phase, number),
            (None, None, Some(_)) => PreKey::DevOnly,
            (None, _, _) => PreKey::Final,
        };
        CmpKey {
            epoch: &self.epoch,
            release: self.significant_release(),
            pre,
            post: self.post.as_ref(),
            dev: self.dev.as_ref().map_or(DevKey::Final, DevKey::Dev),
            local: self.local.as_deref(),
        }
    }
}
impl Ord for Pep440 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_key().cmp(&other.cmp_key())
    }
}
impl PartialOrd for Pep440 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Pep440 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Pep440 {}

/// Sort key deciding which of a project's versions is the latest.
///
/// Variant order is significant: strings that don't parse as PEP 440 rank
/// below everything else, then pre-releases, then final releases.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionKey {
    Invalid(String),
    Prerelease(Pep440),
    Release(Pep440),
}

/// Build the [`VersionKey`] for a (raw or canonical) version string.
pub fn version_sort_key(version: &str) -> VersionKey {
    match version.parse::<Pep440>() {
        Ok(parsed) if parsed.is_prerelease() => VersionKey::Prerelease(parsed),
        Ok(parsed) => VersionKey::Release(parsed),
        Err(_) => VersionKey::Invalid(version.to_string()),
    }
}

/// Pick the latest of a set of version strings according to [`version_sort_key`].
///
/// Returns `None` only when `versions` is empty.
pub fn latest_version<I, S>(versions: I) -> Option<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions.into_iter().max_by_key(|v| version_sort_key(v.as_ref()))
}
