//! PEP 440 Versions
//!
//! Versions published to the index follow PEP 440. Two spellings of the same
//! version (`1.0` and `1.0.0`, `1.0-ALPHA.2` and `1.0a2`) must collapse to the
//! same catalog entry, so every version string is parsed and re-rendered in
//! its canonical form before it is stored or looked up.

use crate::consts::VERSION_REGEX;
use crate::error::{Error, ErrorKind, Result};
use exn::OptionExt;
use regex::Match;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Pre-release phase, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}
impl PreRelease {
    /// Returns the normalized spelling of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::ReleaseCandidate => "rc",
        }
    }
}

/// A non-negative integer of any size, kept as its decimal digits.
///
/// The index puts no bound on version components (date-stamped releases like
/// `20240101120000123456789` exist), so neither does the catalog. Leading
/// zeros are dropped and ordering is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Numeral(String);
impl Numeral {
    /// Returns `None` unless `digits` is a non-empty run of ASCII digits.
    pub fn new(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        Some(Self(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }))
    }

    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<u64> for Numeral {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}
impl Ord for Numeral {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}
impl PartialOrd for Numeral {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Display for Numeral {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// One dot-separated segment of a local version label (`+ubuntu.1`).
///
/// Numeric segments sort after alphanumeric ones, hence the variant order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    Text(String),
    Number(Numeral),
}
impl Display for LocalSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// A parsed PEP 440 version.
///
/// Equality and ordering follow PEP 440 precedence (see `compare.rs`), so
/// `1.0 == 1.0.0` even though the `release` vectors differ.
#[derive(Debug, Clone)]
pub struct Pep440 {
    pub epoch: Numeral,
    pub release: Vec<Numeral>,
    pub pre: Option<(PreRelease, Numeral)>,
    pub post: Option<Numeral>,
    pub dev: Option<Numeral>,
    pub local: Option<Vec<LocalSegment>>,
}
impl Pep440 {
    /// Pre-releases and development releases are not final releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release components with trailing zeros removed (at least one is kept).
    pub(crate) fn significant_release(&self) -> &[Numeral] {
        let mut end = self.release.len();
        while end > 1 && self.release[end - 1].is_zero() {
            end -= 1;
        }
        &self.release[..end]
    }

    /// The canonical spelling used as the catalog comparison key.
    ///
    /// Identical to the normalized [`Display`] form except that trailing zero
    /// release components are dropped: `1.0.0` becomes `1`, `2.10.0rc1`
    /// becomes `2.10rc1`.
    pub fn canonical(&self) -> String {
        self.render(self.significant_release())
    }

    fn render(&self, release: &[Numeral]) -> String {
        let mut out = String::new();
        if !self.epoch.is_zero() {
            out.push_str(&format!("{}!", self.epoch));
        }
        out.push_str(&release.iter().map(Numeral::as_str).collect::<Vec<_>>().join("."));
        if let Some((phase, number)) = &self.pre {
            out.push_str(&format!("{}{number}", phase.as_str()));
        }
        if let Some(post) = &self.post {
            out.push_str(&format!(".post{post}"));
        }
        if let Some(dev) = &self.dev {
            out.push_str(&format!(".dev{dev}"));
        }
        if let Some(local) = &self.local {
            out.push('+');
            out.push_str(&local.iter().map(LocalSegment::to_string).collect::<Vec<_>>().join("."));
        }
        out
    }
}
impl Display for Pep440 {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.render(&self.release))
    }
}
impl FromStr for Pep440 {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ErrorKind::InvalidVersion(s.to_string());
        let caps = VERSION_REGEX.captures(s).ok_or_raise(invalid)?;
        let number = |m: Option<Match<'_>>| -> Result<Option<Numeral>> {
            m.map(|m| Numeral::new(m.as_str()).ok_or_raise(invalid)).transpose()
        };
        let epoch = number(caps.name("epoch"))?.unwrap_or_else(Numeral::zero);
        let release = caps
            .name("release")
            .ok_or_raise(invalid)?
            .as_str()
            .split('.')
            .map(|part| Numeral::new(part).ok_or_raise(invalid))
            .collect::<Result<Vec<_>>>()?;
        let pre = match caps.name("pre_l") {
            Some(label) => {
                let phase = match label.as_str().to_ascii_lowercase().as_str() {
                    "a" | "alpha" => PreRelease::Alpha,
                    "b" | "beta" => PreRelease::Beta,
                    _ => PreRelease::ReleaseCandidate,
                };
                Some((phase, number(caps.name("pre_n"))?.unwrap_or_else(Numeral::zero)))
            },
            None => None,
        };
        let post = match (caps.name("post_n1"), caps.name("post_l")) {
            (Some(implicit), _) => number(Some(implicit))?,
            (None, Some(_)) => Some(number(caps.name("post_n2"))?.unwrap_or_else(Numeral::zero)),
            (None, None) => None,
        };
        let dev = match caps.name("dev_l") {
            Some(_) => Some(number(caps.name("dev_n"))?.unwrap_or_else(Numeral::zero)),
            None => None,
        };
        let local = caps
            .name("local")
            .map(|local| {
                local
                    .as_str()
                    .split(['-', '_', '.'])
                    .map(|segment| {
                        let segment = segment.to_ascii_lowercase();
                        match Numeral::new(&segment) {
                            Some(number) => LocalSegment::Number(number),
                            None => LocalSegment::Text(segment),
                        }
                    })
                    .collect::<Vec<_>>()
            });
        Ok(Self { epoch, release, pre, post, dev, local })
    }
}

/// Canonical comparison key for a raw version string.
///
/// Strings that are not valid PEP 440 versions are kept verbatim; they still
/// need to be stored (the index accepted them at some point) and are compared
/// by exact spelling.
pub fn canonicalize_version(version: &str) -> String {
    match version.parse::<Pep440>() {
        Ok(parsed) => parsed.canonical(),
        Err(_) => {
            tracing::debug!(version, "Version is not PEP 440 compliant; using it verbatim");
            version.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0", "1")]
    #[case("1.0.0", "1")]
    #[case("1", "1")]
    #[case("0.0", "0")]
    #[case("1.10", "1.10")]
    #[case("2.0.1", "2.0.1")]
    #[case("v1.2", "1.2")]
    #[case("1.0-Alpha-2", "1a2")]
    #[case("1.0.beta", "1b0")]
    #[case("1.0c1", "1rc1")]
    #[case("1.0preview3", "1rc3")]
    #[case("1.0-1", "1.post1")]
    #[case("1.0.rev2", "1.post2")]
    #[case("2.1.dev1", "2.1.dev1")]
    #[case("2.1-DEV", "2.1.dev0")]
    #[case("1!2.0", "1!2")]
    #[case("0!2.0", "2")]
    #[case("1.0+Ubuntu-1", "1+ubuntu.1")]
    #[case("  1.0.post0  ", "1.post0")]
    #[case("99999999999999999999999.0", "99999999999999999999999")]
    #[case("1.0.post000123456789012345678901", "1.post123456789012345678901")]
    #[case("007.010", "7.10")]
    fn test_canonicalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonicalize_version(input), expected);
    }

    #[rstest]
    #[case("not a version")]
    #[case("1.0-beta-final")]
    #[case("")]
    fn test_canonicalize_invalid_is_verbatim(#[case] input: &str) {
        assert!(input.parse::<Pep440>().is_err());
        assert_eq!(canonicalize_version(input), input);
    }

    #[test]
    fn test_display_keeps_full_release() {
        let version: Pep440 = "1.0.0rc1".parse().unwrap();
        assert_eq!(version.to_string(), "1.0.0rc1");
        assert_eq!(version.canonical(), "1rc1");
    }

    #[test]
    fn test_parse_components() {
        let version: Pep440 = "3!1.2.3b4.post5.dev6+abc.7".parse().unwrap();
        assert_eq!(version.epoch, Numeral::from(3));
        assert_eq!(version.release, vec![Numeral::from(1), Numeral::from(2), Numeral::from(3)]);
        assert_eq!(version.pre, Some((PreRelease::Beta, Numeral::from(4))));
        assert_eq!(version.post, Some(Numeral::from(5)));
        assert_eq!(version.dev, Some(Numeral::from(6)));
        assert_eq!(
            version.local,
            Some(vec![LocalSegment::Text("abc".to_string()), LocalSegment::Number(Numeral::from(7))])
        );
        assert!(version.is_prerelease());
    }

    #[rstest]
    #[case("0", "0")]
    #[case("000", "0")]
    #[case("0042", "42")]
    #[case("123456789012345678901234567890", "123456789012345678901234567890")]
    fn test_numeral_strips_leading_zeros(#[case] digits: &str, #[case] expected: &str) {
        assert_eq!(Numeral::new(digits).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1a")]
    #[case("-1")]
    fn test_numeral_rejects_non_digits(#[case] digits: &str) {
        assert_eq!(Numeral::new(digits), None);
    }

    #[test]
    fn test_numeral_order_is_numeric() {
        let n = |digits: &str| Numeral::new(digits).unwrap();
        assert!(n("9") < n("10"));
        assert!(n("18446744073709551615") < n("18446744073709551616"));
        assert!(n("99999999999999999999999") > n("99999999999999999999998"));
        assert_eq!(n("007"), Numeral::from(7));
    }

    #[test]
    fn test_invalid_error_kind() {
        let err = "nope".parse::<Pep440>().unwrap_err();
        assert_eq!(&*err, &ErrorKind::InvalidVersion("nope".to_string()));
    }
}
