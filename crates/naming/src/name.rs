use crate::consts::NAME_SEPARATOR_REGEX;

/// Canonical form of a project name.
///
/// Names are compared case-insensitively and treat runs of `-`, `_` and `.`
/// as a single separator, so `Foo.Bar`, `foo_bar` and `FOO--bar` all refer to
/// the same project (`foo-bar`).
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATOR_REGEX.replace_all(name, "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("FooBar", "foobar")]
    #[case("FOOBAR", "foobar")]
    #[case("foo_bar", "foo-bar")]
    #[case("Foo.Bar", "foo-bar")]
    #[case("foo-_.-bar", "foo-bar")]
    #[case("zope.interface", "zope-interface")]
    #[case("already-normal", "already-normal")]
    fn test_normalize_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(input), expected);
    }
}
