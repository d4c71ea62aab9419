//! Changelog Actions
//!
//! The index journals every change as free text. The set of shapes is small
//! and stable, so the text is parsed exactly once, here, into a closed
//! [`Action`] enum. Nothing downstream looks at the raw string again.
//!
//! Known shapes (as journaled by the index):
//!
//! | Text                            | Parsed as                    |
//! |---------------------------------|------------------------------|
//! | `add {python_version} file {f}` | [`Action::AddFile`]          |
//! | `remove file {f}`               | [`Action::RemoveFile`]       |
//! | `create`                        | [`Action::CreateProject`]    |
//! | `remove project`                | [`Action::RemoveProject`]    |
//! | `new release`                   | [`Action::NewRelease`]       |
//! | `remove release`                | [`Action::RemoveRelease`]    |
//!
//! Role changes (`add Owner {user}`), `nuke user`, `docdestroy` and anything
//! else end up in [`Action::Other`].

use std::convert::Infallible;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A distribution file was uploaded to the event's release.
    AddFile { python_version: String, filename: String },
    /// A distribution file was deleted.
    RemoveFile { filename: String },
    /// The project was registered.
    CreateProject,
    /// The project and all of its releases were deleted.
    RemoveProject,
    /// The event's release was created.
    NewRelease,
    /// The event's release was deleted.
    RemoveRelease,
    /// Anything this catalog doesn't act on; keeps the original text for logging.
    Other(String),
}
impl Action {
    pub fn parse(text: &str) -> Self {
        let words = text.split_whitespace().collect::<Vec<_>>();
        match words.as_slice() {
            ["add", python_version, "file", filename] => Self::AddFile {
                python_version: python_version.to_string(),
                filename: filename.to_string(),
            },
            ["remove", "file", filename] => Self::RemoveFile { filename: filename.to_string() },
            ["create"] => Self::CreateProject,
            ["remove", "project"] => Self::RemoveProject,
            ["new", "release"] => Self::NewRelease,
            ["remove", "release"] => Self::RemoveRelease,
            _ => Self::Other(text.to_string()),
        }
    }
}
impl FromStr for Action {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
impl From<&str> for Action {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "add py3 file FooBar-1.0-py3-none-any.whl",
        Action::AddFile { python_version: "py3".to_string(), filename: "FooBar-1.0-py3-none-any.whl".to_string() }
    )]
    #[case(
        "add source file FooBar-1.0.tar.gz",
        Action::AddFile { python_version: "source".to_string(), filename: "FooBar-1.0.tar.gz".to_string() }
    )]
    #[case("remove file FooBar-1.0-py3-none-any.whl", Action::RemoveFile { filename: "FooBar-1.0-py3-none-any.whl".to_string() })]
    #[case("create", Action::CreateProject)]
    #[case("remove project", Action::RemoveProject)]
    #[case("new release", Action::NewRelease)]
    #[case("remove release", Action::RemoveRelease)]
    #[case("add Owner jdoe", Action::Other("add Owner jdoe".to_string()))]
    #[case("remove Maintainer jdoe", Action::Other("remove Maintainer jdoe".to_string()))]
    #[case("nuke user", Action::Other("nuke user".to_string()))]
    #[case("docdestroy", Action::Other("docdestroy".to_string()))]
    #[case("", Action::Other(String::new()))]
    fn test_parse(#[case] text: &str, #[case] expected: Action) {
        assert_eq!(Action::parse(text), expected);
    }
}
