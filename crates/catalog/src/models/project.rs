use crate::error::Error;

/// A project, keyed by its normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    /// Normalized name (`foo-bar`).
    pub name: String,
    /// Most recently seen spelling (`Foo_Bar`).
    pub display_name: String,
}

/// Either a project already loaded from the catalog, or a raw name to be
/// resolved (and created if necessary).
#[derive(Debug, Clone, Copy)]
pub enum ProjectRef<'a> {
    Name(&'a str),
    Project(&'a Project),
}
impl<'a> From<&'a str> for ProjectRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}
impl<'a> From<&'a String> for ProjectRef<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}
impl<'a> From<&'a Project> for ProjectRef<'a> {
    fn from(project: &'a Project) -> Self {
        Self::Project(project)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProjectRow {
    id: i64,
    name: String,
    display_name: String,
}
impl TryFrom<ProjectRow> for Project {
    type Error = Error;
    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
        })
    }
}
