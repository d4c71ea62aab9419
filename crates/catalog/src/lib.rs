//! SQLite catalog of projects, versions and wheels.
//!
//! The catalog mirrors just enough of a package index to answer two
//! questions: "what is the latest version of every project?" and "which of
//! those versions' wheels still need inspecting?". It is rebuilt from, and
//! kept in step with, the index by `wheelhouse-sync`; the only state it owns
//! outright is what inspectors write back.
//!
//! # Architecture
//! - **Projects** are keyed by normalized name and never deleted.
//! - **Versions** are keyed by canonical version within their project and
//!   carry a dense `ordering` rank; the highest rank is the latest version.
//! - **Artifacts** (wheels) are keyed by filename, globally. The first
//!   registration of a filename wins.
//! - **Orphans** are wheels seen in the changelog before the index could
//!   describe them.
//! - The **sync cursor** remembers the last changelog serial applied.

mod catalog;
mod db;
pub mod error;
mod models;
mod purge;
mod queue;
mod store;

pub use crate::catalog::Catalog;
pub use crate::db::Database;
pub use crate::models::{
    Artifact, Inspection, InspectionError, NewArtifact, Orphan, Project, ProjectRef, Version,
};
pub use crate::purge::PurgedVersion;
pub use crate::store::Transaction;
