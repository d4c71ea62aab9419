//! Upstream package index interface.
//!
//! Defines the [`IndexClient`] trait the sync pipelines consume, the data it
//! returns, and the parsing of changelog action text into [`Action`]. Enable
//! the `mock` feature for an in-memory [`MockIndex`].

mod action;
mod client;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;

pub use crate::action::Action;
pub use crate::client::{ChangelogStream, ClientHandle, IndexClient, PackageStream};
#[cfg(feature = "mock")]
pub use crate::mock::MockIndex;
pub use crate::models::{Asset, ChangelogEntry, MD5, ProjectData, SHA256};
