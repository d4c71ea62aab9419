//! Configuration loading for wheelhouse.
//!
//! See [`Loader`] for how the layers stack up.

pub mod error;
mod load;
mod settings;

pub use crate::load::{Loader, load};
pub use crate::settings::{Config, OrphanConfig, QueueConfig};
