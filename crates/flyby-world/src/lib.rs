//! # Flyby World
//!
//! World streaming for Flyby.
//!
//! This crate handles:
//! - Deterministic terrain synthesis from coherent noise
//! - Decorative clusters (clouds, ambient particles)
//! - Segment registries with idempotent creation and radius eviction
//! - Ground height queries over loaded terrain
//! - Streaming passes driven by vehicle displacement

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ambient;
pub mod chunk;
pub mod cluster;
pub mod config;
pub mod generation;
pub mod height;
pub mod registry;
pub mod render;
pub mod streaming;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ambient::*;
    pub use crate::chunk::*;
    pub use crate::cluster::*;
    pub use crate::config::*;
    pub use crate::generation::*;
    pub use crate::height::*;
    pub use crate::registry::*;
    pub use crate::render::*;
    pub use crate::streaming::*;
}

pub use prelude::*;
