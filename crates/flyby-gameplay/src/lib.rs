//! # Flyby Gameplay
//!
//! Vehicle control for Flyby.
//!
//! This crate handles:
//! - Keyboard state and per-tick input intents
//! - Flight integration with terrain floor and altitude ceiling
//! - The intro control gate
//! - The [`Session`] that ties flight, streaming and ambient motion together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod flight;
pub mod input;
pub mod session;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::flight::*;
    pub use crate::input::*;
    pub use crate::session::*;
}

pub use prelude::*;
