//! Domain layer: entities, error types and the ports infrastructure implements.
//!
//! - [`entities`] - Feed, subscriber and attempt data structures
//! - [`errors`] - Per-component failure enums
//! - [`repositories`] - Storage and upstream traits
//! - [`clock`] - Injectable time source
//!
//! Nothing in this module performs I/O.

pub mod clock;
pub mod entities;
pub mod errors;
pub mod repositories;
