//! # Arcane Gameplay
//!
//! Gameplay systems for Arcane.
//!
//! This crate provides the entity layer on top of the kernel:
//! - Per-tick input snapshots
//! - Player controller with cursor-follow movement and strife dashes
//! - Weapons firing gas-limited projectiles with trails
//! - Enemies with silhouette colliders, chase AI and respawn
//! - The combat tick tying it all together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod combat;
pub mod enemy;
pub mod input;
pub mod player;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::combat::*;
    pub use crate::enemy::*;
    pub use crate::input::*;
    pub use crate::player::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
