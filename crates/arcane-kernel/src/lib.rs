//! # Arcane Kernel
//!
//! Engine-agnostic simulation core for Arcane.
//!
//! This crate provides:
//! - Arena-backed animation state graphs with labelled transitions
//! - A timing-gated animation controller driven by movement vectors
//! - Character and status-bar graph builders for sprite sheets
//! - A uniform-cell spatial grid used as the projectile broad phase
//! - Projectile integration and directional trail particles
//!
//! ## Animation
//!
//! A [`StateGraph`] owns every frame-state; an [`AnimationController`] is a
//! cursor into one. Many controllers can share a graph since they only
//! borrow it during `update`.
//!
//! ## Broad phase
//!
//! Projectiles are registered in a [`SpatialGrid`] by id. Every position
//! change must be followed by `move_entity` before the next query so that
//! radius queries never miss a projectile.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animation;
pub mod character;
pub mod particles;
pub mod projectile;
pub mod spatial_grid;
pub mod state_graph;
pub mod status_bar;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::*;
    pub use crate::character::*;
    pub use crate::particles::*;
    pub use crate::projectile::*;
    pub use crate::spatial_grid::*;
    pub use crate::state_graph::*;
    pub use crate::status_bar::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use arcane_common::{Vec2, Viewport};

    #[test]
    fn test_character_shares_graph_between_controllers() {
        let character = CharacterGraph::build(&CharacterSheet::default()).expect("sheet");
        let mut a = character.controller(AnimationConfig::default());
        let mut b = character.controller(AnimationConfig::default());

        a.update(&character.graph, Vec2::new(-1.0, 0.0), 0.15, true, None);
        b.update(&character.graph, Vec2::new(0.0, -1.0), 0.15, true, None);

        assert_eq!(character.facing_of(a.current_state()), Some(Facing::Left));
        assert_eq!(character.facing_of(b.current_state()), Some(Facing::Up));
    }

    #[test]
    fn test_projectile_found_by_grid_after_advance() {
        let mut grid = SpatialGrid::default();
        let template = ProjectileTemplate::default();
        let mut flying = vec![Projectile::spawn(
            &template,
            Vec2::new(100.0, 100.0),
            Vec2::new(1.0, 0.0),
        )];
        grid.insert(flying[0].id, flying[0].position);

        for _ in 0..60 {
            advance_and_cull(&mut flying, &mut grid, &Viewport::default(), 1.0 / 120.0);
        }
        let hits = grid.query(flying[0].position, 10.0);
        assert_eq!(hits, vec![flying[0].id]);
    }
}
