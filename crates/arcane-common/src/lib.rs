//! # Arcane Common
//!
//! Common types shared by every Arcane crate:
//! - Coordinate types (grid cells, viewport, sprite-sheet frames)
//! - ID types (ProjectileId, EnemyId)
//! - Error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Re-exported so downstream crates agree on one vector type.
pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use glam::Vec2;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_from_position() {
        assert_eq!(
            CellCoord::from_position(Vec2::new(70.0, 70.0), 64.0),
            CellCoord::new(1, 1)
        );
        assert_eq!(
            CellCoord::from_position(Vec2::new(10.0, 10.0), 64.0),
            CellCoord::new(0, 0)
        );
        // floor, not truncation
        assert_eq!(
            CellCoord::from_position(Vec2::new(-1.0, -65.0), 64.0),
            CellCoord::new(-1, -2)
        );
    }

    #[test]
    fn test_viewport_contains() {
        let vp = Viewport::new(100.0, 50.0);
        assert!(vp.contains(Vec2::new(0.0, 0.0), 0.0));
        assert!(!vp.contains(Vec2::new(100.0, 10.0), 0.0));
        assert!(!vp.contains(Vec2::new(10.0, 10.0), 16.0));
        assert!(vp.contains(Vec2::new(16.0, 16.0), 16.0));
        assert!(!vp.contains(Vec2::new(50.0, -0.1), 0.0));
    }

    #[test]
    fn test_frame_rect_at() {
        let rect = FrameRect::at(8, 3, 64);
        assert_eq!(rect, FrameRect::new(192, 512, 64, 64));
        assert_eq!(rect.row(), 8);
        assert_eq!(rect.column(), 3);
    }

    #[test]
    fn test_projectile_id_generation() {
        let id1 = ProjectileId::new();
        let id2 = ProjectileId::new();
        assert_ne!(id1, id2);
        assert_eq!(ProjectileId::from_raw(7).raw(), 7);
    }

    #[test]
    fn test_error_display() {
        let err: ArcaneError = AnimationError::EmptyCycle {
            name: "walk_up".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Animation error: cycle 'walk_up' has no frames");
    }
}
