//! Coordinate types for world positions, grid cells, and sprite-sheet frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a spatial-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    /// X coordinate in cell space
    pub x: i32,
    /// Y coordinate in cell space
    pub y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the cell containing a world position.
    ///
    /// Uses `floor` so negative positions land in negative cells instead of
    /// collapsing onto cell zero.
    #[must_use]
    pub fn from_position(pos: Vec2, cell_size: f32) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i32,
            y: (pos.y / cell_size).floor() as i32,
        }
    }
}

/// Fixed logical viewport the simulation runs inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in logical pixels
    pub width: f32,
    /// Height in logical pixels
    pub height: f32,
}

impl Viewport {
    /// Creates a new viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Checks whether a point lies inside the viewport shrunk by `margin` on
    /// every side. The far edges are exclusive.
    #[must_use]
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= margin
            && pos.x < self.width - margin
            && pos.y >= margin
            && pos.y < self.height - margin
    }

    /// Center of the viewport.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        // 320x240 scaled by 4
        Self::new(1280.0, 960.0)
    }
}

/// Rectangular region of a sprite sheet, in pixels.
///
/// This is the frame handle animation states carry. The core never looks
/// inside it; the renderer uses it to pick a sub-image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl FrameRect {
    /// Creates a new frame rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square frame at a `(row, col)` position of a grid-aligned sheet.
    #[must_use]
    pub const fn at(row: u32, col: u32, size: u32) -> Self {
        Self::new(col * size, row * size, size, size)
    }

    /// Column index of this frame within a grid-aligned sheet.
    #[must_use]
    pub const fn column(&self) -> u32 {
        if self.width == 0 {
            0
        } else {
            self.x / self.width
        }
    }

    /// Row index of this frame within a grid-aligned sheet.
    #[must_use]
    pub const fn row(&self) -> u32 {
        if self.height == 0 {
            0
        } else {
            self.y / self.height
        }
    }
}
