//! Uniform-cell spatial index for projectiles.
//!
//! Broad phase for projectile-vs-enemy collision. World space is cut into
//! square cells of `cell_size`; each projectile lives in exactly one cell.
//! A reverse map from projectile to cell keeps `remove` and `move_entity`
//! independent of the number of cells.
//!
//! Queries are conservative: they return every projectile in the square
//! block of cells around the query circle. Callers run the exact test.
//!
//! # Example
//!
//! ```
//! use arcane_common::{CellCoord, ProjectileId, Vec2};
//! use arcane_kernel::spatial_grid::SpatialGrid;
//!
//! let mut grid = SpatialGrid::new(64.0);
//! let id = ProjectileId::from_raw(1);
//! grid.insert(id, Vec2::new(70.0, 70.0));
//! assert_eq!(grid.cell_for(id), Some(CellCoord::new(1, 1)));
//!
//! grid.move_entity(id, Vec2::new(70.0, 70.0), Vec2::new(10.0, 10.0));
//! assert!(grid.query(Vec2::ZERO, 50.0).contains(&id));
//! ```

use ahash::AHashMap;
use arcane_common::{CellCoord, GridError, ProjectileId};
use glam::Vec2;
use tracing::trace;

/// Default cell edge length in world pixels.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// One grid cell and the projectiles inside it.
#[derive(Debug, Clone, Default)]
pub struct GridCell {
    /// Cell coordinate
    pub coord: CellCoord,
    /// Projectiles in this cell, unordered
    pub entries: Vec<ProjectileId>,
}

/// Sparse uniform grid keyed by cell coordinate.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<i32, AHashMap<i32, GridCell>>,
    locations: AHashMap<ProjectileId, CellCoord>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// Creates an empty grid. Non-positive sizes fall back to the default.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: AHashMap::new(),
            locations: AHashMap::new(),
        }
    }

    /// Cell edge length.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `pos`.
    #[must_use]
    pub fn cell_of(&self, pos: Vec2) -> CellCoord {
        CellCoord::from_position(pos, self.cell_size)
    }

    /// Number of registered projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether no projectile is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of cells ever created, including empty ones.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(|column| column.len()).sum()
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ProjectileId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Cell currently holding `id`.
    #[must_use]
    pub fn cell_for(&self, id: ProjectileId) -> Option<CellCoord> {
        self.locations.get(&id).copied()
    }

    /// Projectiles in a single cell.
    #[must_use]
    pub fn cell_entries(&self, coord: CellCoord) -> &[ProjectileId] {
        self.cells
            .get(&coord.x)
            .and_then(|column| column.get(&coord.y))
            .map_or(&[], |cell| cell.entries.as_slice())
    }

    fn cell_mut(&mut self, coord: CellCoord) -> &mut GridCell {
        self.cells
            .entry(coord.x)
            .or_default()
            .entry(coord.y)
            .or_insert_with(|| {
                trace!(x = coord.x, y = coord.y, "grid cell created");
                GridCell {
                    coord,
                    entries: Vec::new(),
                }
            })
    }

    /// Registers `id` at `pos`. Re-inserting an id relocates it.
    pub fn insert(&mut self, id: ProjectileId, pos: Vec2) {
        if self.contains(id) {
            self.remove(id);
        }
        let coord = self.cell_of(pos);
        self.cell_mut(coord).entries.push(id);
        self.locations.insert(id, coord);
    }

    /// Unregisters `id`. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ProjectileId) -> bool {
        let Some(coord) = self.locations.remove(&id) else {
            return false;
        };
        if let Some(cell) = self
            .cells
            .get_mut(&coord.x)
            .and_then(|column| column.get_mut(&coord.y))
        {
            if let Some(index) = cell.entries.iter().position(|&e| e == id) {
                cell.entries.swap_remove(index);
            }
        }
        true
    }

    /// Reindexes `id` after it moved from `old_pos` to `new_pos`.
    ///
    /// No-op when both positions share a cell. Must run after every position
    /// change and before any query that depends on it.
    pub fn move_entity(&mut self, id: ProjectileId, old_pos: Vec2, new_pos: Vec2) {
        let new_cell = self.cell_of(new_pos);
        if self.cell_of(old_pos) == new_cell && self.cell_for(id) == Some(new_cell) {
            return;
        }
        self.insert(id, new_pos);
    }

    /// Every projectile in the square block of cells covering the circle.
    ///
    /// The block extends `floor(radius / cell_size) + 1` cells each way from
    /// the center cell, so entities near a cell boundary are never missed.
    /// The result may include projectiles outside `radius`.
    #[must_use]
    pub fn query(&self, center: Vec2, radius: f32) -> Vec<ProjectileId> {
        let mut found = Vec::new();
        self.query_into(center, radius, &mut found);
        found
    }

    /// Like [`Self::query`], appending into a caller-owned buffer.
    pub fn query_into(&self, center: Vec2, radius: f32, out: &mut Vec<ProjectileId>) {
        let center_cell = self.cell_of(center);
        let reach = (radius.max(0.0) / self.cell_size)
            .floor()
            .min(i32::MAX as f32) as i64
            + 1;

        let (x0, x1) = span(center_cell.x, reach);
        let (y0, y1) = span(center_cell.y, reach);
        for x in keys_in(&self.cells, x0, x1) {
            let Some(column) = self.cells.get(&x) else {
                continue;
            };
            for y in keys_in(column, y0, y1) {
                if let Some(cell) = column.get(&y) {
                    out.extend_from_slice(&cell.entries);
                }
            }
        }
    }

    /// Drops every projectile and cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.locations.clear();
    }

    /// Drops cells that hold nothing. Returns how many were removed.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.cell_count();
        for column in self.cells.values_mut() {
            column.retain(|_, cell| !cell.entries.is_empty());
        }
        self.cells.retain(|_, column| !column.is_empty());
        before - self.cell_count()
    }

    /// Verifies that every registered projectile sits in exactly one cell,
    /// once, and that cell matches the reverse map.
    pub fn check_invariants(&self) -> Result<(), GridError> {
        let mut seen: AHashMap<ProjectileId, (CellCoord, usize)> = AHashMap::new();
        for column in self.cells.values() {
            for cell in column.values() {
                for &id in &cell.entries {
                    let entry = seen.entry(id).or_insert((cell.coord, 0));
                    entry.1 += 1;
                }
            }
        }

        for (&id, &(actual, count)) in &seen {
            if count > 1 {
                return Err(GridError::Duplicated {
                    id: id.raw(),
                    count,
                });
            }
            match self.locations.get(&id) {
                None => {
                    return Err(GridError::Orphaned {
                        id: id.raw(),
                        cell: actual,
                    })
                },
                Some(&mapped) if mapped != actual => {
                    return Err(GridError::Misplaced {
                        id: id.raw(),
                        mapped,
                        actual: Some(actual),
                    })
                },
                Some(_) => {},
            }
        }

        for (&id, &mapped) in &self.locations {
            if !seen.contains_key(&id) {
                return Err(GridError::Misplaced {
                    id: id.raw(),
                    mapped,
                    actual: None,
                });
            }
        }
        Ok(())
    }
}

/// Inclusive cell range `center ± reach`, clamped to `i32`.
fn span(center: i32, reach: i64) -> (i32, i32) {
    let lo = (i64::from(center) - reach).max(i64::from(i32::MIN));
    let hi = (i64::from(center) + reach).min(i64::from(i32::MAX));
    (lo as i32, hi as i32)
}

/// Keys of `map` to visit for the range `lo..=hi`.
///
/// Walks the range when it is no wider than the map, otherwise filters the
/// map's own keys so a huge radius costs no more than a full scan.
fn keys_in<V>(map: &AHashMap<i32, V>, lo: i32, hi: i32) -> Vec<i32> {
    let width = (i64::from(hi) - i64::from(lo) + 1) as usize;
    if width <= map.len() {
        return (lo..=hi).collect();
    }
    let mut keys: Vec<i32> = map.keys().copied().filter(|k| (lo..=hi).contains(k)).collect();
    keys.sort_unstable();
    keys
}
