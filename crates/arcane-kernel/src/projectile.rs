//! Straight-line projectiles with a travel budget.
//!
//! A projectile flies along a unit direction at constant speed and spends
//! `speed * dt` of its gas every tick. It is culled when the gas runs out or
//! it leaves the viewport, whichever happens first.
//!
//! # Example
//!
//! ```
//! use arcane_common::{Vec2, Viewport};
//! use arcane_kernel::projectile::{Projectile, ProjectileTemplate};
//!
//! let template = ProjectileTemplate::default().with_gas(150.0);
//! let mut bolt = Projectile::spawn(&template, Vec2::new(100.0, 100.0), Vec2::X);
//!
//! let old = bolt.advance(0.5);
//! assert_eq!(old, Vec2::new(100.0, 100.0));
//! assert!(bolt.is_alive(&Viewport::default()));
//! ```

use arcane_common::{ProjectileId, Viewport};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spatial_grid::SpatialGrid;

/// Default projectile speed in px/s.
pub const DEFAULT_SPEED: f32 = 160.0;

/// Default collision radius in px.
pub const DEFAULT_RADIUS: f32 = 5.0;

/// Default travel budget in px.
pub const DEFAULT_GAS: f32 = 600.0;

/// Stats stamped onto every projectile a weapon fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    /// Speed in px/s
    pub speed: f32,
    /// Collision radius
    pub radius: f32,
    /// Travel budget in px
    pub gas: f32,
    /// Health removed per hit
    pub damage: u32,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            radius: DEFAULT_RADIUS,
            gas: DEFAULT_GAS,
            damage: 1,
        }
    }
}

impl ProjectileTemplate {
    /// Set speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set travel budget.
    #[must_use]
    pub const fn with_gas(mut self, gas: f32) -> Self {
        self.gas = gas;
        self
    }

    /// Set damage per hit.
    #[must_use]
    pub const fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Grid key
    pub id: ProjectileId,
    /// World position
    pub position: Vec2,
    /// Unit direction of travel
    pub direction: Vec2,
    /// Speed in px/s
    pub speed: f32,
    /// Collision radius
    pub radius: f32,
    /// Health removed per hit
    pub damage: u32,
    /// Remaining travel budget in px
    pub gas: f32,
}

impl Projectile {
    /// Spawns a projectile from a template with a fresh id.
    ///
    /// `direction` is normalized; a zero vector yields a projectile that
    /// never moves but still burns gas.
    #[must_use]
    pub fn spawn(template: &ProjectileTemplate, position: Vec2, direction: Vec2) -> Self {
        Self {
            id: ProjectileId::new(),
            position,
            direction: direction.normalize_or_zero(),
            speed: template.speed,
            radius: template.radius,
            damage: template.damage,
            gas: template.gas,
        }
    }

    /// Velocity in px/s.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Moves one tick and burns gas. Returns the position before the move.
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        let old = self.position;
        self.position += self.velocity() * dt;
        self.gas -= self.speed * dt;
        old
    }

    /// Whether the travel budget is used up.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.gas <= 0.0
    }

    /// Whether the projectile still has gas and is on screen.
    #[must_use]
    pub fn is_alive(&self, viewport: &Viewport) -> bool {
        !self.is_spent() && viewport.contains(self.position, 0.0)
    }
}

/// Advances every projectile, drops the dead ones, and reindexes the grid.
///
/// Survivors are moved in the grid before this returns, so queries made
/// afterwards in the same tick see current positions. Returns the number of
/// projectiles culled.
pub fn advance_and_cull(
    projectiles: &mut Vec<Projectile>,
    grid: &mut SpatialGrid,
    viewport: &Viewport,
    dt: f32,
) -> usize {
    let before = projectiles.len();
    projectiles.retain_mut(|p| {
        let old = p.advance(dt);
        if p.is_alive(viewport) {
            grid.move_entity(p.id, old, p.position);
            true
        } else {
            grid.remove(p.id);
            false
        }
    });

    let culled = before - projectiles.len();
    if culled > 0 {
        debug!("Culled {} projectiles, {} in flight", culled, projectiles.len());
    }
    culled
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn test_spawn_normalizes_direction() {
        let p = Projectile::spawn(
            &ProjectileTemplate::default(),
            Vec2::ZERO,
            Vec2::new(3.0, 4.0),
        );
        assert!((p.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(p.speed, DEFAULT_SPEED);
    }

    #[test]
    fn test_advance_moves_and_burns_gas() {
        let template = ProjectileTemplate::default().with_gas(100.0);
        let mut p = Projectile::spawn(&template, Vec2::new(10.0, 10.0), Vec2::X);
        let old = p.advance(0.5);

        assert_eq!(old, Vec2::new(10.0, 10.0));
        assert_eq!(p.position, Vec2::new(90.0, 10.0));
        assert_eq!(p.gas, 20.0);
        assert!(!p.is_spent());

        p.advance(0.5);
        assert_eq!(p.position, Vec2::new(170.0, 10.0));
        assert!(p.is_spent());
    }

    #[test]
    fn test_template_builders() {
        let template = ProjectileTemplate::default().with_speed(400.0).with_damage(3);
        let p = Projectile::spawn(&template, Vec2::ZERO, Vec2::new(0.0, -2.0));
        assert_eq!(p.velocity(), Vec2::new(0.0, -400.0));
        assert_eq!(p.damage, 3);
        assert_eq!(p.radius, DEFAULT_RADIUS);
    }

    #[test]
    fn test_gas_culls_at_budget() {
        let template = ProjectileTemplate::default().with_gas(150.0);
        let mut flying = vec![Projectile::spawn(
            &template,
            Vec2::new(100.0, 480.0),
            Vec2::X,
        )];
        let id = flying[0].id;
        let mut grid = SpatialGrid::default();
        grid.insert(id, flying[0].position);
        let viewport = Viewport::default();

        let mut steps = 0;
        while !flying.is_empty() {
            steps += 1;
            advance_and_cull(&mut flying, &mut grid, &viewport, DT);
            assert!(steps < 1000, "projectile never culled");
        }

        // 150 px at 4/3 px per tick runs out on the 113th tick
        assert_eq!(steps, 113);
        assert!(!grid.contains(id));
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn test_leaving_viewport_culls_before_gas() {
        let template = ProjectileTemplate::default().with_gas(10_000.0);
        let mut flying = vec![Projectile::spawn(
            &template,
            Vec2::new(1270.0, 480.0),
            Vec2::X,
        )];
        let mut grid = SpatialGrid::default();
        grid.insert(flying[0].id, flying[0].position);

        let mut steps = 0;
        while !flying.is_empty() {
            steps += 1;
            advance_and_cull(&mut flying, &mut grid, &Viewport::default(), DT);
        }
        assert_eq!(steps, 8);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_survivors_reindexed() {
        let template = ProjectileTemplate::default();
        let mut flying = vec![Projectile::spawn(&template, Vec2::new(60.0, 10.0), Vec2::X)];
        let id = flying[0].id;
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(id, flying[0].position);

        for _ in 0..4 {
            advance_and_cull(&mut flying, &mut grid, &Viewport::default(), DT);
        }
        assert_eq!(grid.cell_for(id), Some(grid.cell_of(flying[0].position)));
        assert_eq!(grid.cell_for(id).map(|c| c.x), Some(1));
    }
}
