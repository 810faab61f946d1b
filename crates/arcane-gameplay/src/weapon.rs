//! Ranged weapons that fire gas-limited projectiles.
//!
//! A weapon owns its projectiles in flight and the trail emitter that
//! follows them. Fire rate and aim carry a little seeded randomness so a
//! held trigger does not produce a perfectly regular stream.

use arcane_common::{ProjectileId, Viewport};
use arcane_kernel::particles::{TrailConfig, TrailEmitter};
use arcane_kernel::projectile::{advance_and_cull, Projectile, ProjectileTemplate};
use arcane_kernel::spatial_grid::SpatialGrid;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Weapon tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Seconds between shots
    pub cooldown: f32,
    /// Fraction of the cooldown added or removed at random after each shot
    pub cooldown_jitter: f32,
    /// Length of the random nudge added to the unit aim direction
    pub aim_jitter: f32,
    /// Projectiles spawn this far ahead of the shooter along the aim
    pub spawn_offset: f32,
    /// Trail particles emitted per projectile per tick
    pub trail_per_tick: usize,
    /// Stats of fired projectiles
    pub projectile: ProjectileTemplate,
    /// Trail emitter tunables
    pub trail: TrailConfig,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown: 2.0,
            cooldown_jitter: 0.1,
            aim_jitter: 0.1,
            spawn_offset: 32.0,
            trail_per_tick: 2,
            projectile: ProjectileTemplate::default(),
            trail: TrailConfig::with_scale(20_000, 0.1, 5.0),
        }
    }
}

/// A weapon and everything it has fired.
#[derive(Debug, Clone)]
pub struct Weapon {
    config: WeaponConfig,
    time_since_fire: f32,
    last_direction: Vec2,
    projectiles: Vec<Projectile>,
    trail: TrailEmitter,
}

impl Weapon {
    /// Creates a weapon with a staggered first shot.
    #[must_use]
    pub fn new(config: WeaponConfig, rng: &mut fastrand::Rng) -> Self {
        Self {
            time_since_fire: rng.f32() * config.cooldown,
            last_direction: Vec2::new(0.5, 0.5).normalize(),
            projectiles: Vec::new(),
            trail: TrailEmitter::new(config.trail, rng.u64(..)),
            config,
        }
    }

    /// Weapon tunables.
    #[must_use]
    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Trail particles.
    #[must_use]
    pub fn trail(&self) -> &TrailEmitter {
        &self.trail
    }

    /// Direction used when firing with no aim.
    #[must_use]
    pub fn last_direction(&self) -> Vec2 {
        self.last_direction
    }

    /// Whether the cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.time_since_fire >= self.config.cooldown
    }

    /// Advances the cooldown clock.
    pub fn tick(&mut self, dt: f32) {
        self.time_since_fire += dt;
    }

    /// Moves and culls projectiles, then emits trail behind the survivors.
    /// Returns the number culled.
    pub fn advance_projectiles(
        &mut self,
        grid: &mut SpatialGrid,
        viewport: &Viewport,
        dt: f32,
    ) -> usize {
        let culled = advance_and_cull(&mut self.projectiles, grid, viewport, dt);
        for p in &self.projectiles {
            self.trail
                .emit_directional(p.position, p.direction, self.config.trail_per_tick, p.speed);
        }
        culled
    }

    /// Ages trail particles.
    pub fn update_trail(&mut self, dt: f32) {
        self.trail.update(dt);
    }

    /// Fires one projectile and registers it in `grid`.
    ///
    /// A zero `aim` reuses the last non-zero aim. Does not check the
    /// cooldown; callers gate on [`Self::is_ready`].
    pub fn fire(
        &mut self,
        origin: Vec2,
        aim: Vec2,
        grid: &mut SpatialGrid,
        rng: &mut fastrand::Rng,
    ) -> ProjectileId {
        let jitter = (rng.f32() * 2.0 - 1.0) * self.config.cooldown_jitter;
        self.time_since_fire = jitter * self.config.cooldown;

        let aim = aim.normalize_or_zero();
        let aiming = aim != Vec2::ZERO;
        let base = if aiming { aim } else { self.last_direction };

        let nudge = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0).normalize_or_zero()
            * self.config.aim_jitter;
        let direction = (base + nudge).try_normalize().unwrap_or(base);

        let spawn_at = origin + aim * self.config.spawn_offset;
        let projectile = Projectile::spawn(&self.config.projectile, spawn_at, direction);
        let id = projectile.id;
        grid.insert(id, spawn_at);
        self.projectiles.push(projectile);

        if aiming {
            self.last_direction = aim;
        }
        trace!(%id, "projectile fired");
        id
    }

    /// Drops every projectile from the weapon and the grid.
    pub fn clear(&mut self, grid: &mut SpatialGrid) {
        for p in self.projectiles.drain(..) {
            grid.remove(p.id);
        }
        self.trail.clear();
    }
}
