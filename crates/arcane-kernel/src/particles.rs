//! Directional trail particles for projectiles.
//!
//! CPU-side simulation only: particles are emitted in a narrow cone along a
//! projectile's heading, drift with damping, shrink, spin and fade out.
//! Drawing is left to whoever reads [`TrailEmitter::particles`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How particle alpha falls off over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaCurve {
    /// `1 - t`
    Linear,
    /// `1 - t^2`
    Quadratic,
    /// `1 - t^3`
    #[default]
    Cubic,
}

impl AlphaCurve {
    /// Alpha for elapsed fraction `t` in `[0, 1]`.
    #[must_use]
    pub fn alpha(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let fade = match self {
            Self::Linear => t,
            Self::Quadratic => t * t,
            Self::Cubic => t * t * t,
        };
        (1.0 - fade).max(0.0)
    }
}

/// Tunables for a [`TrailEmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Hard cap on live particles
    pub max_particles: usize,
    /// Base lifetime in seconds; each particle gets up to 50% extra
    pub lifetime: f32,
    /// Base starting scale
    pub scale_base: f32,
    /// Random extra starting scale
    pub scale_var: f32,
    /// Scale change per second (negative shrinks)
    pub growth: f32,
    /// Velocity multiplier applied every update
    pub damping: f32,
    /// Max absolute spin in rad/s
    pub spin_range: f32,
    /// Half-angle of the emission cone in radians
    pub spread: f32,
    /// Spawn position jitter in px
    pub jitter: f32,
    /// Alpha fade curve
    pub alpha_curve: AlphaCurve,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self::with_scale(20_000, 0.1, 1.0)
    }
}

impl TrailConfig {
    /// Shooting-star defaults for a sprite of the given scale.
    #[must_use]
    pub fn with_scale(max_particles: usize, scale: f32, lifetime: f32) -> Self {
        Self {
            max_particles,
            lifetime,
            scale_base: scale * 0.28,
            scale_var: scale * 0.10,
            growth: -0.03,
            damping: 0.95,
            spin_range: 0.25,
            spread: 0.05,
            jitter: 0.5,
            alpha_curve: AlphaCurve::Cubic,
        }
    }
}

/// One live trail particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position
    pub position: Vec2,
    /// Velocity in px/s
    pub velocity: Vec2,
    /// Seconds left
    pub life: f32,
    /// Seconds at spawn
    pub max_life: f32,
    /// Draw scale
    pub scale: f32,
    /// Rotation in radians
    pub rotation: f32,
    /// Spin in rad/s
    pub spin: f32,
}

impl Particle {
    /// Fraction of lifetime elapsed, 0 at spawn and 1 at death.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        if self.max_life > 0.0 {
            1.0 - self.life / self.max_life
        } else {
            1.0
        }
    }
}

/// Pool of trail particles with a seeded RNG.
#[derive(Debug, Clone)]
pub struct TrailEmitter {
    config: TrailConfig,
    particles: Vec<Particle>,
    rng: fastrand::Rng,
}

impl TrailEmitter {
    /// Creates an emitter with a deterministic RNG.
    #[must_use]
    pub fn new(config: TrailConfig, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(config.max_particles.min(4096)),
            config,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Emitter tunables.
    #[must_use]
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Live particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Live particle count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particle is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Alpha of a particle under this emitter's curve.
    #[must_use]
    pub fn alpha(&self, particle: &Particle) -> f32 {
        self.config.alpha_curve.alpha(particle.elapsed())
    }

    fn signed_unit(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }

    /// Spawns up to `count` particles heading along `direction`.
    ///
    /// Speed is drawn from `[speed_scale, 1.5 * speed_scale)`. Emission is
    /// truncated at the pool cap. Returns the number actually spawned.
    pub fn emit_directional(
        &mut self,
        position: Vec2,
        direction: Vec2,
        count: usize,
        speed_scale: f32,
    ) -> usize {
        let space = self.config.max_particles.saturating_sub(self.particles.len());
        let count = count.min(space);
        let dir = direction.try_normalize().unwrap_or(Vec2::X);
        let heading = dir.y.atan2(dir.x);

        for _ in 0..count {
            let angle = heading + self.signed_unit() * self.config.spread;
            let speed = speed_scale + self.rng.f32() * speed_scale * 0.5;
            let jitter = Vec2::new(self.signed_unit(), self.signed_unit()) * self.config.jitter;
            let life = self.config.lifetime * (1.0 + self.rng.f32() * 0.5);
            let scale = self.config.scale_base + self.rng.f32() * self.config.scale_var;
            let spin = self.signed_unit() * self.config.spin_range;

            self.particles.push(Particle {
                position: position + jitter,
                velocity: Vec2::from_angle(angle) * speed,
                life,
                max_life: life,
                scale,
                rotation: 0.0,
                spin,
            });
        }
        count
    }

    /// Ages, integrates and culls every particle.
    pub fn update(&mut self, dt: f32) {
        let TrailConfig {
            damping, growth, ..
        } = self.config;

        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.position += p.velocity * dt;
            p.velocity *= damping;
            p.scale = (p.scale + growth * dt).max(0.0);
            p.rotation += p.spin * dt;
            true
        });
    }

    /// Drops every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
