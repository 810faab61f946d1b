//! Player controller.
//!
//! The player walks toward the cursor, slowing inside a radius around it,
//! and can strife: a short dash whose speed multiplier decays over its
//! duration, followed by a cooldown. Movement that would leave the viewport
//! slides along the wall by trying each axis on its own.

use arcane_common::Viewport;
use arcane_kernel::animation::AnimationController;
use arcane_kernel::state_graph::labels;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::input::PlayerInput;

/// Movement and resource tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn position
    pub start: Vec2,
    /// Walk speed in px/s
    pub speed: f32,
    /// Sprite width; enemies stop at half of it
    pub width: f32,
    /// Cursor distance under which the player stands still
    pub dead_zone: f32,
    /// Cursor distance under which speed scales down linearly
    pub slow_zone: f32,
    /// Distance kept from the viewport edges
    pub bounds_margin: f32,
    /// Strife length in seconds
    pub strife_duration: f32,
    /// Seconds after a strife ends before another may start
    pub strife_cooldown: f32,
    /// Speed multiplier when a strife starts
    pub strife_multiplier: f32,
    /// Multiplier lost per second of strife
    pub strife_decay: f32,
    /// Mana pips restored per second while idle
    pub mana_regen_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Vec2::new(100.0, 100.0),
            speed: 80.0,
            width: 64.0,
            dead_zone: 5.0,
            slow_zone: 100.0,
            bounds_margin: 16.0,
            strife_duration: 1.5,
            strife_cooldown: 1.0,
            strife_multiplier: 2.5,
            strife_decay: 2.0,
            mana_regen_rate: 0.2,
        }
    }
}

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    /// World position
    pub position: Vec2,
    /// Unit heading toward the cursor; zero inside the dead zone
    pub direction: Vec2,
    /// Whether block is held this tick
    pub blocking: bool,
    /// Animation cursor into the shared character graph
    pub animation: AnimationController,
    config: PlayerConfig,
    strife_time: f32,
    strife_cooldown: f32,
    mana_regen_timer: f32,
}

impl Player {
    /// Creates a player at `config.start`.
    #[must_use]
    pub fn new(config: PlayerConfig, animation: AnimationController) -> Self {
        Self {
            position: config.start,
            direction: Vec2::ZERO,
            blocking: false,
            animation,
            config,
            strife_time: 0.0,
            strife_cooldown: 0.0,
            mana_regen_timer: 0.0,
        }
    }

    /// Player tunables.
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Whether a strife is in progress.
    #[must_use]
    pub fn is_strifing(&self) -> bool {
        self.strife_time > 0.0
    }

    /// Whether the player is heading somewhere.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.direction != Vec2::ZERO
    }

    /// Override label for the animation controller this tick.
    #[must_use]
    pub fn override_label(&self) -> Option<&'static str> {
        if self.blocking {
            Some(labels::BLOCK)
        } else if self.is_strifing() {
            Some(labels::STRIFE)
        } else {
            None
        }
    }

    /// Current strife multiplier, advancing the strife clock by `dt`.
    fn strife_multiplier(&mut self, dt: f32) -> f32 {
        if self.strife_time <= 0.0 {
            self.strife_time = 0.0;
            self.strife_cooldown = (self.strife_cooldown - dt).max(0.0);
            return 1.0;
        }

        self.strife_time -= dt;
        let elapsed = self.config.strife_duration - self.strife_time;
        let mult = (self.config.strife_multiplier - elapsed * self.config.strife_decay).max(1.0);
        if self.strife_time <= 0.0 {
            self.strife_time = 0.0;
            self.strife_cooldown = self.config.strife_cooldown;
            trace!("strife ended");
        }
        mult
    }

    /// Applies one tick of movement. Returns the displacement taken.
    pub fn update_movement(&mut self, input: &PlayerInput, viewport: &Viewport, dt: f32) -> Vec2 {
        self.blocking = input.block;

        let cursor = if self.position.distance(input.cursor) < self.config.dead_zone {
            self.position
        } else {
            input.cursor
        };
        self.direction = (cursor - self.position).normalize_or_zero();

        let mut vel = self.direction * self.config.speed * dt * self.strife_multiplier(dt);

        if input.dash && self.strife_time == 0.0 && self.strife_cooldown <= 0.0 {
            self.strife_time = self.config.strife_duration;
            trace!("strife started");
        }

        let distance = self.position.distance(cursor);
        if distance < self.config.slow_zone {
            vel *= distance / self.config.slow_zone;
        }

        let margin = self.config.bounds_margin;
        let candidates = [vel, Vec2::new(vel.x, 0.0), Vec2::new(0.0, vel.y)];
        let step = candidates
            .into_iter()
            .find(|step| viewport.contains(self.position + *step, margin))
            .unwrap_or(Vec2::ZERO);
        self.position += step;
        step
    }

    /// Advances mana regeneration.
    ///
    /// Returns `true` when one pip should be restored. The timer only runs
    /// while `allowed`, i.e. no weapon is cooling down and nothing fired.
    pub fn regen_mana(&mut self, dt: f32, allowed: bool) -> bool {
        if !allowed || self.config.mana_regen_rate <= 0.0 {
            return false;
        }
        self.mana_regen_timer -= dt;
        if self.mana_regen_timer <= 0.0 {
            self.mana_regen_timer = 1.0 / self.config.mana_regen_rate;
            return true;
        }
        false
    }
}
