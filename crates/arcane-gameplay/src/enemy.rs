//! Enemies: offset circle colliders, chase AI, knockback and respawn.

use arcane_common::EnemyId;
use arcane_kernel::animation::AnimationController;
use arcane_kernel::projectile::Projectile;
use arcane_kernel::state_graph::StateGraph;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Circle collider offset from the enemy's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Offset from the enemy center
    pub offset: Vec2,
    /// Radius
    pub radius: f32,
}

impl Collider {
    /// Whether `point` lies inside this collider for an enemy at `origin`.
    #[must_use]
    pub fn contains(&self, origin: Vec2, point: Vec2) -> bool {
        point.distance(origin + self.offset) <= self.radius
    }
}

/// Three rows of three circles approximating a humanoid silhouette.
///
/// Columns sit 8 px apart starting 8 px left of center; rows start 8 px
/// above center and are `width / 5` apart.
#[must_use]
pub fn silhouette_colliders(width: f32, radius: f32) -> [Collider; 9] {
    let (left, top) = (-8.0, -8.0);
    let (gap_x, gap_y) = (8.0, width / 5.0);
    std::array::from_fn(|i| {
        let (row, col) = ((i / 3) as f32, (i % 3) as f32);
        Collider {
            offset: Vec2::new(left + gap_x * col, top + gap_y * row),
            radius,
        }
    })
}

/// Enemy tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Chase speed in px/s
    pub speed: f32,
    /// Health at spawn and respawn
    pub max_health: i32,
    /// Seconds dead before respawning at the origin
    pub respawn_cooldown: f32,
    /// Distance within which the enemy chases the player
    pub aggro_radius: f32,
    /// Sprite width; the grid query radius is twice this
    pub width: f32,
    /// Radius of each silhouette collider
    pub collider_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            max_health: 100,
            respawn_cooldown: 5.0,
            aggro_radius: 500.0,
            width: 64.0,
            collider_radius: 10.0,
        }
    }
}

/// What happened to an enemy during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyOutcome {
    /// Projectiles that hit
    pub hits: u32,
    /// Health reached zero this tick
    pub killed: bool,
    /// Came back to life this tick
    pub respawned: bool,
}

/// A hostile character.
#[derive(Debug, Clone)]
pub struct Enemy {
    /// Stable id
    pub id: EnemyId,
    /// World position
    pub position: Vec2,
    /// Unit chase direction; zero when idle
    pub direction: Vec2,
    /// Remaining health
    pub health: i32,
    /// Animation cursor into the shared character graph
    pub animation: AnimationController,
    origin: Vec2,
    spread: Vec2,
    respawn_timer: f32,
    colliders: [Collider; 9],
    config: EnemyConfig,
}

impl Enemy {
    /// Spawns an enemy at `position`.
    ///
    /// Each enemy gets a small random offset on its chase target so a group
    /// does not collapse onto one point.
    #[must_use]
    pub fn spawn(
        position: Vec2,
        config: EnemyConfig,
        animation: AnimationController,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let spread = Vec2::new(rng.i32(-1..=1) as f32, rng.i32(-1..=1) as f32);
        let id = EnemyId::new();
        info!("Spawned {id} at ({:.0}, {:.0})", position.x, position.y);
        Self {
            id,
            position,
            direction: Vec2::ZERO,
            health: config.max_health,
            animation,
            origin: position,
            spread,
            respawn_timer: 0.0,
            colliders: silhouette_colliders(config.width, config.collider_radius),
            config,
        }
    }

    /// Enemy tunables.
    #[must_use]
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Silhouette colliders.
    #[must_use]
    pub fn colliders(&self) -> &[Collider; 9] {
        &self.colliders
    }

    /// Whether health has run out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Radius to query the projectile grid with.
    #[must_use]
    pub fn query_radius(&self) -> f32 {
        self.config.width * 2.0
    }

    /// Tests candidate projectiles against the silhouette.
    ///
    /// Each projectile counts at most once, on its first overlapping
    /// collider. Returns the hit count and the summed projectile directions.
    pub fn take_hits<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a Projectile>,
    ) -> (u32, Vec2) {
        let mut hits = 0;
        let mut knockback = Vec2::ZERO;
        if self.is_dead() {
            return (hits, knockback);
        }
        for p in candidates {
            if self
                .colliders
                .iter()
                .any(|c| c.contains(self.position, p.position))
            {
                hits += 1;
                knockback += p.direction;
                self.health -= p.damage as i32;
            }
        }
        (hits, knockback)
    }

    /// Moves toward the player or counts down a respawn.
    ///
    /// Chases when the player is within the aggro radius but farther than
    /// half the player's width; `knockback` is added to the step.
    pub fn update<F>(
        &mut self,
        graph: &StateGraph<F>,
        player_pos: Vec2,
        player_width: f32,
        knockback: Vec2,
        dt: f32,
    ) -> bool {
        if self.is_dead() {
            self.direction = Vec2::ZERO;
            self.respawn_timer += dt;
            if self.respawn_timer >= self.config.respawn_cooldown {
                self.respawn();
                return true;
            }
            return false;
        }

        let distance = self.position.distance(player_pos);
        let moving = distance <= self.config.aggro_radius && distance > player_width / 2.0;
        if moving {
            let target = player_pos + self.spread * (player_width / 4.0);
            self.direction = (target - self.position).normalize_or_zero();
            self.position += self.direction * self.config.speed * dt + knockback;
        } else {
            self.direction = Vec2::ZERO;
        }

        self.animation
            .update(graph, self.direction, dt, moving, None);
        false
    }

    fn respawn(&mut self) {
        self.health = self.config.max_health;
        self.position = self.origin;
        self.respawn_timer = 0.0;
        self.direction = Vec2::ZERO;
        info!("{} respawned", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcane_kernel::animation::AnimationConfig;
    use arcane_kernel::character::{CharacterGraph, CharacterSheet};

    fn rig(pos: Vec2) -> (CharacterGraph, Enemy) {
        let character = CharacterGraph::build(&CharacterSheet::default()).expect("sheet");
        let mut rng = fastrand::Rng::with_seed(3);
        let enemy = Enemy::spawn(
            pos,
            EnemyConfig::default(),
            character.controller(AnimationConfig::default()),
            &mut rng,
        );
        (character, enemy)
    }

    fn projectile_at(pos: Vec2, dir: Vec2) -> Projectile {
        Projectile::spawn(&Default::default(), pos, dir)
    }

    #[test]
    fn test_silhouette_layout() {
        let c = silhouette_colliders(64.0, 10.0);
        assert_eq!(c[0].offset, Vec2::new(-8.0, -8.0));
        assert_eq!(c[2].offset, Vec2::new(8.0, -8.0));
        assert_eq!(c[4].offset, Vec2::new(0.0, -8.0 + 12.8));
        assert_eq!(c[8].offset, Vec2::new(8.0, -8.0 + 25.6));
    }

    #[test]
    fn test_hit_counts_once_per_projectile() {
        let (_, mut enemy) = rig(Vec2::new(300.0, 300.0));
        // overlaps several colliders
        let inside = projectile_at(Vec2::new(300.0, 300.0), Vec2::X);
        let outside = projectile_at(Vec2::new(300.0, 360.0), Vec2::X);

        let (hits, knockback) = enemy.take_hits([&inside, &outside]);
        assert_eq!(hits, 1);
        assert_eq!(knockback, Vec2::X);
        assert_eq!(enemy.health, 99);
    }

    #[test]
    fn test_bottom_row_extends_hitbox() {
        let (_, mut enemy) = rig(Vec2::new(300.0, 300.0));
        let low = projectile_at(Vec2::new(300.0, 325.0), Vec2::Y);
        assert_eq!(enemy.take_hits([&low]).0, 1);
    }

    #[test]
    fn test_chases_with_knockback() {
        let (character, mut enemy) = rig(Vec2::new(300.0, 300.0));
        let start = enemy.position;
        enemy.update(&character.graph, Vec2::new(600.0, 300.0), 64.0, Vec2::ZERO, 0.5);
        assert!(enemy.position.x > start.x + 20.0);

        let before = enemy.position;
        enemy.update(&character.graph, Vec2::new(600.0, 300.0), 64.0, Vec2::new(-1.0, 0.0), 0.0);
        assert_eq!(enemy.position, before - Vec2::X);
    }

    #[test]
    fn test_idle_outside_aggro_and_inside_reach() {
        let (character, mut enemy) = rig(Vec2::new(100.0, 100.0));
        enemy.update(&character.graph, Vec2::new(900.0, 900.0), 64.0, Vec2::ZERO, 0.5);
        assert_eq!(enemy.position, Vec2::new(100.0, 100.0));

        enemy.update(&character.graph, Vec2::new(110.0, 100.0), 64.0, Vec2::ZERO, 0.5);
        assert_eq!(enemy.position, Vec2::new(100.0, 100.0));
        assert_eq!(enemy.direction, Vec2::ZERO);
    }

    #[test]
    fn test_dead_enemy_respawns_at_origin() {
        let (character, mut enemy) = rig(Vec2::new(300.0, 300.0));
        enemy.position = Vec2::new(350.0, 320.0);
        enemy.health = 0;
        assert!(enemy.is_dead());

        let bolt = projectile_at(enemy.position, Vec2::X);
        assert_eq!(enemy.take_hits([&bolt]).0, 0);

        let player = Vec2::new(600.0, 300.0);
        assert!(!enemy.update(&character.graph, player, 64.0, Vec2::ZERO, 4.0));
        assert_eq!(enemy.position, Vec2::new(350.0, 320.0));
        assert!(enemy.update(&character.graph, player, 64.0, Vec2::ZERO, 1.0));
        assert_eq!(enemy.position, Vec2::new(300.0, 300.0));
        assert_eq!(enemy.health, 100);
    }
}
