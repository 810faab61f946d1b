//! Per-tick combat orchestration.
//!
//! [`combat_step`] runs one fixed tick over an explicit [`CombatContext`]
//! (shared services) and [`World`] (entities). The order is fixed:
//!
//! 1. player movement
//! 2. projectile advance and cull, with grid reindexing
//! 3. firing and mana bookkeeping
//! 4. enemy grid queries, hit resolution and AI
//! 5. animation controllers
//!
//! Every projectile is reindexed before any enemy queries the grid, so a
//! query always sees the positions of the current tick.

use ahash::AHashMap;
use arcane_common::{AnimationError, FrameRect, ProjectileId, Viewport};
use arcane_kernel::animation::AnimationConfig;
use arcane_kernel::character::{CharacterGraph, CharacterSheet};
use arcane_kernel::projectile::Projectile;
use arcane_kernel::spatial_grid::SpatialGrid;
use arcane_kernel::status_bar::{StatusBar, StatusBarConfig, StatusKind};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::enemy::{Enemy, EnemyConfig, EnemyOutcome};
use crate::input::PlayerInput;
use crate::player::{Player, PlayerConfig};
use crate::weapon::{Weapon, WeaponConfig};

/// Tunables for building a [`World`] and its [`CombatContext`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Character sheet layout shared by the player and enemies
    pub sheet: CharacterSheet,
    /// Animation tunables
    pub animation: AnimationConfig,
    /// Status bar layout and pip counts
    pub status: StatusBarConfig,
    /// Player tunables
    pub player: PlayerConfig,
    /// One entry per equipped weapon
    pub weapons: Vec<WeaponConfig>,
    /// Enemy tunables
    pub enemy: EnemyConfig,
}

/// Shared services threaded through every tick.
#[derive(Debug)]
pub struct CombatContext {
    /// Playfield bounds
    pub viewport: Viewport,
    /// Projectile broad phase
    pub grid: SpatialGrid,
    /// Player health and mana
    pub status: StatusBar,
    /// Seeded randomness for jitter and spawns
    pub rng: fastrand::Rng,
    /// Ticks completed
    pub tick: u64,
}

impl CombatContext {
    /// Creates a context with an empty grid and full status bars.
    pub fn new(
        viewport: Viewport,
        cell_size: f32,
        status: &StatusBarConfig,
        seed: u64,
    ) -> Result<Self, AnimationError> {
        Ok(Self {
            viewport,
            grid: SpatialGrid::new(cell_size),
            status: StatusBar::new(status)?,
            rng: fastrand::Rng::with_seed(seed),
            tick: 0,
        })
    }
}

/// Everything that moves.
#[derive(Debug)]
pub struct World {
    /// Animation graph shared by every character
    pub character: CharacterGraph,
    /// The player
    pub player: Player,
    /// Player weapons
    pub weapons: Vec<Weapon>,
    /// Live and respawning enemies
    pub enemies: Vec<Enemy>,
    enemy_config: EnemyConfig,
}

impl World {
    /// Builds the character graph, the player and its weapons.
    pub fn new(config: &CombatConfig, rng: &mut fastrand::Rng) -> Result<Self, AnimationError> {
        let character = CharacterGraph::build(&config.sheet)?;
        let player = Player::new(config.player, character.controller(config.animation));
        let weapons = if config.weapons.is_empty() {
            vec![Weapon::new(WeaponConfig::default(), rng)]
        } else {
            config.weapons.iter().map(|w| Weapon::new(*w, rng)).collect()
        };
        Ok(Self {
            character,
            player,
            weapons,
            enemies: Vec::new(),
            enemy_config: config.enemy,
        })
    }

    /// Adds an enemy at `position`.
    pub fn spawn_enemy(&mut self, position: Vec2, rng: &mut fastrand::Rng) -> &Enemy {
        let animation = self.character.controller(*self.player.animation.config());
        let enemy = Enemy::spawn(position, self.enemy_config, animation, rng);
        self.enemies.push(enemy);
        &self.enemies[self.enemies.len() - 1]
    }

    /// Projectiles in flight across all weapons.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.weapons.iter().map(|w| w.projectiles().len()).sum()
    }

    /// Trail particles across all weapons.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.weapons.iter().map(|w| w.trail().len()).sum()
    }

    /// Frame to draw for the player.
    #[must_use]
    pub fn player_frame(&self) -> FrameRect {
        *self.player.animation.current_frame(&self.character.graph)
    }

    /// Frame to draw for each enemy, in spawn order.
    #[must_use]
    pub fn enemy_frames(&self) -> Vec<FrameRect> {
        self.enemies
            .iter()
            .map(|e| *e.animation.current_frame(&self.character.graph))
            .collect()
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Projectiles fired
    pub fired: usize,
    /// Projectiles culled by gas or bounds
    pub culled: usize,
    /// Projectile-enemy hits
    pub hits: u32,
    /// Enemies killed
    pub kills: u32,
    /// Enemies respawned
    pub respawns: u32,
    /// Whether a mana pip was restored
    pub mana_restored: bool,
    /// Projectiles in flight after the tick
    pub in_flight: usize,
}

/// Advances the simulation by one fixed tick.
pub fn combat_step(
    ctx: &mut CombatContext,
    world: &mut World,
    input: &PlayerInput,
    dt: f32,
) -> TickReport {
    ctx.tick += 1;
    let mut report = TickReport {
        tick: ctx.tick,
        ..TickReport::default()
    };
    let World {
        character,
        player,
        weapons,
        enemies,
        ..
    } = world;

    // 1. player
    player.update_movement(input, &ctx.viewport, dt);

    // 2. projectiles
    for weapon in weapons.iter_mut() {
        weapon.tick(dt);
        report.culled += weapon.advance_projectiles(&mut ctx.grid, &ctx.viewport, dt);
    }

    // 3. firing
    for weapon in weapons.iter_mut() {
        if input.fire && weapon.is_ready() && ctx.status.has_any(StatusKind::Mana) {
            weapon.fire(player.position, player.direction, &mut ctx.grid, &mut ctx.rng);
            report.fired += 1;
        }
    }
    if report.fired > 0 {
        ctx.status.decrement(1, StatusKind::Mana);
    }
    let cooling = weapons.iter().any(|w| !w.is_ready());
    if player.regen_mana(dt, !cooling && report.fired == 0) {
        report.mana_restored = ctx.status.increment(1, StatusKind::Mana) > 0;
    }
    for weapon in weapons.iter_mut() {
        weapon.update_trail(dt);
    }

    // 4. enemies
    let by_id: AHashMap<ProjectileId, &Projectile> = weapons
        .iter()
        .flat_map(|w| w.projectiles())
        .map(|p| (p.id, p))
        .collect();
    let mut nearby = Vec::new();
    for enemy in enemies.iter_mut() {
        let outcome = resolve_enemy(enemy, &ctx.grid, &by_id, &mut nearby, player, character, dt);
        report.hits += outcome.hits;
        report.kills += u32::from(outcome.killed);
        report.respawns += u32::from(outcome.respawned);
    }

    // 5. animation
    player.animation.update(
        &character.graph,
        player.direction,
        dt,
        player.is_moving(),
        player.override_label(),
    );

    report.in_flight = by_id.len();
    trace!(tick = report.tick, fired = report.fired, hits = report.hits, "tick");
    report
}

fn resolve_enemy(
    enemy: &mut Enemy,
    grid: &SpatialGrid,
    by_id: &AHashMap<ProjectileId, &Projectile>,
    nearby: &mut Vec<ProjectileId>,
    player: &Player,
    character: &CharacterGraph,
    dt: f32,
) -> EnemyOutcome {
    let was_alive = !enemy.is_dead();

    nearby.clear();
    grid.query_into(enemy.position, enemy.query_radius(), nearby);
    let candidates = nearby.iter().filter_map(|id| by_id.get(id).copied());
    let (hits, knockback) = enemy.take_hits(candidates);

    let killed = was_alive && enemy.is_dead();
    if killed {
        info!("{} killed", enemy.id);
    }
    let respawned = enemy.update(
        &character.graph,
        player.position,
        player.config().width,
        knockback,
        dt,
    );
    EnemyOutcome {
        hits,
        killed,
        respawned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcane_kernel::character::Facing;

    const DT: f32 = 1.0 / 120.0;

    fn setup() -> (CombatContext, World) {
        let config = CombatConfig::default();
        let mut ctx = CombatContext::new(Viewport::default(), 64.0, &config.status, 42)
            .expect("context");
        let world = World::new(&config, &mut ctx.rng).expect("world");
        (ctx, world)
    }

    fn ready_weapons(world: &mut World) {
        for w in &mut world.weapons {
            w.tick(10.0);
        }
    }

    #[test]
    fn test_fire_consumes_mana_and_registers() {
        let (mut ctx, mut world) = setup();
        ready_weapons(&mut world);
        let input = PlayerInput::at(Vec2::new(600.0, 100.0)).with_fire(true);

        let report = combat_step(&mut ctx, &mut world, &input, DT);
        assert_eq!(report.fired, 1);
        assert_eq!(report.in_flight, 1);
        assert_eq!(ctx.status.remaining(StatusKind::Mana), 7);
        assert_eq!(ctx.grid.len(), 1);
        assert!(ctx.grid.check_invariants().is_ok());
    }

    #[test]
    fn test_no_fire_without_mana() {
        let (mut ctx, mut world) = setup();
        ctx.status.decrement(100, StatusKind::Mana);
        ready_weapons(&mut world);

        let input = PlayerInput::at(Vec2::new(600.0, 100.0)).with_fire(true);
        let report = combat_step(&mut ctx, &mut world, &input, DT);
        assert_eq!(report.fired, 0);
        assert!(ctx.grid.is_empty());
    }

    #[test]
    fn test_mana_regenerates_when_idle() {
        let (mut ctx, mut world) = setup();
        ready_weapons(&mut world);
        ctx.status.decrement(2, StatusKind::Mana);

        let idle = PlayerInput::at(world.player.position);
        let report = combat_step(&mut ctx, &mut world, &idle, DT);
        assert!(report.mana_restored);
        assert_eq!(ctx.status.remaining(StatusKind::Mana), 7);
    }

    /// Fires the first weapon so its projectile spawns just left of `target`.
    fn fire_at(ctx: &mut CombatContext, world: &mut World, target: Vec2) {
        let origin = target - Vec2::new(33.0, 0.0);
        world.weapons[0].fire(origin, Vec2::X, &mut ctx.grid, &mut ctx.rng);
    }

    #[test]
    fn test_projectile_hits_enemy_in_same_tick() {
        let (mut ctx, mut world) = setup();
        world.spawn_enemy(Vec2::new(400.0, 400.0), &mut ctx.rng);
        fire_at(&mut ctx, &mut world, Vec2::new(400.0, 400.0));

        let idle = PlayerInput::at(world.player.position);
        let report = combat_step(&mut ctx, &mut world, &idle, DT);
        assert_eq!(report.hits, 1);
        assert_eq!(world.enemies[0].health, 99);
    }

    #[test]
    fn test_enemy_killed_then_respawns() {
        let (mut ctx, mut world) = setup();
        // outside aggro range of the player so it never moves
        let home = Vec2::new(1100.0, 800.0);
        world.spawn_enemy(home, &mut ctx.rng);
        world.enemies[0].health = 1;
        fire_at(&mut ctx, &mut world, home);

        let idle = PlayerInput::at(world.player.position);
        let report = combat_step(&mut ctx, &mut world, &idle, DT);
        assert_eq!(report.kills, 1);
        assert!(world.enemies[0].is_dead());

        let mut respawns = 0;
        for _ in 0..(5 * 120 + 10) {
            respawns += combat_step(&mut ctx, &mut world, &idle, DT).respawns;
        }
        assert_eq!(respawns, 1);
        assert_eq!(world.enemies[0].position, home);
        assert_eq!(world.enemies[0].health, 100);
    }

    #[test]
    fn test_player_animation_follows_cursor() {
        let (mut ctx, mut world) = setup();
        let right = PlayerInput::at(Vec2::new(1000.0, 100.0));
        for _ in 0..20 {
            combat_step(&mut ctx, &mut world, &right, DT);
        }
        let facing = world.character.facing_of(world.player.animation.current_state());
        assert_eq!(facing, Some(Facing::Right));
        assert_eq!(world.player_frame().row(), 11);
    }

    #[test]
    fn test_block_override_while_held() {
        let (mut ctx, mut world) = setup();
        let block = PlayerInput::at(Vec2::new(1000.0, 100.0)).with_block(true);
        combat_step(&mut ctx, &mut world, &block, DT);
        assert!(world.player.animation.is_overridden());
        assert_eq!(world.player_frame().row(), 6);

        let walk = PlayerInput::at(Vec2::new(1000.0, 100.0));
        combat_step(&mut ctx, &mut world, &walk, DT);
        assert!(!world.player.animation.is_overridden());
    }

    #[test]
    fn test_long_session_keeps_grid_consistent() {
        let (mut ctx, mut world) = setup();
        for i in 0..4 {
            world.spawn_enemy(Vec2::new(300.0 + 150.0 * i as f32, 500.0), &mut ctx.rng);
        }
        for t in 0..(120 * 20) {
            let angle = t as f32 * 0.01;
            let cursor = Vec2::new(640.0, 480.0) + Vec2::from_angle(angle) * 300.0;
            let input = PlayerInput::at(cursor)
                .with_fire(true)
                .with_dash(t % 240 == 0);
            combat_step(&mut ctx, &mut world, &input, DT);
        }
        assert!(ctx.grid.check_invariants().is_ok());
        assert_eq!(ctx.grid.len(), world.projectile_count());
        assert_eq!(ctx.tick, 2400);
    }
}
