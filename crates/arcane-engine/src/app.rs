//! Headless session driver.
//!
//! Builds the combat world from config, feeds it scripted input through a
//! fixed timestep and logs stats as the session runs.

use std::f32::consts::TAU;

use anyhow::{Context, Result};
use arcane_gameplay::input::{Button, InputState};
use arcane_gameplay::{combat_step, CombatContext, TickReport, World};
use arcane_kernel::status_bar::StatusKind;
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::timing::FixedTimestep;

/// Frame delta fed to the timestep; a 60 Hz display.
const FRAME_DT: f32 = 1.0 / 60.0;

/// Totals over a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Projectiles fired
    pub fired: usize,
    /// Projectiles culled
    pub culled: usize,
    /// Projectile-enemy hits
    pub hits: u32,
    /// Enemies killed
    pub kills: u32,
    /// Enemies respawned
    pub respawns: u32,
}

impl SessionSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks = report.tick;
        self.fired += report.fired;
        self.culled += report.culled;
        self.hits += report.hits;
        self.kills += report.kills;
        self.respawns += report.respawns;
    }
}

/// Cursor circling the viewport center, with periodic dash and block.
#[derive(Debug, Clone)]
struct InputScript {
    center: Vec2,
    radius: f32,
}

impl InputScript {
    fn apply(&self, input: &mut InputState, time: f32) {
        let angle = time * TAU / 12.0;
        input.set_cursor(self.center + Vec2::from_angle(angle) * self.radius);
        input.set_button(Button::Fire, true);
        // dash for one moment every 3 s, block for half a second every 5 s
        input.set_button(Button::Dash, time % 3.0 < 0.05);
        input.set_button(Button::Block, time % 5.0 > 4.5);
    }
}

/// A running headless session.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    ctx: CombatContext,
    world: World,
    timestep: FixedTimestep,
    input: InputState,
    script: InputScript,
    summary: SessionSummary,
}

impl Session {
    /// Builds the world and spawns enemies on a ring around the center.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let viewport = config.viewport();
        let combat = config.combat();
        let mut ctx = CombatContext::new(viewport, config.cell_size, &combat.status, config.seed)
            .context("failed to build status bars")?;
        let mut world =
            World::new(&combat, &mut ctx.rng).context("failed to build character graph")?;

        let center = viewport.center();
        let ring = viewport.width.min(viewport.height) * 0.35;
        for i in 0..config.enemy_count {
            let angle = i as f32 * TAU / config.enemy_count as f32;
            world.spawn_enemy(center + Vec2::from_angle(angle) * ring, &mut ctx.rng);
        }
        info!(
            "Session ready: {} enemies, {} states in character graph",
            world.enemies.len(),
            world.character.graph.len()
        );

        Ok(Self {
            timestep: FixedTimestep::new(config.tick_rate),
            script: InputScript {
                center,
                radius: ring * 0.6,
            },
            input: InputState::new(),
            summary: SessionSummary::default(),
            config,
            ctx,
            world,
        })
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Runs one display frame: zero or more fixed ticks.
    pub fn frame(&mut self, frame_dt: f32) {
        let dt = self.timestep.fixed_dt();
        for _ in 0..self.timestep.accumulate(frame_dt) {
            if self.summary.ticks >= self.config.ticks {
                return;
            }
            let time = self.ctx.tick as f32 * dt;
            self.script.apply(&mut self.input, time);
            let report = combat_step(&mut self.ctx, &mut self.world, &self.input.snapshot(), dt);
            self.input.end_tick();
            self.summary.record(&report);

            let stats_every = (self.config.stats_interval / dt).round().max(1.0) as u64;
            if report.tick % stats_every == 0 {
                self.log_stats();
            }
        }
    }

    /// Runs until the configured tick count is reached.
    pub fn run(&mut self) -> SessionSummary {
        while self.summary.ticks < self.config.ticks {
            self.frame(FRAME_DT);
        }
        debug!(
            "Timestep handed out {} ticks, dropped {:.3}s",
            self.timestep.total_ticks(),
            self.timestep.dropped()
        );
        self.summary
    }

    fn log_stats(&self) {
        let alive = self.world.enemies.iter().filter(|e| !e.is_dead()).count();
        let health: i32 = self.world.enemies.iter().map(|e| e.health.max(0)).sum();
        info!(
            "t={:.1}s projectiles={} particles={:.2}K enemies={}/{} enemy_hp={} mana={}",
            self.timestep.elapsed(),
            self.world.projectile_count(),
            self.world.particle_count() as f32 / 1000.0,
            alive,
            self.world.enemies.len(),
            health,
            self.ctx.status.remaining(StatusKind::Mana),
        );
        debug!(
            "player at ({:.0}, {:.0}) frame {:?} alpha {:.2}",
            self.world.player.position.x,
            self.world.player.position.y,
            self.world.player_frame(),
            self.timestep.alpha()
        );
    }
}

/// Loads config, runs a session and logs the summary.
pub fn run() -> Result<()> {
    let path = EngineConfig::config_path();
    let mut config = EngineConfig::load_from(&path);
    config.validate();
    if !path.exists() {
        if let Err(e) = config.save_to(&path) {
            warn!("Could not write default config: {e}");
        }
    }
    info!(
        "Running {} ticks at {} Hz with seed {}",
        config.ticks, config.tick_rate, config.seed
    );

    let mut session = Session::new(config)?;
    session.run();
    let summary = session.summary();

    info!(
        "Session complete: {} ticks, {} fired, {} culled, {} hits, {} kills, {} respawns",
        summary.ticks,
        summary.fired,
        summary.culled,
        summary.hits,
        summary.kills,
        summary.respawns
    );
    Ok(())
}
