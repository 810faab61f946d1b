//! Animation controller driving a [`StateGraph`] from movement input.
//!
//! The controller holds a cursor into a graph it does not own. Each tick it
//! receives the entity's direction vector, elapsed time, whether the entity
//! is moving, and an optional override label (`strife`, `block`).
//!
//! Frame advancement is gated by a cadence threshold so animation speed is
//! independent of the simulation tick rate.
//!
//! # Example
//!
//! ```
//! use arcane_kernel::animation::{AnimationConfig, AnimationController};
//! use arcane_kernel::state_graph::{Closure, SheetRegion, StateGraph};
//! use glam::Vec2;
//!
//! let mut graph = StateGraph::new();
//! let walk = graph
//!     .build_sheet_cycle("walk_down", SheetRegion::new(10, 0, 9, 64), Closure::Loop)
//!     .expect("frames");
//!
//! let mut anim = AnimationController::new(walk.start, AnimationConfig::default());
//! anim.update(&graph, Vec2::new(0.0, 1.0), 0.2, true, None);
//! assert_eq!(graph.frame(anim.current_state()).column(), 1);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::state_graph::{labels, StateGraph, StateId};

/// Default time between animation steps, in seconds.
pub const DEFAULT_CADENCE: f32 = 0.150;

/// Default ratio applied to `|y|` when classifying direction.
pub const DEFAULT_DIRECTION_RATIO: f32 = 0.5;

/// Tunables for an [`AnimationController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds that must accumulate before one step is taken
    pub cadence: f32,
    /// Horizontal wins when `|x| > direction_ratio * |y|`
    pub direction_ratio: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            direction_ratio: DEFAULT_DIRECTION_RATIO,
        }
    }
}

/// Picks the directional label for a vector.
///
/// Horizontal wins when `|x| > ratio * |y|`. A zero vector classifies as
/// `up`; callers gate on `moving` before this matters.
#[must_use]
pub fn classify_direction(direction: Vec2, ratio: f32) -> &'static str {
    if direction.x.abs() > (direction.y * ratio).abs() {
        if direction.x > 0.0 {
            labels::RIGHT
        } else {
            labels::LEFT
        }
    } else if direction.y > 0.0 {
        labels::DOWN
    } else {
        labels::UP
    }
}

/// Cursor into a state graph, one per animated entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationController {
    current: StateId,
    override_state: Option<StateId>,
    time_in_state: f32,
    config: AnimationConfig,
}

impl AnimationController {
    /// Creates a controller positioned at `start`.
    #[must_use]
    pub fn new(start: StateId, config: AnimationConfig) -> Self {
        Self {
            current: start,
            override_state: None,
            time_in_state: 0.0,
            config,
        }
    }

    /// Current directional state.
    #[must_use]
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Active override state, if any.
    #[must_use]
    pub fn override_state(&self) -> Option<StateId> {
        self.override_state
    }

    /// Whether an override pose is showing.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.override_state.is_some()
    }

    /// Seconds accumulated toward the next step.
    #[must_use]
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Controller tunables.
    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// The state whose payload is showing.
    #[must_use]
    pub fn visible_state(&self) -> StateId {
        self.override_state.unwrap_or(self.current)
    }

    /// Frame handle to draw this tick.
    #[must_use]
    pub fn current_frame<'g, F>(&self, graph: &'g StateGraph<F>) -> &'g F {
        graph.frame(self.visible_state())
    }

    /// Jumps to `state`, dropping any override and pending time.
    pub fn reset(&mut self, state: StateId) {
        self.current = state;
        self.override_state = None;
        self.time_in_state = 0.0;
    }

    /// Advances the controller by one simulation tick.
    ///
    /// Returns `true` when the visible frame may have changed.
    ///
    /// Override handling runs first and ignores the cadence: while an
    /// override label is held the override cycle steps through `next` once
    /// per tick and directional input is ignored. The pose is chosen when the
    /// override engages; switching to another label while one is held keeps
    /// stepping the current pose. Releasing every label restores the
    /// directional state held before the override began.
    ///
    /// Otherwise time accumulates until it reaches the cadence, then one
    /// directional step is taken. A state with no transition for the chosen
    /// label continues its own cycle while moving and holds while stationary.
    pub fn update<F>(
        &mut self,
        graph: &StateGraph<F>,
        direction: Vec2,
        dt: f32,
        moving: bool,
        override_label: Option<&str>,
    ) -> bool {
        match (override_label, self.override_state) {
            (Some(_), Some(active)) => {
                let next = graph.next(active).unwrap_or(active);
                self.override_state = Some(next);
                return next != active;
            },
            (Some(label), None) => {
                if let Some(target) = graph.transition(self.current, label) {
                    trace!(label, "override engaged");
                    self.override_state = Some(target);
                    self.time_in_state = 0.0;
                    return true;
                }
                // no pose for this label here; fall through to walking
            },
            (None, Some(_)) => {
                trace!("override released");
                self.override_state = None;
                self.time_in_state = 0.0;
                return true;
            },
            (None, None) => {},
        }

        self.time_in_state += dt;
        if self.time_in_state < self.config.cadence {
            return false;
        }
        self.time_in_state = 0.0;

        if !moving {
            return false;
        }

        let label = classify_direction(direction, self.config.direction_ratio);
        let next = graph
            .transition(self.current, label)
            .or_else(|| graph.next(self.current));

        match next {
            Some(next) if next != self.current => {
                self.current = next;
                true
            },
            _ => false,
        }
    }
}
