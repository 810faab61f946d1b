//! Four-direction character animation graphs.
//!
//! Builds the walk / strife / block graph for an LPC-style character sheet:
//! one looping walk cycle per facing, fully cross-connected so a new
//! direction always lands on the first frame of its walk, plus clamped
//! single-frame strife poses and clamped block cycles reachable from every
//! walk frame.

use arcane_common::{AnimationError, FrameRect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{AnimationConfig, AnimationController};
use crate::state_graph::{labels, Closure, Cycle, SheetRegion, StateGraph, StateId};

/// Facing direction of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing up (north)
    Up = 0,
    /// Facing left (west)
    Left = 1,
    /// Facing down (south)
    #[default]
    Down = 2,
    /// Facing right (east)
    Right = 3,
}

impl Facing {
    /// All facings in sheet-row order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Transition label that selects this facing.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => labels::UP,
            Self::Left => labels::LEFT,
            Self::Down => labels::DOWN,
            Self::Right => labels::RIGHT,
        }
    }

    /// Row offset of this facing inside a four-row block of the sheet.
    #[must_use]
    pub const fn row_offset(self) -> u32 {
        self as u32
    }
}

/// Layout of a character sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSheet {
    /// Square frame size in pixels
    pub frame_size: u32,
    /// First of the four walk rows (up, left, down, right)
    pub walk_row: u32,
    /// Frames per walk cycle
    pub walk_frames: u32,
    /// First of the four block rows
    pub block_row: u32,
    /// Frames per block cycle
    pub block_frames: u32,
    /// Column of the strife pose in each walk row, by facing
    pub strife_cols: [u32; 4],
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            frame_size: 64,
            walk_row: 8,
            walk_frames: 9,
            block_row: 4,
            block_frames: 8,
            strife_cols: [3, 1, 3, 1],
        }
    }
}

/// Built character graph with handles to each cycle.
#[derive(Debug, Clone)]
pub struct CharacterGraph {
    /// The state arena
    pub graph: StateGraph<FrameRect>,
    /// Walk cycles by facing
    pub walk: [Cycle; 4],
    /// Strife poses by facing
    pub strife: [Cycle; 4],
    /// Block cycles by facing
    pub block: [Cycle; 4],
}

impl CharacterGraph {
    /// Builds the graph for a sheet.
    pub fn build(sheet: &CharacterSheet) -> Result<Self, AnimationError> {
        let mut graph = StateGraph::new();
        let [up, left, down, right] = Facing::ALL;

        let walk = [
            walk_cycle(&mut graph, sheet, up)?,
            walk_cycle(&mut graph, sheet, left)?,
            walk_cycle(&mut graph, sheet, down)?,
            walk_cycle(&mut graph, sheet, right)?,
        ];
        let strife = [
            strife_pose(&mut graph, sheet, up)?,
            strife_pose(&mut graph, sheet, left)?,
            strife_pose(&mut graph, sheet, down)?,
            strife_pose(&mut graph, sheet, right)?,
        ];
        let block = [
            block_cycle(&mut graph, sheet, up)?,
            block_cycle(&mut graph, sheet, left)?,
            block_cycle(&mut graph, sheet, down)?,
            block_cycle(&mut graph, sheet, right)?,
        ];

        for from in Facing::ALL {
            for to in Facing::ALL {
                if from != to {
                    let (source, target) = (walk[from as usize].start, walk[to as usize].start);
                    graph.connect_all(source, target, to.label())?;
                }
            }
            let source = walk[from as usize].start;
            graph.connect_all(source, strife[from as usize].start, labels::STRIFE)?;
            graph.connect_all(source, block[from as usize].start, labels::BLOCK)?;
        }

        debug!("Built character graph with {} states", graph.len());
        Ok(Self {
            graph,
            walk,
            strife,
            block,
        })
    }

    /// Initial state for a fresh character (first walk-down frame).
    #[must_use]
    pub fn start(&self) -> StateId {
        self.walk[Facing::Down as usize].start
    }

    /// Creates a controller positioned at [`Self::start`].
    #[must_use]
    pub fn controller(&self, config: AnimationConfig) -> AnimationController {
        AnimationController::new(self.start(), config)
    }

    /// Facing whose walk cycle contains `state`, if any.
    #[must_use]
    pub fn facing_of(&self, state: StateId) -> Option<Facing> {
        Facing::ALL
            .into_iter()
            .find(|f| self.graph.cycle_states(self.walk[*f as usize].start).contains(&state))
    }
}

fn walk_cycle(
    graph: &mut StateGraph<FrameRect>,
    sheet: &CharacterSheet,
    facing: Facing,
) -> Result<Cycle, AnimationError> {
    let row = sheet.walk_row + facing.row_offset();
    graph.build_sheet_cycle(
        &format!("walk_{}", facing.label()),
        SheetRegion::new(row, 0, sheet.walk_frames, sheet.frame_size),
        Closure::Loop,
    )
}

fn strife_pose(
    graph: &mut StateGraph<FrameRect>,
    sheet: &CharacterSheet,
    facing: Facing,
) -> Result<Cycle, AnimationError> {
    let row = sheet.walk_row + facing.row_offset();
    let col = sheet.strife_cols[facing as usize];
    graph.build_sheet_cycle(
        &format!("strife_{}", facing.label()),
        SheetRegion::new(row, col, 1, sheet.frame_size),
        Closure::Clamp,
    )
}

fn block_cycle(
    graph: &mut StateGraph<FrameRect>,
    sheet: &CharacterSheet,
    facing: Facing,
) -> Result<Cycle, AnimationError> {
    let row = sheet.block_row + facing.row_offset();
    graph.build_sheet_cycle(
        &format!("block_{}", facing.label()),
        SheetRegion::new(row, 0, sheet.block_frames, sheet.frame_size),
        Closure::Clamp,
    )
}
