//! Directed graph of animation frame-states with labelled transitions.
//!
//! States live in an arena and are addressed by [`StateId`]. Each state
//! carries an opaque payload (normally a [`FrameRect`] into a sprite sheet)
//! and a small map from input label to the next state.
//!
//! A chain of states linked by [`labels::NEXT`] / [`labels::PREV`] is a
//! [`Cycle`]. Cycles either loop back to their first frame or clamp on
//! their last one.
//!
//! # Example
//!
//! ```
//! use arcane_kernel::state_graph::{labels, Closure, SheetRegion, StateGraph};
//!
//! let mut graph = StateGraph::new();
//! let walk = graph
//!     .build_sheet_cycle("walk_right", SheetRegion::new(11, 0, 9, 64), Closure::Loop)
//!     .expect("nine frames");
//!
//! let second = graph.next(walk.start).expect("looping cycle has next");
//! assert_ne!(second, walk.start);
//! assert_eq!(graph.transition(walk.start, labels::PREV), Some(walk.start));
//! ```

use std::collections::{HashMap, VecDeque};

use arcane_common::{AnimationError, FrameRect};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Well-known transition labels.
pub mod labels {
    /// Advance within a cycle.
    pub const NEXT: &str = "next";
    /// Step back within a cycle.
    pub const PREV: &str = "prev";
    /// Face up.
    pub const UP: &str = "up";
    /// Face down.
    pub const DOWN: &str = "down";
    /// Face left.
    pub const LEFT: &str = "left";
    /// Face right.
    pub const RIGHT: &str = "right";
    /// Dash pose override.
    pub const STRIFE: &str = "strife";
    /// Block pose override.
    pub const BLOCK: &str = "block";
}

/// Index of a state inside a [`StateGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
    /// Creates a state id from a raw arena index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How the last frame of a cycle is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Closure {
    /// `last.next = first`
    #[default]
    Loop,
    /// `last.next = last` (freeze on the final frame)
    Clamp,
}

/// Region of a grid-aligned sprite sheet holding one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRegion {
    /// Sheet row
    pub row: u32,
    /// First column
    pub start_col: u32,
    /// Number of frames
    pub frame_count: u32,
    /// Square frame size in pixels
    pub frame_width: u32,
}

impl SheetRegion {
    /// Creates a new sheet region.
    #[must_use]
    pub const fn new(row: u32, start_col: u32, frame_count: u32, frame_width: u32) -> Self {
        Self {
            row,
            start_col,
            frame_count,
            frame_width,
        }
    }

    /// Frame rectangles covered by this region, left to right.
    pub fn frames(&self) -> impl Iterator<Item = FrameRect> + '_ {
        (self.start_col..self.start_col + self.frame_count)
            .map(move |col| FrameRect::at(self.row, col, self.frame_width))
    }
}

/// Handle to a built cycle.
///
/// `current` starts equal to `start`, so a fresh cycle can be used directly
/// as a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// First frame
    pub start: StateId,
    /// Cursor into the cycle
    pub current: StateId,
    /// Number of frames
    pub len: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct State<F> {
    name: String,
    payload: F,
    transitions: HashMap<String, StateId>,
}

/// Arena of animation states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateGraph<F = FrameRect> {
    states: Vec<State<F>>,
}

impl<F> Default for StateGraph<F> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<F> StateGraph<F> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the graph has no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether `id` belongs to this graph.
    #[must_use]
    pub fn contains(&self, id: StateId) -> bool {
        id.index() < self.states.len()
    }

    /// Adds a state with no transitions.
    pub fn add_state(&mut self, name: impl Into<String>, payload: F) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(State {
            name: name.into(),
            payload,
            transitions: HashMap::new(),
        });
        id
    }

    /// Adds (or replaces) the transition `from --label--> to`.
    pub fn add_transition(
        &mut self,
        from: StateId,
        label: &str,
        to: StateId,
    ) -> Result<(), AnimationError> {
        self.check(to)?;
        let len = self.states.len();
        let state = self
            .states
            .get_mut(from.index())
            .ok_or(AnimationError::UnknownState {
                index: from.index(),
                len,
            })?;
        state.transitions.insert(label.to_owned(), to);
        Ok(())
    }

    /// Follows `label` out of `id`. `None` means the state absorbs that label.
    #[must_use]
    pub fn transition(&self, id: StateId, label: &str) -> Option<StateId> {
        self.states
            .get(id.index())
            .and_then(|s| s.transitions.get(label).copied())
    }

    /// Shortcut for the `next` transition.
    #[must_use]
    pub fn next(&self, id: StateId) -> Option<StateId> {
        self.transition(id, labels::NEXT)
    }

    /// Shortcut for the `prev` transition.
    #[must_use]
    pub fn prev(&self, id: StateId) -> Option<StateId> {
        self.transition(id, labels::PREV)
    }

    /// Payload of a state, if it exists.
    #[must_use]
    pub fn payload(&self, id: StateId) -> Option<&F> {
        self.states.get(id.index()).map(|s| &s.payload)
    }

    /// Payload of a state.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this graph.
    #[must_use]
    pub fn frame(&self, id: StateId) -> &F {
        &self.states[id.index()].payload
    }

    /// Debug name of a state.
    #[must_use]
    pub fn name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.index()).map(|s| s.name.as_str())
    }

    /// Labels leaving a state, in no particular order.
    pub fn labels(&self, id: StateId) -> impl Iterator<Item = &str> + '_ {
        self.states
            .get(id.index())
            .into_iter()
            .flat_map(|s| s.transitions.keys().map(String::as_str))
    }

    /// Builds a chain of states from `payloads`.
    ///
    /// Adjacent states are linked with `next`/`prev`. The first state's
    /// `prev` points at itself; the last state's `next` follows `closure`.
    pub fn build_cycle<I>(
        &mut self,
        name: &str,
        payloads: I,
        closure: Closure,
    ) -> Result<Cycle, AnimationError>
    where
        I: IntoIterator<Item = F>,
    {
        let mut start: Option<StateId> = None;
        let mut last: Option<StateId> = None;
        let mut len = 0u32;

        for payload in payloads {
            let id = self.add_state(format!("{name}/frame{len}"), payload);
            if let Some(prev) = last {
                self.add_transition(prev, labels::NEXT, id)?;
                self.add_transition(id, labels::PREV, prev)?;
            }
            start.get_or_insert(id);
            last = Some(id);
            len += 1;
        }

        let (Some(start), Some(last)) = (start, last) else {
            return Err(AnimationError::EmptyCycle {
                name: name.to_owned(),
            });
        };

        match closure {
            Closure::Loop => self.add_transition(last, labels::NEXT, start)?,
            Closure::Clamp => self.add_transition(last, labels::NEXT, last)?,
        }
        self.add_transition(start, labels::PREV, start)?;

        debug!("Built {closure:?} cycle '{name}' with {len} frames");
        Ok(Cycle {
            start,
            current: start,
            len,
        })
    }

    /// Every state of the cycle starting at `start`, in `next` order.
    ///
    /// Stops when `next` returns to `start` (loop closure) or fails to
    /// advance (clamp closure). Bounded by the arena size so a miswired
    /// graph cannot spin forever.
    #[must_use]
    pub fn cycle_states(&self, start: StateId) -> Vec<StateId> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut states = vec![start];
        let mut current = start;
        while states.len() < self.states.len() {
            match self.next(current) {
                Some(next) if next != start && next != current => {
                    states.push(next);
                    current = next;
                },
                _ => break,
            }
        }
        states
    }

    /// Links every state of the source cycle to `target_start` under `label`.
    ///
    /// Attaching from every frame (not only the first) lets an entity switch
    /// cycles mid-stride.
    pub fn connect_all(
        &mut self,
        source_start: StateId,
        target_start: StateId,
        label: &str,
    ) -> Result<(), AnimationError> {
        self.check(source_start)?;
        for id in self.cycle_states(source_start) {
            self.add_transition(id, label, target_start)?;
        }
        Ok(())
    }

    /// All states reachable from `start` through any label, breadth first.
    #[must_use]
    pub fn reachable_from(&self, start: StateId) -> Vec<StateId> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut seen = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[start.index()] = true;

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &to in self.states[id.index()].transitions.values() {
                if !seen[to.index()] {
                    seen[to.index()] = true;
                    queue.push_back(to);
                }
            }
        }
        order
    }

    /// Verifies that each of `states` is reachable from `start`.
    pub fn verify_reachable(
        &self,
        start: StateId,
        states: &[StateId],
    ) -> Result<(), AnimationError> {
        self.check(start)?;
        let reachable = self.reachable_from(start);
        match states.iter().find(|id| !reachable.contains(id)) {
            Some(id) => Err(AnimationError::Unreachable {
                index: id.index(),
                start: start.index(),
            }),
            None => Ok(()),
        }
    }

    fn check(&self, id: StateId) -> Result<(), AnimationError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(AnimationError::UnknownState {
                index: id.index(),
                len: self.states.len(),
            })
        }
    }
}

impl StateGraph<FrameRect> {
    /// Builds a cycle from a sprite-sheet region.
    pub fn build_sheet_cycle(
        &mut self,
        name: &str,
        region: SheetRegion,
        closure: Closure,
    ) -> Result<Cycle, AnimationError> {
        let frames: Vec<FrameRect> = region.frames().collect();
        self.build_cycle(name, frames, closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(graph: &mut StateGraph, name: &str, row: u32, closure: Closure) -> Cycle {
        graph
            .build_sheet_cycle(name, SheetRegion::new(row, 0, 9, 64), closure)
            .expect("valid region")
    }

    fn step(graph: &StateGraph, from: StateId, n: usize) -> StateId {
        (0..n).fold(from, |id, _| graph.next(id).expect("next exists"))
    }

    #[test]
    fn test_loop_returns_to_start_after_n_steps() {
        let mut graph = StateGraph::new();
        let cycle = walk(&mut graph, "walk", 11, Closure::Loop);

        assert_eq!(cycle.len, 9);
        assert_eq!(cycle.current, cycle.start);
        for n in 1..9 {
            assert_ne!(step(&graph, cycle.start, n), cycle.start);
        }
        assert_eq!(step(&graph, cycle.start, 9), cycle.start);
    }

    #[test]
    fn test_clamp_freezes_on_last_frame() {
        let mut graph = StateGraph::new();
        let cycle = walk(&mut graph, "block", 4, Closure::Clamp);

        let last = step(&graph, cycle.start, 8);
        assert_eq!(graph.frame(last).column(), 8);
        assert_eq!(graph.next(last), Some(last));
        assert_eq!(step(&graph, cycle.start, 20), last);
    }

    #[test]
    fn test_prev_walks_back_and_clamps_at_start() {
        let mut graph = StateGraph::new();
        let cycle = walk(&mut graph, "walk", 0, Closure::Loop);

        let third = step(&graph, cycle.start, 2);
        let second = graph.prev(third).expect("prev");
        assert_eq!(graph.frame(second).column(), 1);
        assert_eq!(graph.prev(cycle.start), Some(cycle.start));
    }

    #[test]
    fn test_sheet_region_payloads() {
        let mut graph = StateGraph::new();
        let cycle = graph
            .build_sheet_cycle("strife", SheetRegion::new(10, 3, 1, 64), Closure::Clamp)
            .expect("one frame");

        assert_eq!(*graph.frame(cycle.start), FrameRect::new(192, 640, 64, 64));
        assert_eq!(graph.next(cycle.start), Some(cycle.start));
        assert_eq!(graph.name(cycle.start), Some("strife/frame0"));
    }

    #[test]
    fn test_empty_cycle_rejected() {
        let mut graph = StateGraph::new();
        let err = graph
            .build_sheet_cycle("nothing", SheetRegion::new(0, 0, 0, 64), Closure::Loop)
            .expect_err("empty region");
        assert_eq!(
            err,
            AnimationError::EmptyCycle {
                name: "nothing".into()
            }
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_missing_label_is_absorbing() {
        let mut graph: StateGraph<u8> = StateGraph::new();
        let a = graph.add_state("a", 0);
        assert_eq!(graph.transition(a, "left"), None);
        assert_eq!(graph.next(a), None);
        assert_eq!(graph.transition(StateId::from_index(99), "next"), None);
    }

    #[test]
    fn test_unknown_state_rejected() {
        let mut graph: StateGraph<u8> = StateGraph::new();
        let a = graph.add_state("a", 0);
        let err = graph
            .add_transition(a, "x", StateId::from_index(5))
            .expect_err("foreign id");
        assert_eq!(err, AnimationError::UnknownState { index: 5, len: 1 });
    }

    #[test]
    fn test_cycle_states_terminates_for_both_closures() {
        let mut graph = StateGraph::new();
        let looped = walk(&mut graph, "loop", 0, Closure::Loop);
        let clamped = walk(&mut graph, "clamp", 1, Closure::Clamp);

        assert_eq!(graph.cycle_states(looped.start).len(), 9);
        assert_eq!(graph.cycle_states(clamped.start).len(), 9);
    }

    #[test]
    fn test_connect_all_links_every_frame() {
        let mut graph = StateGraph::new();
        let right = walk(&mut graph, "walk_right", 11, Closure::Loop);
        let left = walk(&mut graph, "walk_left", 9, Closure::Loop);
        graph
            .connect_all(right.start, left.start, labels::LEFT)
            .expect("connect");

        for id in graph.cycle_states(right.start) {
            assert_eq!(graph.transition(id, labels::LEFT), Some(left.start));
        }
        // the target cycle is untouched
        for id in graph.cycle_states(left.start) {
            assert_eq!(graph.transition(id, labels::LEFT), None);
        }
    }

    #[test]
    fn test_connect_all_on_clamped_source() {
        let mut graph = StateGraph::new();
        let block = walk(&mut graph, "block", 4, Closure::Clamp);
        let walk_down = walk(&mut graph, "walk_down", 10, Closure::Loop);
        graph
            .connect_all(block.start, walk_down.start, labels::DOWN)
            .expect("connect");

        let states = graph.cycle_states(block.start);
        assert_eq!(states.len(), 9);
        assert!(states
            .iter()
            .all(|&id| graph.transition(id, labels::DOWN) == Some(walk_down.start)));
    }

    #[test]
    fn test_cross_connected_walk_lands_on_first_frame() {
        let mut graph = StateGraph::new();
        let right = walk(&mut graph, "walk_right", 11, Closure::Loop);
        let left = walk(&mut graph, "walk_left", 9, Closure::Loop);
        graph
            .connect_all(right.start, left.start, labels::LEFT)
            .expect("connect");
        graph
            .connect_all(left.start, right.start, labels::RIGHT)
            .expect("connect");

        let fifth = step(&graph, right.start, 5);
        let landed = graph.transition(fifth, labels::LEFT).expect("linked");
        assert_eq!(landed, left.start);
        assert_eq!(graph.frame(landed).column(), 0);
        assert_eq!(graph.frame(landed).row(), 9);
    }

    #[test]
    fn test_reachability() {
        let mut graph = StateGraph::new();
        let right = walk(&mut graph, "walk_right", 11, Closure::Loop);
        let left = walk(&mut graph, "walk_left", 9, Closure::Loop);

        let left_states = graph.cycle_states(left.start);
        assert!(graph.verify_reachable(right.start, &left_states).is_err());

        graph
            .connect_all(right.start, left.start, labels::LEFT)
            .expect("connect");
        assert!(graph.verify_reachable(right.start, &left_states).is_ok());
        assert_eq!(graph.reachable_from(right.start).len(), 18);
    }

    #[test]
    fn test_debug_lists_state_names() {
        let mut graph: StateGraph<u8> = StateGraph::new();
        let cycle = graph.build_cycle("tiny", [1, 2], Closure::Loop).expect("two");
        let dump = format!("{graph:?}");
        assert!(dump.contains("tiny/frame1"));
        assert_eq!(graph.labels(cycle.start).count(), 2);
    }
}
