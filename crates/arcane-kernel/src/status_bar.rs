//! Heart / mana / stamina pips stored as clamped frame cycles.
//!
//! Each kind has one clamped cycle (full frame first, empty frame last) and
//! every pip is a cursor into it. Spending walks pips front to back along
//! `next`; restoring walks them back to front along `prev`.

use arcane_common::{AnimationError, FrameRect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state_graph::{Closure, SheetRegion, StateGraph, StateId};

/// Which bar a pip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Hit points
    Health,
    /// Spell resource; gates weapon fire
    Mana,
    /// Dash resource
    Stamina,
}

impl StatusKind {
    const fn index(self) -> usize {
        match self {
            Self::Health => 0,
            Self::Mana => 1,
            Self::Stamina => 2,
        }
    }
}

/// Sheet layout and pip counts for a [`StatusBar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    /// Square pip frame size
    pub frame_size: u32,
    /// Frames from full to empty
    pub frames_per_pip: u32,
    /// Number of health pips
    pub health: u32,
    /// Number of mana pips
    pub mana: u32,
    /// Number of stamina pips
    pub stamina: u32,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            frame_size: 32,
            frames_per_pip: 5,
            health: 5,
            mana: 2,
            stamina: 0,
        }
    }
}

/// Set of status bars for one character.
#[derive(Debug, Clone)]
pub struct StatusBar {
    graph: StateGraph<FrameRect>,
    starts: [StateId; 3],
    pips: [Vec<StateId>; 3],
}

impl StatusBar {
    /// Builds the bars with every pip full.
    pub fn new(config: &StatusBarConfig) -> Result<Self, AnimationError> {
        let mut graph = StateGraph::new();
        let region = SheetRegion::new(0, 0, config.frames_per_pip, config.frame_size);

        let health = graph.build_sheet_cycle("health", region, Closure::Clamp)?;
        let mana = graph.build_sheet_cycle("mana", region, Closure::Clamp)?;
        let stamina = graph.build_sheet_cycle("stamina", region, Closure::Clamp)?;

        debug!(
            "Status bar: {} health, {} mana, {} stamina pips",
            config.health, config.mana, config.stamina
        );
        Ok(Self {
            graph,
            starts: [health.start, mana.start, stamina.start],
            pips: [
                vec![health.start; config.health as usize],
                vec![mana.start; config.mana as usize],
                vec![stamina.start; config.stamina as usize],
            ],
        })
    }

    /// Whether any pip of `kind` can still be spent.
    #[must_use]
    pub fn has_any(&self, kind: StatusKind) -> bool {
        self.pips[kind.index()]
            .iter()
            .any(|&pip| self.graph.next(pip).is_some_and(|n| n != pip))
    }

    /// Spends up to `amount` steps, draining the first non-empty pip first.
    /// Returns the number of steps actually spent.
    pub fn decrement(&mut self, amount: u32, kind: StatusKind) -> u32 {
        let graph = &self.graph;
        let mut spent = 0;
        for pip in &mut self.pips[kind.index()] {
            while spent < amount {
                match graph.next(*pip) {
                    Some(next) if next != *pip => {
                        *pip = next;
                        spent += 1;
                    },
                    _ => break,
                }
            }
        }
        spent
    }

    /// Restores up to `amount` steps, refilling the last non-full pip first.
    /// Returns the number of steps actually restored.
    pub fn increment(&mut self, amount: u32, kind: StatusKind) -> u32 {
        let graph = &self.graph;
        let mut restored = 0;
        for pip in self.pips[kind.index()].iter_mut().rev() {
            while restored < amount {
                match graph.prev(*pip) {
                    Some(prev) if prev != *pip => {
                        *pip = prev;
                        restored += 1;
                    },
                    _ => break,
                }
            }
        }
        restored
    }

    /// Steps remaining before every pip of `kind` is empty.
    #[must_use]
    pub fn remaining(&self, kind: StatusKind) -> usize {
        let cycle = self.graph.cycle_states(self.starts[kind.index()]);
        let last = cycle.len().saturating_sub(1);
        self.pips[kind.index()]
            .iter()
            .map(|pip| {
                cycle
                    .iter()
                    .position(|s| s == pip)
                    .map_or(0, |pos| last - pos)
            })
            .sum()
    }

    /// Frame to draw for each pip of `kind`, in order.
    #[must_use]
    pub fn frames(&self, kind: StatusKind) -> Vec<FrameRect> {
        self.pips[kind.index()]
            .iter()
            .map(|&pip| *self.graph.frame(pip))
            .collect()
    }

    /// Number of pips of `kind`.
    #[must_use]
    pub fn pip_count(&self, kind: StatusKind) -> usize {
        self.pips[kind.index()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> StatusBar {
        StatusBar::new(&StatusBarConfig::default()).expect("default config")
    }

    #[test]
    fn test_full_bar() {
        let bar = bar();
        assert!(bar.has_any(StatusKind::Mana));
        assert_eq!(bar.remaining(StatusKind::Mana), 8);
        assert_eq!(bar.remaining(StatusKind::Health), 20);
        assert!(!bar.has_any(StatusKind::Stamina));
    }

    #[test]
    fn test_decrement_drains_front_pip_first() {
        let mut bar = bar();
        assert_eq!(bar.decrement(3, StatusKind::Mana), 3);

        let frames = bar.frames(StatusKind::Mana);
        assert_eq!(frames[0].column(), 3);
        assert_eq!(frames[1].column(), 0);
        assert_eq!(bar.remaining(StatusKind::Mana), 5);
    }

    #[test]
    fn test_decrement_saturates() {
        let mut bar = bar();
        assert_eq!(bar.decrement(900, StatusKind::Health), 20);
        assert!(!bar.has_any(StatusKind::Health));
        assert_eq!(bar.decrement(1, StatusKind::Health), 0);
    }

    #[test]
    fn test_increment_refills_back_pip_first() {
        let mut bar = bar();
        bar.decrement(900, StatusKind::Health);
        assert_eq!(bar.increment(10, StatusKind::Health), 10);

        let frames = bar.frames(StatusKind::Health);
        assert!(frames[3..].iter().all(|f| f.column() == 0));
        assert_eq!(frames[2].column(), 2);
        assert!(frames[..2].iter().all(|f| f.column() == 4));
        assert_eq!(bar.remaining(StatusKind::Health), 10);
    }

    #[test]
    fn test_increment_saturates_when_full() {
        let mut bar = bar();
        assert_eq!(bar.increment(5, StatusKind::Mana), 0);
        assert_eq!(bar.pip_count(StatusKind::Mana), 2);
    }
}
