//! Run state and core simulation types
//!
//! Everything a run needs lives in [`RunState`]; the update functions in
//! `tick` take it by `&mut` so the whole game is testable without a page.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::equations::EquationBank;
use super::scheduler::Scheduler;
use crate::consts::LEVEL_COUNT;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Start screen, nothing scheduled
    NotStarted,
    /// Levels 1..=LEVEL_COUNT being played (including the pause between levels)
    InProgress,
    /// Run over, summary available
    Complete(RunOutcome),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// Final level's quota met
    Cleared,
    /// Health reached zero
    OutOfHealth,
}

/// Stable identifier of a target within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Why a target left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DestroyCause {
    /// Player typed its answer
    Hit,
    /// Fell past the bottom
    Missed,
    /// Removed by a level transition
    Cleared,
}

/// Liveness of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetState {
    Alive,
    Destroyed(DestroyCause),
}

/// A falling equation
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub expression: String,
    pub answer: f64,
    pub pos: Vec2,
    /// Fall speed captured at spawn time
    pub speed: f32,
    pub state: TargetState,
}

impl Target {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == TargetState::Alive
    }
}

/// Per-level tallies for the end screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    pub hits: u32,
    pub misses: u32,
    pub points: u32,
}

/// Aggregated stats shown when a run ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub outcome: Option<RunOutcome>,
    pub levels: [LevelStats; LEVEL_COUNT as usize],
    pub total_points: u32,
}

/// Scheduled gameplay actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Try to spawn one target
    Spawn,
    /// Begin the current level's spawn schedule
    StartLevel,
}

/// Things that happened during an update, drained by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    RunStarted,
    LevelStarted { level: u8 },
    TargetSpawned { id: TargetId },
    TargetHit { id: TargetId, points: u32, pos: Vec2 },
    TargetMissed { id: TargetId, pos: Vec2 },
    TargetCleared { id: TargetId },
    LevelCompleted { level: u8 },
    RunEnded { outcome: RunOutcome },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    /// Seed the RNG was created from (reused by `reset`)
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub bank: EquationBank,

    pub phase: GamePhase,
    /// Current level, 1-based
    pub level: u8,
    pub score: u32,
    pub health: u8,
    /// Hits plus misses on the current level
    pub completed_this_level: u32,
    /// Fall speed given to new targets
    pub speed: f32,
    /// Expressions already shown, per level
    pub used: [HashSet<String>; LEVEL_COUNT as usize],
    pub stats: [LevelStats; LEVEL_COUNT as usize],

    /// Targets keyed by id (iteration is spawn order)
    pub targets: BTreeMap<TargetId, Target>,
    pub scheduler: Scheduler<TimerEvent>,
    pub events: Vec<GameEvent>,
    /// Simulation ticks since the state was created or reset
    pub time_ticks: u64,

    next_id: u32,
}

impl RunState {
    /// Create a fresh state with default tuning
    pub fn new(seed: u64, bank: EquationBank) -> Self {
        Self::with_tuning(seed, bank, Tuning::default())
    }

    pub fn with_tuning(seed: u64, bank: EquationBank, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            level: 1,
            score: 0,
            health: tuning.max_health,
            completed_this_level: 0,
            speed: tuning.speed_for_level(1),
            used: Default::default(),
            stats: Default::default(),
            targets: BTreeMap::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            time_ticks: 0,
            next_id: 1,
            tuning,
            bank,
        }
    }

    /// Return to initial defaults, keeping seed, tuning and equations.
    /// Cancels every pending timer.
    pub fn reset(&mut self) {
        let bank = std::mem::take(&mut self.bank);
        let tuning = self.tuning.clone();
        *self = Self::with_tuning(self.seed, bank, tuning);
    }

    /// Reseed (e.g. for "play again") then reset
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.reset();
    }

    pub fn max_health(&self) -> u8 {
        self.tuning.max_health
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::InProgress
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, GamePhase::Complete(_))
    }

    /// Allocate a new target ID
    pub fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn alive_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values().filter(|t| t.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_targets().count()
    }

    /// Index into the per-level arrays for the current level
    #[inline]
    pub(crate) fn level_index(&self) -> usize {
        (self.level.clamp(1, LEVEL_COUNT) - 1) as usize
    }

    pub fn level_stats(&self, level: u8) -> Option<&LevelStats> {
        level.checked_sub(1).and_then(|i| self.stats.get(i as usize))
    }

    pub fn used_for_level(&self, level: u8) -> Option<&HashSet<String>> {
        level.checked_sub(1).and_then(|i| self.used.get(i as usize))
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop destroyed targets from the collection
    pub fn prune_destroyed(&mut self) {
        self.targets.retain(|_, t| t.is_alive());
    }

    pub fn summary(&self) -> RunSummary {
        let outcome = match self.phase {
            GamePhase::Complete(outcome) => Some(outcome),
            _ => None,
        };
        RunSummary {
            outcome,
            levels: self.stats,
            total_points: self.stats.iter().map(|s| s.points).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = RunState::new(1, EquationBank::fallback());
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, 10);
        assert!((state.speed - 0.5).abs() < 1e-6);
        assert!(state.used.iter().all(|u| u.is_empty()));
        assert!(state.targets.is_empty());
        assert!(state.scheduler.is_idle());
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut state = RunState::new(1, EquationBank::fallback());
        assert_eq!(state.next_target_id(), TargetId(1));
        assert_eq!(state.next_target_id(), TargetId(2));
    }

    #[test]
    fn test_level_lookup_bounds() {
        let state = RunState::new(1, EquationBank::fallback());
        assert!(state.level_stats(0).is_none());
        assert!(state.level_stats(1).is_some());
        assert!(state.level_stats(LEVEL_COUNT + 1).is_none());
    }

    #[test]
    fn test_summary_totals() {
        let mut state = RunState::new(1, EquationBank::fallback());
        state.stats[0].points = 4;
        state.stats[2].points = 9;
        state.phase = GamePhase::Complete(RunOutcome::Cleared);
        let summary = state.summary();
        assert_eq!(summary.total_points, 13);
        assert_eq!(summary.outcome, Some(RunOutcome::Cleared));
    }
}
