//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (delays are scheduler ticks, never wall-clock timers)
//! - Seeded RNG only
//! - Stable iteration order (targets keyed by ID)
//! - No rendering or platform dependencies

pub mod equations;
pub mod matcher;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use equations::{Equation, EquationBank};
pub use matcher::{find_match, parse_answer};
pub use scheduler::Scheduler;
pub use state::{
    DestroyCause, GameEvent, GamePhase, LevelStats, RunOutcome, RunState, RunSummary, Target,
    TargetId, TargetState, TimerEvent,
};
pub use tick::{Hit, TickInput, complete_level, end_run, spawn_target, start_run, submit_answer, tick};
