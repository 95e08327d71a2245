//! UI model: which screen is visible, HUD text, end-of-run stats
//!
//! The DOM code in `main.rs` only copies these strings into elements.

use crate::sim::{GamePhase, RunState, RunSummary};

/// Top-level screens (each a DOM section toggled with `hidden`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Play,
    End,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Start, Screen::Play, Screen::End];

    /// Element id of the screen's container
    pub fn element_id(&self) -> &'static str {
        match self {
            Screen::Start => "startScreen",
            Screen::Play => "gameScreen",
            Screen::End => "endScreen",
        }
    }

    /// Screen to show for a phase
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::NotStarted => Screen::Start,
            GamePhase::InProgress => Screen::Play,
            GamePhase::Complete(_) => Screen::End,
        }
    }
}

/// Text for the in-game HUD
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: String,
    pub level: String,
    pub health: String,
    /// Health bar width, 0-100
    pub health_percent: f32,
}

impl Hud {
    pub fn from_state(state: &RunState) -> Self {
        let max = state.max_health();
        Self {
            score: format!("Score: {}", state.score),
            level: format!("Level: {}", state.level),
            health: format!("Health: {}/{}", state.health, max),
            health_percent: state.health as f32 / max.max(1) as f32 * 100.0,
        }
    }
}

/// Heading tag used for every end-screen block
pub const STATS_HEADING_TAG: &str = "h2";

/// One `div` of the end screen: a heading and its paragraphs
#[derive(Debug, Clone, PartialEq)]
pub struct StatsBlock {
    /// CSS class of the block
    pub class: &'static str,
    pub title: String,
    pub lines: Vec<String>,
}

/// Per-level stats blocks followed by the total block
pub fn summary_report(summary: &RunSummary) -> Vec<StatsBlock> {
    let mut blocks: Vec<StatsBlock> = summary
        .levels
        .iter()
        .enumerate()
        .map(|(i, stats)| StatsBlock {
            class: "level-stats",
            title: format!("Level {}", i + 1),
            lines: vec![
                format!("Hit: {}", stats.hits),
                format!("Miss: {}", stats.misses),
                format!("Points earned: {}", stats.points),
            ],
        })
        .collect();
    blocks.push(StatsBlock {
        class: "total-stats",
        title: format!("Total Points: {}", summary.total_points),
        lines: Vec::new(),
    });
    blocks
}

/// Filter an answer-field submission: only while a run is active, trimmed,
/// and never empty
pub fn accept_submission(raw: &str, run_active: bool) -> Option<&str> {
    if !run_active {
        return None;
    }
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
