//! Math Defender - an arcade game that teaches arithmetic
//!
//! Core modules:
//! - `sim`: Deterministic simulation (equations, targets, levels, timers)
//! - `tuning`: Data-driven game balance
//! - `platform`: Frame clock and browser data loading
//! - `fx`: Visual-only effects (lasers, particles)
//! - `ui`: Screens, HUD text and answer input rules
//! - `audio`: Sound effects and music
//! - `renderer`: Viewport mapping and canvas drawing

pub mod audio;
pub mod error;
pub mod fx;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{Error, Result};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (one tick per 60 Hz animation frame)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted (tab switches, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Number of difficulty levels
    pub const LEVEL_COUNT: u8 = 3;

    /// Visible playfield (world units). Targets spawn slightly above the top.
    pub const VIEW_HALF_WIDTH: f32 = 6.0;
    pub const VIEW_HALF_HEIGHT: f32 = 4.2;

    /// Where the shooter sits and lasers start
    pub const SHOOTER_Y: f32 = -3.5;
}

/// Convert a millisecond delay to whole simulation ticks (rounded)
#[inline]
pub const fn ms_to_ticks(ms: u64) -> u64 {
    (ms * consts::SIM_HZ as u64 + 500) / 1000
}
