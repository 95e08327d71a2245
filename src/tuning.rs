//! Data-driven game balance
//!
//! Defaults reproduce the classic feel: 10 health, 10 equations per level,
//! three targets on screen, fall speed 0.5 → 0.4 → 0.3. A `tuning.json`
//! next to the page may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ms_to_ticks;

/// Audio volumes (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTuning {
    /// Laser sound volume
    pub effect_volume: f32,
    /// Background music volume
    pub music_volume: f32,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            effect_volume: 0.7,
            music_volume: 0.5,
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Starting (and maximum) health
    pub max_health: u8,
    /// Equations to resolve (hit or miss) before a level completes
    pub quota: u32,
    /// Maximum targets alive at once
    pub max_alive: usize,

    /// Level 1 fall speed
    pub base_speed: f32,
    /// Speed reduction per level (harder equations get more time)
    pub speed_step: f32,
    /// Speed floor
    pub min_speed: f32,
    /// World units fallen per tick per unit of speed
    pub fall_scale: f32,

    /// Spawn height (top of the playfield)
    pub spawn_y: f32,
    /// A target below this height is missed
    pub miss_y: f32,
    /// Spawn x is uniform in [-spawn_half_width, spawn_half_width)
    pub spawn_half_width: f32,

    /// Absolute tolerance when comparing an answer
    pub answer_tolerance: f64,

    /// Delay before a replacement spawn after a hit or miss
    pub spawn_delay_ticks: u64,
    /// Period of the background spawn timer
    pub spawn_interval_ticks: u64,
    /// Pause between levels
    pub level_transition_ticks: u64,
    /// Spawns scheduled when a level starts
    pub initial_spawns: u32,
    /// Gap between the initial spawns
    pub initial_spawn_stagger_ticks: u64,

    pub audio: AudioTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_health: 10,
            quota: 10,
            max_alive: 3,

            base_speed: 0.5,
            speed_step: 0.1,
            min_speed: 0.2,
            fall_scale: 0.01,

            spawn_y: 4.0,
            miss_y: -3.8,
            spawn_half_width: 4.0,

            answer_tolerance: 0.01,

            spawn_delay_ticks: ms_to_ticks(500),
            spawn_interval_ticks: ms_to_ticks(2000),
            level_transition_ticks: ms_to_ticks(1000),
            initial_spawns: 3,
            initial_spawn_stagger_ticks: ms_to_ticks(500),

            audio: AudioTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse an override, falling back to defaults on any problem
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file: {e}");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::InvalidTuning(msg.to_string()));

        if self.max_health == 0 {
            return fail("max_health must be at least 1");
        }
        if self.quota == 0 {
            return fail("quota must be at least 1");
        }
        if self.max_alive == 0 {
            return fail("max_alive must be at least 1");
        }
        if !(self.min_speed > 0.0) || self.base_speed < self.min_speed {
            return fail("speeds must satisfy 0 < min_speed <= base_speed");
        }
        if self.speed_step < 0.0 || !(self.fall_scale > 0.0) {
            return fail("speed_step must be >= 0 and fall_scale > 0");
        }
        if !(self.spawn_y > self.miss_y) {
            return fail("spawn_y must be above miss_y");
        }
        if !(self.spawn_half_width > 0.0) {
            return fail("spawn_half_width must be positive");
        }
        if !(self.answer_tolerance > 0.0) {
            return fail("answer_tolerance must be positive");
        }
        if self.spawn_interval_ticks == 0 {
            return fail("spawn_interval_ticks must be at least 1");
        }
        for vol in [self.audio.effect_volume, self.audio.music_volume] {
            if !(0.0..=1.0).contains(&vol) {
                return fail("volumes must be within 0.0..=1.0");
            }
        }
        Ok(())
    }

    /// Fall speed for a level (1-based), floored at `min_speed`
    pub fn speed_for_level(&self, level: u8) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.base_speed - steps * self.speed_step).max(self.min_speed)
    }
}
