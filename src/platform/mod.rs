//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks (fixed-timestep accumulator fed by frame callbacks)
//! - Static data loading (`fetch` on web)

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Converts variable frame deltas into whole simulation ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a `requestAnimationFrame` timestamp; returns ticks to run
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time_ms = Some(time_ms);
        self.advance(dt)
    }

    /// Add elapsed seconds; returns ticks to run (at most `MAX_SUBSTEPS`)
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        // Drop backlog we refused to simulate
        if ticks == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        ticks
    }

    /// Forget accumulated time (on restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }
}
