//! Visual effects (not gameplay-affecting)
//!
//! Laser beams and hit bursts are spawned from [`GameEvent`]s after each
//! update and aged once per simulation tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::SHOOTER_Y;
use crate::ms_to_ticks;
use crate::sim::GameEvent;

/// Particles per destroyed target
pub const BURST_PARTICLES: usize = 20;
/// Maximum particles
pub const MAX_PARTICLES: usize = 256;
/// Life lost per tick (fully faded after 50 ticks)
const PARTICLE_FADE: f32 = 0.02;
/// How long a laser beam stays on screen
pub const LASER_TICKS: u32 = ms_to_ticks(100) as u32;

/// A burst particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// World units per tick
    pub vel: Vec2,
    /// Hue in [0, 1)
    pub hue: f32,
    /// 1 → 0, also used as opacity
    pub life: f32,
}

/// A beam from the shooter to a hit target
#[derive(Debug, Clone)]
pub struct Laser {
    pub from: Vec2,
    pub to: Vec2,
    pub ticks_left: u32,
}

/// All live effects
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub lasers: Vec<Laser>,
    rng: Pcg32,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Effects {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            lasers: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// React to simulation events
    pub fn apply(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::TargetHit { pos, .. } => {
                    self.lasers.push(Laser {
                        from: Vec2::new(0.0, SHOOTER_Y),
                        to: pos,
                        ticks_left: LASER_TICKS,
                    });
                    self.burst(pos);
                }
                GameEvent::RunStarted => self.clear(),
                _ => {}
            }
        }
    }

    /// Spawn an explosion of particles at `pos`
    pub fn burst(&mut self, pos: Vec2) {
        for _ in 0..BURST_PARTICLES {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let vel = Vec2::new(
                self.rng.random_range(-0.1..0.1),
                self.rng.random_range(-0.1..0.1),
            );
            self.particles.push(Particle {
                pos,
                vel,
                hue: self.rng.random::<f32>(),
                life: 1.0,
            });
        }
    }

    /// Age everything by one tick
    pub fn tick(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.life -= PARTICLE_FADE;
        }
        self.particles.retain(|p| p.life > 0.0);

        for laser in &mut self.lasers {
            laser.ticks_left = laser.ticks_left.saturating_sub(1);
        }
        self.lasers.retain(|l| l.ticks_left > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.lasers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty() && self.lasers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TargetId;

    fn hit_at(x: f32, y: f32) -> GameEvent {
        GameEvent::TargetHit {
            id: TargetId(1),
            points: 1,
            pos: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_hit_spawns_laser_and_burst() {
        let mut fx = Effects::new(1);
        fx.apply(&[hit_at(1.0, 2.0)]);
        assert_eq!(fx.lasers.len(), 1);
        assert_eq!(fx.lasers[0].to, Vec2::new(1.0, 2.0));
        assert_eq!(fx.particles.len(), BURST_PARTICLES);
    }

    #[test]
    fn test_misses_have_no_effect() {
        let mut fx = Effects::new(1);
        fx.apply(&[GameEvent::TargetMissed {
            id: TargetId(1),
            pos: Vec2::ZERO,
        }]);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_effects_expire() {
        let mut fx = Effects::new(1);
        fx.apply(&[hit_at(0.0, 0.0)]);
        for _ in 0..LASER_TICKS {
            fx.tick();
        }
        assert!(fx.lasers.is_empty());
        assert!(!fx.particles.is_empty());
        for _ in 0..60 {
            fx.tick();
        }
        assert!(fx.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let mut fx = Effects::new(1);
        for _ in 0..50 {
            fx.burst(Vec2::ZERO);
        }
        assert_eq!(fx.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_new_run_clears() {
        let mut fx = Effects::new(1);
        fx.apply(&[hit_at(0.0, 0.0), GameEvent::RunStarted]);
        assert!(fx.is_empty());
    }
}
