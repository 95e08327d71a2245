//! Fixed timestep simulation tick
//!
//! Spawning, falling, hit/miss resolution and the level/run state machine.

use glam::Vec2;
use rand::Rng;

use super::matcher::{find_match, parse_answer};
use super::state::{
    DestroyCause, GameEvent, GamePhase, RunOutcome, RunState, Target, TargetId, TargetState,
    TimerEvent,
};
use crate::consts::LEVEL_COUNT;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Answers submitted since the last tick, oldest first
    pub answers: Vec<String>,
}

/// Result of a successful submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: TargetId,
    pub points: u32,
    pub pos: Vec2,
}

/// Reset the state and begin level 1
pub fn start_run(state: &mut RunState) {
    state.reset();
    state.phase = GamePhase::InProgress;
    state.events.push(GameEvent::RunStarted);
    log::info!("Run started (seed {})", state.seed);
    start_level(state);
}

/// Advance the run by one fixed tick
pub fn tick(state: &mut RunState, input: &TickInput) {
    state.prune_destroyed();
    state.time_ticks += 1;

    for answer in &input.answers {
        submit_answer(state, answer);
    }

    state.scheduler.advance(1);
    while let Some(event) = state.scheduler.pop_due() {
        if !state.is_active() {
            break;
        }
        match event {
            TimerEvent::Spawn => {
                spawn_target(state);
            }
            TimerEvent::StartLevel => start_level(state),
        }
    }

    if state.is_active() {
        update_targets(state);
    }
}

/// Try to destroy the target whose answer matches `raw`.
///
/// Non-numeric input, an inactive run or no matching target are all
/// silent no-ops.
pub fn submit_answer(state: &mut RunState, raw: &str) -> Option<Hit> {
    if !state.is_active() {
        return None;
    }
    let value = parse_answer(raw)?;
    let id = find_match(
        state.targets.values(),
        value,
        state.tuning.answer_tolerance,
        state.tuning.spawn_y,
    )?;

    let points = state.level as u32;
    let target = state.targets.get_mut(&id)?;
    target.state = TargetState::Destroyed(DestroyCause::Hit);
    let pos = target.pos;

    state.score += points;
    let idx = state.level_index();
    state.stats[idx].hits += 1;
    state.stats[idx].points += points;
    state.events.push(GameEvent::TargetHit { id, points, pos });
    log::debug!("Hit {} for {} points (input {:?})", id, points, raw.trim());

    resolve_equation(state);
    Some(Hit { id, points, pos })
}

/// Spawn one target if the run is active, the level quota is open and
/// fewer than `max_alive` targets are alive
pub fn spawn_target(state: &mut RunState) -> Option<TargetId> {
    if !state.is_active() || state.completed_this_level >= state.tuning.quota {
        return None;
    }
    if state.alive_count() >= state.tuning.max_alive {
        return None;
    }

    let idx = state.level_index();
    let equation = match state.bank.select(state.level, &mut state.used[idx], &mut state.rng) {
        Some(eq) => eq.clone(),
        None => {
            log::warn!("No equations for level {}", state.level);
            return None;
        }
    };

    let half_width = state.tuning.spawn_half_width;
    let x = state.rng.random_range(-half_width..half_width);
    let id = state.next_target_id();
    state.targets.insert(
        id,
        Target {
            id,
            expression: equation.expression,
            answer: equation.answer,
            pos: Vec2::new(x, state.tuning.spawn_y),
            speed: state.speed,
            state: TargetState::Alive,
        },
    );
    state.events.push(GameEvent::TargetSpawned { id });
    log::debug!("Spawned {} at x={:.2}", id, x);
    Some(id)
}

/// Move alive targets down and resolve misses
fn update_targets(state: &mut RunState) {
    let fall_scale = state.tuning.fall_scale;
    let miss_y = state.tuning.miss_y;

    let ids: Vec<TargetId> = state.alive_targets().map(|t| t.id).collect();
    for id in ids {
        // A miss may have ended the level or run
        if !state.is_active() {
            return;
        }
        let Some(target) = state.targets.get_mut(&id) else {
            continue;
        };
        if !target.is_alive() {
            continue;
        }

        target.pos.y -= target.speed * fall_scale;
        if target.pos.y >= miss_y {
            continue;
        }

        target.state = TargetState::Destroyed(DestroyCause::Missed);
        let pos = target.pos;
        state.health = state.health.saturating_sub(1);
        let idx = state.level_index();
        state.stats[idx].misses += 1;
        state.events.push(GameEvent::TargetMissed { id, pos });
        log::debug!("Missed {}, health {}", id, state.health);

        if state.health == 0 {
            end_run(state, RunOutcome::OutOfHealth);
            return;
        }
        resolve_equation(state);
    }
}

/// Count a hit or miss toward the quota and react to it
fn resolve_equation(state: &mut RunState) {
    state.completed_this_level += 1;
    if state.completed_this_level < state.tuning.quota {
        let delay = state.tuning.spawn_delay_ticks;
        state.scheduler.after(delay, TimerEvent::Spawn);
    } else {
        complete_level(state);
    }
}

/// Finish the current level: advance and pause, or end the run
pub fn complete_level(state: &mut RunState) {
    if !state.is_active() {
        return;
    }
    state.events.push(GameEvent::LevelCompleted { level: state.level });

    if state.level >= LEVEL_COUNT {
        end_run(state, RunOutcome::Cleared);
        return;
    }

    state.level += 1;
    state.completed_this_level = 0;
    let idx = state.level_index();
    state.used[idx].clear();
    state.speed = state.tuning.speed_for_level(state.level);

    for target in state.targets.values_mut().filter(|t| t.is_alive()) {
        target.state = TargetState::Destroyed(DestroyCause::Cleared);
        state.events.push(GameEvent::TargetCleared { id: target.id });
    }

    state.scheduler.cancel_all();
    let pause = state.tuning.level_transition_ticks;
    state.scheduler.after(pause, TimerEvent::StartLevel);
    log::info!("Level {} reached, speed {:.1}", state.level, state.speed);
}

/// Schedule the opening spawns and the background spawn timer
fn start_level(state: &mut RunState) {
    state.scheduler.cancel_all();
    let stagger = state.tuning.initial_spawn_stagger_ticks;
    for i in 0..state.tuning.initial_spawns {
        state.scheduler.after(i as u64 * stagger, TimerEvent::Spawn);
    }
    state
        .scheduler
        .every(state.tuning.spawn_interval_ticks, TimerEvent::Spawn);
    state.events.push(GameEvent::LevelStarted { level: state.level });
}

/// Stop the run and cancel all pending work
pub fn end_run(state: &mut RunState, outcome: RunOutcome) {
    if state.is_complete() {
        return;
    }
    state.phase = GamePhase::Complete(outcome);
    state.scheduler.cancel_all();
    state.events.push(GameEvent::RunEnded { outcome });
    let summary = state.summary();
    log::info!(
        "Run ended ({:?}): score {}, total points {}",
        outcome,
        state.score,
        summary.total_points
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::equations::{Equation, EquationBank};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn run_ticks(state: &mut RunState, n: u64) {
        for _ in 0..n {
            tick(state, &idle());
        }
    }

    /// Bank where every level has plenty of distinct equations
    fn big_bank() -> EquationBank {
        let mut equations = Vec::new();
        for level in 1..=LEVEL_COUNT {
            for i in 0..20 {
                equations.push(Equation::new(level, &format!("{i}+{level}"), (i + level as u32) as f64));
            }
        }
        EquationBank::new(equations)
    }

    fn started(seed: u64) -> RunState {
        let mut state = RunState::new(seed, big_bank());
        start_run(&mut state);
        state
    }

    fn answer_of_any_alive(state: &RunState) -> Option<String> {
        state.alive_targets().next().map(|t| t.answer.to_string())
    }

    fn hit_one(state: &mut RunState) -> bool {
        // Let the opening spawns land if nothing is on screen yet
        for _ in 0..200 {
            if let Some(answer) = answer_of_any_alive(state) {
                return submit_answer(state, &answer).is_some();
            }
            tick(state, &idle());
        }
        false
    }

    #[test]
    fn test_start_run_spawns_opening_targets() {
        let mut state = started(1);
        assert_eq!(state.phase, GamePhase::InProgress);
        run_ticks(&mut state, 1);
        assert_eq!(state.alive_count(), 1);
        run_ticks(&mut state, 30);
        assert_eq!(state.alive_count(), 2);
        run_ticks(&mut state, 30);
        assert_eq!(state.alive_count(), 3);
    }

    #[test]
    fn test_never_more_than_three_alive() {
        let mut state = started(2);
        for _ in 0..600 {
            tick(&mut state, &idle());
            spawn_target(&mut state);
            assert!(state.alive_count() <= 3);
        }
    }

    #[test]
    fn test_targets_fall_at_level_speed() {
        let mut state = started(3);
        run_ticks(&mut state, 1);
        let t = state.alive_targets().next().unwrap().clone();
        assert!((t.pos.y - (4.0 - 0.5 * 0.01)).abs() < 1e-5);
        run_ticks(&mut state, 10);
        let y = state.targets[&t.id].pos.y;
        assert!((y - (4.0 - 11.0 * 0.5 * 0.01)).abs() < 1e-4);
    }

    #[test]
    fn test_miss_costs_health() {
        let mut state = started(4);
        // 7.8 units at 0.005/tick = 1560 ticks to fall off screen
        run_ticks(&mut state, 1565);
        assert!(state.health < 10);
        assert_eq!(state.stats[0].misses as u8, 10 - state.health);
        assert_eq!(state.completed_this_level, state.stats[0].misses);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_hit_scores_level_points() {
        let mut state = started(5);
        assert!(hit_one(&mut state));
        assert_eq!(state.score, 1);
        assert_eq!(state.stats[0].hits, 1);
        assert_eq!(state.stats[0].points, 1);
        assert_eq!(state.completed_this_level, 1);
        assert_eq!(state.health, 10);
    }

    #[test]
    fn test_wrong_or_garbage_input_is_ignored() {
        let mut state = started(6);
        run_ticks(&mut state, 61);
        let before = (state.score, state.health, state.alive_count());
        assert!(submit_answer(&mut state, "banana").is_none());
        assert!(submit_answer(&mut state, "-99999").is_none());
        assert_eq!(before, (state.score, state.health, state.alive_count()));
    }

    #[test]
    fn test_input_ignored_when_not_running() {
        let mut state = RunState::new(7, EquationBank::fallback());
        assert!(submit_answer(&mut state, "5").is_none());
        assert!(spawn_target(&mut state).is_none());
    }

    #[test]
    fn test_hit_schedules_replacement_spawn() {
        let mut state = started(8);
        run_ticks(&mut state, 61);
        assert_eq!(state.alive_count(), 3);
        assert!(hit_one(&mut state));
        assert_eq!(state.alive_count(), 2);
        run_ticks(&mut state, 29);
        assert_eq!(state.alive_count(), 2);
        run_ticks(&mut state, 1);
        assert_eq!(state.alive_count(), 3);
    }

    #[test]
    fn test_three_misses_seven_hits_reaches_level_two() {
        let tuning = Tuning {
            // Only one target at a time keeps the order of events exact
            max_alive: 1,
            ..Default::default()
        };
        let mut state = RunState::with_tuning(9, big_bank(), tuning);
        start_run(&mut state);

        let mut misses = 0;
        while misses < 3 {
            let health = state.health;
            tick(&mut state, &idle());
            if state.health < health {
                misses += 1;
            }
        }
        for _ in 0..7 {
            assert!(hit_one(&mut state));
        }

        assert_eq!(state.health, 7);
        assert_eq!(state.level, 2);
        assert!((state.speed - 0.4).abs() < 1e-6);
        assert_eq!(state.completed_this_level, 0);
        assert_eq!(state.stats[0].hits, 7);
        assert_eq!(state.stats[0].misses, 3);
        assert_eq!(state.score, 7);
        assert!(state.events.contains(&GameEvent::LevelCompleted { level: 1 }));
    }

    #[test]
    fn test_level_transition_clears_targets_and_pauses() {
        let tuning = Tuning {
            quota: 1,
            ..Default::default()
        };
        let mut state = RunState::with_tuning(10, big_bank(), tuning);
        start_run(&mut state);
        run_ticks(&mut state, 61);
        assert_eq!(state.alive_count(), 3);

        assert!(hit_one(&mut state));
        assert_eq!(state.level, 2);
        assert_eq!(state.alive_count(), 0);
        let cleared = state
            .targets
            .values()
            .filter(|t| t.state == TargetState::Destroyed(DestroyCause::Cleared))
            .count();
        assert_eq!(cleared, 2);

        // Only the StartLevel timer survives the transition
        assert_eq!(state.scheduler.pending(), 1);
        run_ticks(&mut state, 59);
        assert_eq!(state.alive_count(), 0);
        run_ticks(&mut state, 1);
        assert_eq!(state.alive_count(), 1);
        let t = state.alive_targets().next().unwrap();
        assert!((t.speed - 0.4).abs() < 1e-6);
        assert!(state.bank.for_level(2).any(|eq| eq.expression == t.expression));
    }

    #[test]
    fn test_run_clears_after_final_level() {
        let tuning = Tuning {
            quota: 2,
            ..Default::default()
        };
        let mut state = RunState::with_tuning(11, big_bank(), tuning);
        start_run(&mut state);
        for _ in 0..6 {
            assert!(hit_one(&mut state));
        }
        assert_eq!(state.phase, GamePhase::Complete(RunOutcome::Cleared));
        assert_eq!(state.level, 3);
        assert!(state.scheduler.is_idle());
        let summary = state.summary();
        assert_eq!(summary.total_points, 2 + 4 + 6);
        assert_eq!(state.score, summary.total_points);
    }

    #[test]
    fn test_run_ends_at_zero_health() {
        let tuning = Tuning {
            max_health: 2,
            ..Default::default()
        };
        let mut state = RunState::with_tuning(12, big_bank(), tuning);
        start_run(&mut state);
        run_ticks(&mut state, 5000);
        assert_eq!(state.health, 0);
        assert_eq!(state.phase, GamePhase::Complete(RunOutcome::OutOfHealth));
        assert!(state.scheduler.is_idle());
        assert_eq!(state.stats[0].misses, 2);

        // Nothing moves or spawns after the run ends
        let snapshot = state.targets.clone();
        run_ticks(&mut state, 100);
        assert_eq!(state.alive_count(), snapshot.values().filter(|t| t.is_alive()).count());
        assert!(submit_answer(&mut state, "1").is_none());
    }

    #[test]
    fn test_reset_matches_fresh_state() {
        let mut state = started(13);
        assert!(hit_one(&mut state));
        run_ticks(&mut state, 2000);
        state.reset();

        let fresh = RunState::new(13, big_bank());
        assert_eq!(state.phase, fresh.phase);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, fresh.health);
        assert_eq!(state.level, 1);
        assert_eq!(state.speed, fresh.speed);
        assert_eq!(state.completed_this_level, 0);
        assert_eq!(state.used, fresh.used);
        assert_eq!(state.stats, fresh.stats);
        assert!(state.targets.is_empty());
        assert_eq!(state.scheduler, fresh.scheduler);
        assert!(state.events.is_empty());
        assert_eq!(state.bank, fresh.bank);
    }

    #[test]
    fn test_reset_cancels_pending_spawns() {
        let mut state = started(14);
        assert!(state.scheduler.pending() > 0);
        state.reset();
        run_ticks(&mut state, 500);
        assert!(state.targets.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_restart_is_deterministic() {
        let mut a = started(15);
        let mut b = started(15);
        run_ticks(&mut a, 300);
        run_ticks(&mut b, 300);
        let xs = |s: &RunState| s.targets.values().map(|t| (t.id, t.pos.x)).collect::<Vec<_>>();
        assert_eq!(xs(&a), xs(&b));
    }

    #[test]
    fn test_tick_input_answers() {
        let mut state = started(16);
        run_ticks(&mut state, 1);
        let answer = answer_of_any_alive(&state).unwrap();
        tick(
            &mut state,
            &TickInput {
                answers: vec!["nope".into(), answer],
            },
        );
        assert_eq!(state.score, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_invariants_hold_under_random_play(
            seed in any::<u64>(),
            actions in prop::collection::vec((0u8..4, 1u64..90), 1..60),
        ) {
            let mut state = started(seed);
            let mut last_health = state.health;
            let mut last_misses = 0;
            for (action, wait) in actions {
                match action {
                    0 => {
                        if let Some(a) = answer_of_any_alive(&state) {
                            submit_answer(&mut state, &a);
                        }
                    }
                    1 => {
                        submit_answer(&mut state, "x");
                    }
                    _ => {}
                }
                for _ in 0..wait {
                    tick(&mut state, &idle());
                    prop_assert!(state.alive_count() <= 3);
                    prop_assert!(state.health <= 10);
                    prop_assert!((1..=LEVEL_COUNT).contains(&state.level));

                    let misses: u32 = state.stats.iter().map(|s| s.misses).sum();
                    // Health only drops on misses, one per miss
                    prop_assert_eq!(last_health - state.health, (misses - last_misses) as u8);
                    last_health = state.health;
                    last_misses = misses;

                    prop_assert_eq!(
                        state.is_complete(),
                        state.health == 0
                            || state.phase == GamePhase::Complete(RunOutcome::Cleared)
                    );
                }
            }
        }
    }
}
