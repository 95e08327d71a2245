//! Resolving a typed answer to a target

use std::cmp::Ordering;

use super::state::{Target, TargetId};

/// Parse player input as a number. Anything non-numeric is ignored.
pub fn parse_answer(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Does a target's answer equal `value` within `tolerance`?
#[inline]
pub fn answer_matches(answer: f64, value: f64, tolerance: f64) -> bool {
    (answer - value).abs() < tolerance
}

/// Selection metric: horizontal offset from centre plus distance fallen
/// from the spawn line. Lower wins.
#[inline]
pub fn selection_metric(target: &Target, spawn_y: f32) -> f32 {
    target.pos.x.abs() + (spawn_y - target.pos.y)
}

/// Pick the alive target whose answer matches `value` with the lowest
/// selection metric. Earlier targets win exact ties.
pub fn find_match<'a, I>(targets: I, value: f64, tolerance: f64, spawn_y: f32) -> Option<TargetId>
where
    I: IntoIterator<Item = &'a Target>,
{
    targets
        .into_iter()
        .filter(|t| t.is_alive() && answer_matches(t.answer, value, tolerance))
        .fold(None::<(&Target, f32)>, |best, t| {
            let metric = selection_metric(t, spawn_y);
            match best {
                Some((_, best_metric))
                    if metric.partial_cmp(&best_metric) != Some(Ordering::Less) =>
                {
                    best
                }
                _ => Some((t, metric)),
            }
        })
        .map(|(t, _)| t.id)
}
