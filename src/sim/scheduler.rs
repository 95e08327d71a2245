//! Virtual clock with one-shot and repeating timers
//!
//! Time is measured in simulation ticks. Nothing fires on its own: the tick
//! loop calls [`Scheduler::advance`] and then drains due timers one at a time
//! with [`Scheduler::pop_due`], so a handler that cancels timers stops the
//! rest of the batch from firing.

/// Creation order of a timer, breaks ties between equal due times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct TimerId(u64);

#[derive(Debug, Clone, PartialEq)]
struct Timer<E> {
    id: TimerId,
    due: u64,
    every: Option<u64>,
    event: E,
}

/// Timer queue over a virtual clock
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler<E> {
    now: u64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Current virtual time in ticks
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of timers still pending
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    fn push(&mut self, due: u64, every: Option<u64>, event: E) {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due,
            every,
            event,
        });
    }

    /// Fire `event` once, `delay` ticks from now (0 = before the current
    /// drain finishes)
    pub fn after(&mut self, delay: u64, event: E) {
        self.push(self.now + delay, None, event)
    }

    /// Fire `event` every `interval` ticks, first after one interval
    pub fn every(&mut self, interval: u64, event: E) {
        let interval = interval.max(1);
        self.push(self.now + interval, Some(interval), event)
    }

    /// Cancel everything pending
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Move the clock forward. Call [`Scheduler::pop_due`] afterwards.
    pub fn advance(&mut self, ticks: u64) {
        self.now += ticks;
    }
}

impl<E: Clone> Scheduler<E> {
    /// Take the earliest due timer (ties broken by creation order).
    /// Repeating timers are re-armed for their next period.
    pub fn pop_due(&mut self) -> Option<E> {
        let now = self.now;
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.id))?;

        match self.timers[idx].every {
            Some(interval) => {
                let timer = &mut self.timers[idx];
                timer.due += interval;
                Some(timer.event.clone())
            }
            None => Some(self.timers.remove(idx).event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>) -> Vec<&'static str> {
        std::iter::from_fn(|| s.pop_due()).collect()
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        s.after(3, "a");
        s.advance(2);
        assert!(drain(&mut s).is_empty());
        s.advance(1);
        assert_eq!(drain(&mut s), vec!["a"]);
        s.advance(10);
        assert!(drain(&mut s).is_empty());
        assert!(s.is_idle());
    }

    #[test]
    fn test_zero_delay_fires_in_current_drain() {
        let mut s = Scheduler::new();
        s.advance(5);
        s.after(0, "now");
        assert_eq!(s.pop_due(), Some("now"));
    }

    #[test]
    fn test_repeating_timer() {
        let mut s = Scheduler::new();
        s.every(4, "spawn");
        let mut fired = 0;
        for _ in 0..12 {
            s.advance(1);
            fired += drain(&mut s).len();
        }
        assert_eq!(fired, 3);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_due_order_then_creation_order() {
        let mut s = Scheduler::new();
        s.after(2, "late");
        s.after(1, "first");
        s.after(1, "second");
        s.advance(5);
        assert_eq!(drain(&mut s), vec!["first", "second", "late"]);
    }

    #[test]
    fn test_cancel_all_mid_drain_stops_stale_timers() {
        let mut s = Scheduler::new();
        s.after(1, "reset");
        s.after(1, "stale");
        s.every(1, "stale_repeat");
        s.advance(1);
        assert_eq!(s.pop_due(), Some("reset"));
        s.cancel_all();
        assert_eq!(s.pop_due(), None);
        s.advance(100);
        assert_eq!(s.pop_due(), None);
    }
}
