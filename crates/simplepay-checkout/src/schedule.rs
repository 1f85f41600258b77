//! Timed steps of the overlay lifecycle.
//!
//! Steps are run by the controller's `poll(now)`. The host calls it from
//! its event loop and can sleep until [`Schedule::next_due`].

use std::time::Instant;

/// A deferred piece of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Next paint frame after `pay`: reveal the container (Opening → Open).
    RevealContainer,
    /// Start fading the loader once the content has loaded.
    FadeLoader,
    /// Remove the faded loader.
    HideLoader,
    /// End of the exit transition for close cycle `cycle`.
    Settle { cycle: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Instant,
    step: Step,
}

#[derive(Debug, Default)]
pub struct Schedule {
    steps: Vec<Scheduled>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: Instant, step: Step) {
        self.steps.push(Scheduled { due, step });
    }

    /// Drop every step matching `pred`. Returns how many were dropped.
    pub fn cancel(&mut self, pred: impl Fn(&Step) -> bool) -> usize {
        let before = self.steps.len();
        self.steps.retain(|s| !pred(&s.step));
        before - self.steps.len()
    }

    pub fn contains(&self, pred: impl Fn(&Step) -> bool) -> bool {
        self.steps.iter().any(|s| pred(&s.step))
    }

    /// Remove and return the earliest step due at `now`. Ties go to the
    /// step scheduled first.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, Step)> {
        let index = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(i, s)| (s.due, *i))
            .map(|(i, _)| i)?;
        let scheduled = self.steps.remove(index);
        Some((scheduled.due, scheduled.step))
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.steps.iter().map(|s| s.due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pops_due_steps_in_time_order() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new();
        schedule.push(t0 + Duration::from_millis(300), Step::HideLoader);
        schedule.push(t0 + Duration::from_millis(100), Step::FadeLoader);
        schedule.push(t0 + Duration::from_millis(900), Step::Settle { cycle: 1 });

        let now = t0 + Duration::from_millis(400);
        assert_eq!(schedule.pop_due(now).map(|(_, s)| s), Some(Step::FadeLoader));
        assert_eq!(schedule.pop_due(now).map(|(_, s)| s), Some(Step::HideLoader));
        assert_eq!(schedule.pop_due(now), None);
        assert_eq!(schedule.next_due(), Some(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn equal_due_times_keep_insertion_order() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new();
        schedule.push(t0, Step::RevealContainer);
        schedule.push(t0, Step::FadeLoader);
        assert_eq!(schedule.pop_due(t0).map(|(_, s)| s), Some(Step::RevealContainer));
        assert_eq!(schedule.pop_due(t0).map(|(_, s)| s), Some(Step::FadeLoader));
    }

    #[test]
    fn cancel_by_predicate() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new();
        schedule.push(t0, Step::FadeLoader);
        schedule.push(t0, Step::HideLoader);
        schedule.push(t0, Step::Settle { cycle: 3 });

        let dropped = schedule.cancel(|s| matches!(s, Step::FadeLoader | Step::HideLoader));
        assert_eq!(dropped, 2);
        assert!(schedule.contains(|s| matches!(s, Step::Settle { .. })));
        assert_eq!(schedule.next_due(), Some(t0));
    }

    #[test]
    fn nothing_due_before_time() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new();
        schedule.push(t0 + Duration::from_millis(50), Step::RevealContainer);
        assert_eq!(schedule.pop_due(t0), None);
    }
}
