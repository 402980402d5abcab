use chrono::{NaiveDateTime, TimeDelta};

/// A simulation clock that hands out one timestamp per recorded step.
///
/// The first tick yields the start timestamp; every following tick yields
/// the previous timestamp plus one step.
///
/// # Examples
///
/// ```
/// use bess_sim::sim::clock::Clock;
/// use bess_sim::sim::types::default_start;
/// use chrono::TimeDelta;
///
/// let mut clock = Clock::new(default_start(), TimeDelta::minutes(15));
/// let first = clock.tick();
/// let second = clock.tick();
/// assert_eq!(second - first, TimeDelta::minutes(15));
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Timestamp of the first tick.
    start: NaiveDateTime,
    /// Distance between two ticks.
    step: TimeDelta,
    /// Number of ticks handed out so far.
    ticks: usize,
}

impl Clock {
    /// Creates a clock anchored at `start`.
    pub fn new(start: NaiveDateTime, step: TimeDelta) -> Self {
        Self {
            start,
            step,
            ticks: 0,
        }
    }

    /// Returns the timestamp of the next step and advances the clock.
    pub fn tick(&mut self) -> NaiveDateTime {
        let at = self.peek();
        self.ticks += 1;
        at
    }

    /// Returns the timestamp the next tick will yield.
    ///
    /// Saturates at [`NaiveDateTime::MAX`] once the time axis runs past the
    /// last representable timestamp.
    pub fn peek(&self) -> NaiveDateTime {
        i32::try_from(self.ticks)
            .ok()
            .and_then(|n| self.step.checked_mul(n))
            .and_then(|offset| self.start.checked_add_signed(offset))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Rewinds the clock to its start timestamp.
    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}
