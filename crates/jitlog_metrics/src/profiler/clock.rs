use std::time::{Duration, Instant};

/// Source of timestamps for phase boundaries
pub trait TimeSource: Send {
    fn now(&mut self) -> Instant;
}

/// System monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock that moves forward by a fixed step on every read.
///
/// The first read returns the base instant, so a phase opened and closed
/// back to back spans exactly one step.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    base: Instant,
    step: Duration,
    ticks: u32,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self::starting_at(Instant::now(), step)
    }

    pub fn starting_at(base: Instant, step: Duration) -> Self {
        Self {
            base,
            step,
            ticks: 0,
        }
    }

    /// Number of reads so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

impl TimeSource for SteppingClock {
    fn now(&mut self) -> Instant {
        let now = self.base + self.step * self.ticks;
        self.ticks += 1;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepping_clock() {
        let base = Instant::now();
        let mut clock = SteppingClock::starting_at(base, Duration::from_millis(20));
        assert_eq!(clock.now(), base);
        assert_eq!(clock.now(), base + Duration::from_millis(20));
        assert_eq!(clock.now() - base, Duration::from_millis(40));
        assert_eq!(clock.ticks(), 3);
    }

    #[test]
    fn test_monotonic_clock() {
        let mut clock = MonotonicClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
