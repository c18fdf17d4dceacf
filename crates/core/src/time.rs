use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock timestamps for session results.
///
/// Services take a `Clock` instead of calling `Utc::now()` so tests can pin time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward. A system clock is left untouched.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }
}

/// Whole-second countdown driven by an external 1 Hz timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self {
            total: seconds,
            remaining: seconds,
        }
    }

    /// Consume one second. Returns `true` once the countdown has hit zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_expired()
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn countdown_expires_after_its_length() {
        let mut countdown = Countdown::new(3);
        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.tick(), "stays expired");
    }
}
