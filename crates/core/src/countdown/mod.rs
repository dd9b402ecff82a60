use serde::{Deserialize, Serialize};

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Time left until the event, split into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CountdownParts {
    /// Zero-padded `[days, hours, minutes, seconds]` labels. Days may use
    /// more than two digits.
    pub fn labels(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|value| format!("{value:02}"))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Countdown towards a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    target_ms: i64,
}

impl Countdown {
    /// `target_ms` is milliseconds since the Unix epoch.
    pub fn new(target_ms: i64) -> Self {
        Self { target_ms }
    }

    /// Splits the time left at `now_ms`. Once the target has passed every
    /// unit reads zero.
    pub fn remaining(&self, now_ms: i64) -> CountdownParts {
        let distance = self.target_ms.saturating_sub(now_ms);
        if distance < 0 {
            return CountdownParts::default();
        }

        CountdownParts {
            days: distance / DAY_MS,
            hours: (distance % DAY_MS) / HOUR_MS,
            minutes: (distance % HOUR_MS) / MINUTE_MS,
            seconds: (distance % MINUTE_MS) / SECOND_MS,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
