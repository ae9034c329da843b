use chrono::{DateTime, Utc};
use std::fmt;

pub const LANDING_SOON: &str = "Landing soon";

/// What a countdown shows at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownDisplay {
    Remaining { hours: i64, minutes: i64, seconds: i64 },
    LandingSoon,
}

impl fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CountdownDisplay::LandingSoon => f.write_str(LANDING_SOON),
            CountdownDisplay::Remaining { hours, minutes, .. } if hours > 0 => {
                write!(f, "{}h {}m remaining", hours, minutes)
            }
            CountdownDisplay::Remaining { minutes, seconds, .. } if minutes > 0 => {
                write!(f, "{}m {}s remaining", minutes, seconds)
            }
            CountdownDisplay::Remaining { seconds, .. } => write!(f, "{}s remaining", seconds),
        }
    }
}

impl CountdownDisplay {
    pub fn at(arrival: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let millis = (arrival - now).num_milliseconds();
        if millis <= 0 {
            return CountdownDisplay::LandingSoon;
        }
        CountdownDisplay::Remaining {
            hours: millis / 3_600_000,
            minutes: (millis % 3_600_000) / 60_000,
            seconds: (millis % 60_000) / 1_000,
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTick {
    pub display: CountdownDisplay,
    /// True on the one tick where the arrival time was first seen as elapsed.
    pub just_completed: bool,
}

/// Live "time remaining until arrival" for an in-progress flight.
///
/// The arrival timestamp is fixed for the lifetime of the countdown; each tick
/// recomputes the remaining time from it. The completion callback runs once,
/// on the first tick at or after arrival, and never again for this instance.
pub struct FlightCountdown {
    arrival: DateTime<Utc>,
    completed: bool,
    on_complete: Option<Box<dyn FnMut() + Send>>,
}

impl fmt::Debug for FlightCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightCountdown")
            .field("arrival", &self.arrival)
            .field("completed", &self.completed)
            .finish()
    }
}

impl FlightCountdown {
    pub fn new(arrival: DateTime<Utc>) -> Self {
        Self {
            arrival,
            completed: false,
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownTick {
        let display = CountdownDisplay::at(self.arrival, now);
        let elapsed = display == CountdownDisplay::LandingSoon;

        let just_completed = elapsed && !self.completed;
        if just_completed {
            self.completed = true;
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
        }

        CountdownTick { display, just_completed }
    }
}
