use std::time::Duration;

use crate::result::{Error, Result};

/// Bounds of the random pause taken before hitting the remote service again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    min: Duration,
    max: Duration,
}

impl DelayWindow {
    pub fn from_secs(min: f64, max: f64) -> Result<Self> {
        let is_valid = min.is_finite() && max.is_finite() && min >= 0.0 && min <= max;
        if !is_valid {
            return Err(Error::InvalidDelay { min, max });
        }

        let to_duration = |secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidDelay { min, max })
        };
        Ok(Self {
            min: to_duration(min)?,
            max: to_duration(max)?,
        })
    }

    /// Pick a duration uniformly in the window
    pub fn sample(&self) -> Duration {
        self.min + (self.max - self.min).mul_f64(fastrand::f64())
    }

    #[cfg(test)]
    pub fn contains(&self, duration: Duration) -> bool {
        (self.min..=self.max).contains(&duration)
    }
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
