//! Count-up animation for statistic values.
//!
//! The displayed number eases out exponentially from `start` to `end` over a
//! fixed duration and lands exactly on `end` once the duration has elapsed.

use std::time::Duration;

use crate::format::format_thousands;

/// Default animation length.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(2);

/// An animated transition between two counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUp {
    start: u64,
    end: u64,
    duration: Duration,
}

impl CountUp {
    /// Animate from zero to `end` over [`DEFAULT_DURATION`].
    #[must_use]
    pub fn new(end: u64) -> Self {
        Self {
            start: 0,
            end,
            duration: DEFAULT_DURATION,
        }
    }

    /// Start from a previously displayed value instead of zero.
    #[must_use]
    pub fn starting_at(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the animation has reached its target after `elapsed`.
    #[must_use]
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration || self.start == self.end
    }

    /// Displayed value after `elapsed`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn value_at(&self, elapsed: Duration) -> u64 {
        if self.is_finished(elapsed) {
            return self.end;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        // easeOutExpo, scaled so that t = 1 maps exactly onto the target
        let progress = (1.0 - 2f64.powf(-10.0 * t)) * 1024.0 / 1023.0;
        let start = self.start as f64;
        let delta = self.end as f64 - start;
        let value = (start + delta * progress).round();
        let (low, high) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        (value.max(0.0) as u64).clamp(low, high)
    }

    /// Displayed value after `elapsed`, with thousands separators.
    #[must_use]
    pub fn formatted_at(&self, elapsed: Duration) -> String {
        format_thousands(self.value_at(elapsed))
    }

    /// Sample `count` evenly spaced frames; the last frame is always `end`.
    #[must_use]
    pub fn frames(&self, count: usize) -> Vec<u64> {
        if count == 0 {
            return Vec::new();
        }
        let steps = u32::try_from(count).unwrap_or(u32::MAX);
        (1..=steps)
            .map(|step| self.value_at(self.duration.mul_f64(f64::from(step) / f64::from(steps))))
            .collect()
    }
}
