use thiserror::Error;

use crate::Tick;

/// Errors that can occur during wrapping tick arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    /// Integer overflow occurred during wrapping difference calculation.
    /// This should be mathematically impossible with valid u16 inputs.
    #[error("Integer overflow in tick_diff({a}, {b}) - this should not happen")]
    IntegerOverflow { a: Tick, b: Tick },
}

/// Returns whether tick `a` comes after tick `b`, treating the tick counter as
/// a wrapping sequence.
/// tick_greater_than(2,1) will return true
/// tick_greater_than(1,2) will return false
/// tick_greater_than(0,65535) will return true
pub fn tick_greater_than(a: Tick, b: Tick) -> bool {
    ((a > b) && (a - b <= 32768)) || ((a < b) && (b - a > 32768))
}

/// Returns whether tick `a` comes before tick `b`.
/// tick_less_than(1,2) will return true
/// tick_less_than(65535,0) will return true
pub fn tick_less_than(a: Tick, b: Tick) -> bool {
    tick_greater_than(b, a)
}

/// Signed number of ticks to move from `a` to reach `b`, across the wrap point.
///
/// # Examples
/// ```
/// # use reprise_shared::try_tick_diff;
/// assert_eq!(try_tick_diff(1, 2).unwrap(), 1);
/// assert_eq!(try_tick_diff(2, 1).unwrap(), -1);
/// assert_eq!(try_tick_diff(65535, 0).unwrap(), 1);
/// ```
pub fn try_tick_diff(a: Tick, b: Tick) -> Result<i16, TickError> {
    const SPAN: i32 = (Tick::MAX as i32) + 1;

    let forward = (i32::from(b) - i32::from(a)).rem_euclid(SPAN);
    let diff = if forward > i32::from(i16::MAX) {
        forward - SPAN
    } else {
        forward
    };

    i16::try_from(diff).map_err(|_| TickError::IntegerOverflow { a, b })
}

/// Signed number of ticks to move from `a` to reach `b`.
///
/// # Panics
///
/// Panics if an impossible integer overflow occurs.
pub fn tick_diff(a: Tick, b: Tick) -> i16 {
    try_tick_diff(a, b).expect("integer overflow in tick_diff - this should not happen")
}

/// Ticks elapsed since `since`, negative if `since` is still ahead of `now`.
pub fn elapsed_ticks(now: Tick, since: Tick) -> i16 {
    tick_diff(since, now)
}

/// Ticks left until `target`, negative once it has passed.
pub fn remaining_ticks(now: Tick, target: Tick) -> i16 {
    tick_diff(now, target)
}

pub fn has_reached(now: Tick, target: Tick) -> bool {
    !tick_less_than(now, target)
}

/// Converts between wall-clock seconds and simulation ticks for a fixed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickClock {
    pub tick_seconds: f32,
}

impl TickClock {
    pub fn new(tick_seconds: f32) -> Self {
        Self { tick_seconds }
    }

    pub fn from_tick_rate(ticks_per_second: u16) -> Self {
        Self::new(1.0 / f32::from(ticks_per_second.max(1)))
    }

    /// Smallest tick count covering `seconds`; partial ticks round up.
    pub fn ticks_from_seconds(&self, seconds: f32) -> Tick {
        let ticks = (seconds / self.tick_seconds).ceil();
        if ticks <= 0.0 {
            0
        } else if ticks >= f32::from(Tick::MAX) {
            Tick::MAX
        } else {
            ticks as Tick
        }
    }

    pub fn seconds_from_ticks(&self, ticks: i32) -> f32 {
        ticks as f32 * self.tick_seconds
    }

    /// The tick `seconds` after `now`, truncating partial ticks.
    pub fn tick_after(&self, now: Tick, seconds: f32) -> Tick {
        let ticks = (seconds / self.tick_seconds).max(0.0) as u32;
        now.wrapping_add((ticks % (u32::from(Tick::MAX) + 1)) as Tick)
    }

    pub fn elapsed_seconds(&self, now: Tick, since: Tick) -> f32 {
        self.seconds_from_ticks(i32::from(elapsed_ticks(now, since)))
    }

    pub fn remaining_seconds(&self, now: Tick, target: Tick) -> f32 {
        -self.elapsed_seconds(now, target)
    }
}
