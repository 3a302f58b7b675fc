//! Motor power shaping.

use serde::{Deserialize, Serialize};

/// Bounds applied to every power sent to a drive motor.
///
/// Small commands are pushed out to `±floor` so a motor is never told to
/// stop outright, and large ones are cut back to `±ceiling`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerClamp {
    /// Smallest magnitude a motor is ever commanded with.
    pub floor: f32,
    /// Largest magnitude a motor is ever commanded with.
    pub ceiling: f32,
}

impl Default for PowerClamp {
    fn default() -> Self {
        Self {
            floor: 0.1,
            ceiling: 1.0,
        }
    }
}

impl PowerClamp {
    /// Shapes `power` into `[-ceiling, -floor] ∪ [floor, ceiling]`.
    ///
    /// Zero, negative zero and NaN have no direction and come out as `-floor`.
    /// Values below `-ceiling` are clamped to `-ceiling`; one of the bundled
    /// scripts never applied that lower bound, this does.
    #[must_use]
    pub fn apply(&self, power: f32) -> f32 {
        if power.is_nan() {
            return -self.floor;
        }

        if power.abs() <= self.floor {
            if power > 0.0 { self.floor } else { -self.floor }
        } else if power > self.ceiling {
            self.ceiling
        } else if power < -self.ceiling {
            -self.ceiling
        } else {
            power
        }
    }
}

/// Shapes `power` with the default `0.1` floor and `1.0` ceiling.
#[must_use]
pub fn clamp_power(power: f32) -> f32 {
    PowerClamp::default().apply(power)
}
