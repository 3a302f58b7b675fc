//! Capability traits for the host's motors and sensors.
//!
//! Scripts never see a concrete simulator. Anything that can take a power
//! setting is an [`Actuator`], anything that can report a distance is a
//! [`RangeSensor`], and the thing that hands both out is a [`Host`].

use crate::error::Result;
use crate::robot::MotorMount;
use serde::{Deserialize, Serialize};

/// Raw value a distance sensor reports when nothing is in range.
pub const OUT_OF_RANGE: f32 = -1.0;

/// Farthest distance a distance sensor can see [cm].
pub const MAX_DISTANCE_CM: f32 = 255.0;

/// A single distance sensor sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DistanceReading {
    /// An obstacle was detected at this distance.
    Detected(f32),
    /// Nothing within range.
    OutOfRange,
}

impl DistanceReading {
    /// Interprets a raw host value. Negative and NaN values are out of range.
    #[must_use]
    pub fn from_raw(raw: f32) -> Self {
        if raw.is_nan() || raw < 0.0 {
            Self::OutOfRange
        } else {
            Self::Detected(raw)
        }
    }

    /// The raw host value, with [`OUT_OF_RANGE`] for no reading.
    #[must_use]
    pub const fn to_raw(self) -> f32 {
        match self {
            Self::Detected(d) => d,
            Self::OutOfRange => OUT_OF_RANGE,
        }
    }

    #[must_use]
    pub const fn distance(self) -> Option<f32> {
        match self {
            Self::Detected(d) => Some(d),
            Self::OutOfRange => None,
        }
    }

    /// Applies `f` to a detected distance, leaving [`OutOfRange`](Self::OutOfRange) alone.
    #[must_use]
    pub fn map(self, f: impl FnOnce(f32) -> f32) -> Self {
        match self {
            Self::Detected(d) => Self::Detected(f(d)),
            Self::OutOfRange => Self::OutOfRange,
        }
    }
}

/// Something that accepts a motor power in `[-1, 1]`.
pub trait Actuator {
    /// Commands a new power. The value is written, never read back.
    fn set_power(&mut self, power: f32) -> Result<()>;
}

/// Something that reports distance to the nearest obstacle.
pub trait RangeSensor {
    /// Raw distance in centimeters, or [`OUT_OF_RANGE`].
    fn get_distance(&mut self) -> Result<f32>;

    /// Typed reading built from [`get_distance`](Self::get_distance).
    fn reading(&mut self) -> Result<DistanceReading> {
        self.get_distance().map(DistanceReading::from_raw)
    }
}

/// The simulation a script is attached to.
pub trait Host {
    /// Handle type returned for attached motors.
    type Motor: Actuator;
    /// Handle type returned for installed sensors.
    type Sensor: RangeSensor;

    /// Attaches a motor at the given mount point and returns its handle.
    ///
    /// Motors are indexed in the order they are added.
    fn add_motor(&mut self, mount: MotorMount) -> Result<Self::Motor>;

    /// Fetches the sensor installed at `index`.
    fn sensor(&mut self, index: usize) -> Result<Self::Sensor>;

    /// Powers the motor that was added `index`-th, without going through its handle.
    fn power_motor(&mut self, power: f32, index: usize) -> Result<()>;
}
