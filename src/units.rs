//! Unit conversions shared by the host and the behaviors.
//!
//! The host lays the field out in pixels, where one pixel is 0.40 inches.
//! Distance sensors report centimeters, and the normalized behavior presets
//! work in meters.

use serde::{Deserialize, Serialize};

/// Inches covered by one pixel.
pub const INCHES_PER_PIXEL: f32 = 0.40;

/// Side length of every robot, in inches.
pub const ROBOT_SIZE_IN: f32 = 18.0;

/// Width of every robot [px].
pub const ROBOT_WIDTH: f32 = in_to_px(ROBOT_SIZE_IN);

/// Height of every robot [px].
pub const ROBOT_HEIGHT: f32 = in_to_px(ROBOT_SIZE_IN);

/// Fraction of the half-extents at which drive motors are mounted.
pub const MOTOR_INSET: f32 = 0.40;

#[must_use]
pub const fn in_to_px(inches: f32) -> f32 {
    inches / INCHES_PER_PIXEL
}

/// The length unit a behavior expects its distance readings in.
///
/// Hosts always report centimeters. The raw samples compare against
/// centimeter thresholds, the normalized samples against meters; the two
/// differ by a factor of 100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnits {
    /// Raw host units.
    #[default]
    Centimeters,
    /// Normalized units (centimeters / 100).
    Meters,
}

impl DistanceUnits {
    /// Converts a centimeter value from the host into these units.
    #[must_use]
    pub fn convert_centimeters(self, cm: f32) -> f32 {
        match self {
            Self::Centimeters => cm,
            Self::Meters => cm / 100.0,
        }
    }
}
