//! Per-tick reactive drive behaviors.
//!
//! A [`Behavior`] sees one distance reading per tick and answers with a
//! [`DriveCommand`]. Readings arrive already converted into the behavior's
//! [`DistanceUnits`]; the session takes care of that.

use crate::hardware::{DistanceReading, MAX_DISTANCE_CM};
use crate::robot::DriveCommand;
use crate::units::DistanceUnits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// What the robot is doing about the obstacle ahead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Driving toward whatever is ahead.
    #[default]
    Approach,
    /// Backing away from a nearby obstacle.
    Retreat,
    /// Turning in place.
    Rotate,
}

/// A control loop invoked once per simulation tick.
pub trait Behavior {
    /// Units the behavior expects readings in.
    fn units(&self) -> DistanceUnits;

    /// Decides this tick's drive command.
    fn tick(&mut self, reading: DistanceReading) -> DriveCommand;

    /// The phase chosen by the most recent tick.
    fn phase(&self) -> Phase;

    /// Forgets any state carried between ticks.
    fn reset(&mut self);
}

impl<B: Behavior + ?Sized> Behavior for Box<B> {
    fn units(&self) -> DistanceUnits {
        (**self).units()
    }

    fn tick(&mut self, reading: DistanceReading) -> DriveCommand {
        (**self).tick(reading)
    }

    fn phase(&self) -> Phase {
        (**self).phase()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Thresholds for [`Bounce`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BounceConfig {
    pub units: DistanceUnits,
    /// Readings below this mark the obstacle as near.
    pub near_threshold: f32,
    /// Distance that maps to full power.
    pub scale: f32,
}

impl BounceConfig {
    /// Raw host units: near below 20 cm, full power at 255 cm.
    pub const CENTIMETERS: Self = Self {
        units: DistanceUnits::Centimeters,
        near_threshold: 20.0,
        scale: MAX_DISTANCE_CM,
    };

    /// Normalized units: near below 0.20 m, full power at 2.55 m.
    pub const METERS: Self = Self {
        units: DistanceUnits::Meters,
        near_threshold: 0.20,
        scale: MAX_DISTANCE_CM / 100.0,
    };

    #[must_use]
    pub const fn for_units(units: DistanceUnits) -> Self {
        match units {
            DistanceUnits::Centimeters => Self::CENTIMETERS,
            DistanceUnits::Meters => Self::METERS,
        }
    }
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self::CENTIMETERS
    }
}

/// Drives at an obstacle, backs off once it gets close, and comes back when
/// the obstacle is lost.
///
/// The only state kept between ticks is the `edge` flag. It is raised by a
/// valid reading under the near threshold and lowered only by an
/// out-of-range reading.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounce {
    pub config: BounceConfig,
    edge: bool,
}

impl Bounce {
    #[must_use]
    pub fn new(config: BounceConfig) -> Self {
        Self {
            config,
            edge: false,
        }
    }

    /// Starts from a known flag value.
    #[must_use]
    pub fn with_edge(mut self, edge: bool) -> Self {
        self.edge = edge;
        self
    }

    /// Whether the robot is currently backing away from an obstacle.
    #[must_use]
    pub const fn edge(&self) -> bool {
        self.edge
    }
}

impl Behavior for Bounce {
    fn units(&self) -> DistanceUnits {
        self.config.units
    }

    fn tick(&mut self, reading: DistanceReading) -> DriveCommand {
        match reading {
            DistanceReading::Detected(d) if d < self.config.near_threshold => {
                if !self.edge {
                    info!(distance = d, "obstacle near, retreating");
                }
                self.edge = true;
            }
            DistanceReading::OutOfRange if self.edge => {
                info!("obstacle lost, approaching");
                self.edge = false;
            }
            _ => {}
        }

        let mut power = match reading {
            DistanceReading::Detected(d) => d / self.config.scale,
            DistanceReading::OutOfRange => 1.0,
        };
        if self.edge {
            power = -power;
        }

        DriveCommand::Translate(power)
    }

    fn phase(&self) -> Phase {
        if self.edge {
            Phase::Retreat
        } else {
            Phase::Approach
        }
    }

    fn reset(&mut self) {
        self.edge = false;
    }
}

/// Thresholds for [`Tracking`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub units: DistanceUnits,
    /// Readings beyond this count as nothing ahead.
    pub far_threshold: f32,
    /// Power used both for driving and for turning.
    pub power: f32,
}

impl TrackingConfig {
    pub const CENTIMETERS: Self = Self {
        units: DistanceUnits::Centimeters,
        far_threshold: 125.0,
        power: 1.0,
    };

    pub const METERS: Self = Self {
        units: DistanceUnits::Meters,
        far_threshold: 1.25,
        power: 1.0,
    };

    #[must_use]
    pub const fn for_units(units: DistanceUnits) -> Self {
        match units {
            DistanceUnits::Centimeters => Self::CENTIMETERS,
            DistanceUnits::Meters => Self::METERS,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::CENTIMETERS
    }
}

/// Drives forward until something is within range, then turns in place
/// until it is not. Purely threshold driven: no hysteresis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub config: TrackingConfig,
    phase: Phase,
}

impl Tracking {
    #[must_use]
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            phase: Phase::Approach,
        }
    }
}

impl Behavior for Tracking {
    fn units(&self) -> DistanceUnits {
        self.config.units
    }

    fn tick(&mut self, reading: DistanceReading) -> DriveCommand {
        let clear = reading
            .distance()
            .is_none_or(|d| d > self.config.far_threshold);

        if clear {
            self.phase = Phase::Approach;
            DriveCommand::Translate(self.config.power)
        } else {
            self.phase = Phase::Rotate;
            DriveCommand::Rotate(self.config.power)
        }
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reset(&mut self) {
        self.phase = Phase::Approach;
    }
}

/// The behaviors shipped with the simulator, selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sample {
    Bounce,
    Tracking,
}

impl Sample {
    pub const ALL: [Self; 2] = [Self::Bounce, Self::Tracking];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bounce => "Bounce",
            Self::Tracking => "Tracking",
        }
    }

    /// Builds a fresh behavior for this sample in the given units.
    #[must_use]
    pub fn build(self, units: DistanceUnits) -> Box<dyn Behavior> {
        match self {
            Self::Bounce => Box::new(Bounce::new(BounceConfig::for_units(units))),
            Self::Tracking => Box::new(Tracking::new(TrackingConfig::for_units(units))),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a sample name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sample: {0}")]
pub struct UnknownSample(pub String);

impl FromStr for Sample {
    type Err = UnknownSample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sample| sample.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSample(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn translate_power(cmd: DriveCommand) -> f32 {
        match cmd {
            DriveCommand::Translate(p) => p,
            DriveCommand::Rotate(_) => panic!("expected translate, got {cmd:?}"),
        }
    }

    #[test]
    fn bounce_out_of_range_drives_forward() {
        let mut bounce = Bounce::default();
        let cmd = bounce.tick(DistanceReading::OutOfRange);
        assert!(!bounce.edge());
        assert_relative_eq!(translate_power(cmd), 1.0);
        assert_eq!(bounce.phase(), Phase::Approach);
    }

    #[test]
    fn bounce_near_sets_edge() {
        let mut bounce = Bounce::default();
        bounce.tick(DistanceReading::Detected(10.0));
        assert!(bounce.edge());
        assert_eq!(bounce.phase(), Phase::Retreat);
    }

    #[test]
    fn bounce_lost_obstacle_clears_edge() {
        let mut bounce = Bounce::default().with_edge(true);
        let cmd = bounce.tick(DistanceReading::OutOfRange);
        assert!(!bounce.edge());
        assert_relative_eq!(translate_power(cmd), 1.0);
    }

    #[test]
    fn bounce_edge_retreats_proportionally() {
        let mut bounce = Bounce::default().with_edge(true);
        let cmd = bounce.tick(DistanceReading::Detected(50.0));
        assert!(bounce.edge());
        assert_relative_eq!(translate_power(cmd), -50.0 / 255.0);
    }

    #[test]
    fn bounce_far_reading_keeps_edge() {
        // Only an out-of-range reading lowers the flag.
        let mut bounce = Bounce::default().with_edge(true);
        bounce.tick(DistanceReading::Detected(200.0));
        assert!(bounce.edge());
    }

    #[test]
    fn bounce_meters_preset() {
        let mut bounce = Bounce::new(BounceConfig::METERS).with_edge(true);
        let cmd = bounce.tick(DistanceReading::Detected(50.0));
        assert_relative_eq!(translate_power(cmd), -50.0 / 2.55, epsilon = 1e-4);

        let mut bounce = Bounce::new(BounceConfig::METERS);
        bounce.tick(DistanceReading::Detected(0.1));
        assert!(bounce.edge());
    }

    #[test]
    fn bounce_full_power_at_sensor_range() {
        // A reading at the sensor's maximum maps to exactly full power.
        let mut bounce = Bounce::default();
        let cmd = bounce.tick(DistanceReading::Detected(MAX_DISTANCE_CM));
        assert_relative_eq!(translate_power(cmd), 1.0);

        let mut bounce = Bounce::new(BounceConfig::METERS);
        let cmd = bounce.tick(DistanceReading::Detected(MAX_DISTANCE_CM / 100.0));
        assert_relative_eq!(translate_power(cmd), 1.0);
    }

    #[test]
    fn bounce_is_idempotent_for_fixed_input() {
        let mut bounce = Bounce::default();
        let first = bounce.tick(DistanceReading::Detected(80.0));
        for _ in 0..5 {
            assert_eq!(bounce.tick(DistanceReading::Detected(80.0)), first);
        }

        let mut retreating = Bounce::default().with_edge(true);
        let first = retreating.tick(DistanceReading::Detected(15.0));
        assert_eq!(retreating.tick(DistanceReading::Detected(15.0)), first);
    }

    #[test]
    fn bounce_reset_clears_edge() {
        let mut bounce = Bounce::default().with_edge(true);
        bounce.reset();
        assert!(!bounce.edge());
    }

    #[test]
    fn tracking_far_drives_forward() {
        let mut tracking = Tracking::default();
        assert_eq!(
            tracking.tick(DistanceReading::Detected(200.0)),
            DriveCommand::Translate(1.0)
        );
        assert_eq!(
            tracking.tick(DistanceReading::OutOfRange),
            DriveCommand::Translate(1.0)
        );
        assert_eq!(tracking.phase(), Phase::Approach);
    }

    #[test]
    fn tracking_near_rotates() {
        let mut tracking = Tracking::default();
        assert_eq!(
            tracking.tick(DistanceReading::Detected(50.0)),
            DriveCommand::Rotate(1.0)
        );
        assert_eq!(tracking.phase(), Phase::Rotate);

        // Exactly at the threshold still counts as near.
        assert_eq!(
            tracking.tick(DistanceReading::Detected(125.0)),
            DriveCommand::Rotate(1.0)
        );
    }

    #[test]
    fn tracking_has_no_hysteresis() {
        let mut tracking = Tracking::default();
        tracking.tick(DistanceReading::Detected(10.0));
        assert_eq!(
            tracking.tick(DistanceReading::Detected(126.0)),
            DriveCommand::Translate(1.0)
        );
    }

    #[test]
    fn sample_names() {
        assert_eq!("Bounce".parse::<Sample>(), Ok(Sample::Bounce));
        assert_eq!(" tracking ".parse::<Sample>(), Ok(Sample::Tracking));
        assert!("Spin".parse::<Sample>().is_err());
        assert_eq!(Sample::Tracking.to_string(), "Tracking");
    }

    #[test]
    fn sample_build_uses_units() {
        let behavior = Sample::Bounce.build(DistanceUnits::Meters);
        assert_eq!(behavior.units(), DistanceUnits::Meters);
        assert_eq!(behavior.phase(), Phase::Approach);
    }
}
