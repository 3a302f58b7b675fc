use crate::error::Result;
use crate::hardware::{Actuator, DistanceReading, Host, RangeSensor};
use crate::power::PowerClamp;
use crate::units::{MOTOR_INSET, ROBOT_HEIGHT, ROBOT_WIDTH};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Index of the distance sensor every script reads.
pub const DISTANCE_SENSOR_INDEX: usize = 0;

/// Which side of the chassis a motor sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The four drive motor positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorLabel {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl MotorLabel {
    /// Order in which the motors are attached to the host.
    pub const ATTACH_ORDER: [Self; 4] = [
        Self::FrontRight,
        Self::BackRight,
        Self::FrontLeft,
        Self::BackLeft,
    ];

    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::FrontLeft | Self::BackLeft => Side::Left,
            Self::FrontRight | Self::BackRight => Side::Right,
        }
    }

    /// Unit direction of this corner from the robot center (`+y` is front).
    #[must_use]
    pub const fn corner(self) -> Vec2 {
        match self {
            Self::FrontRight => Vec2::new(1.0, 1.0),
            Self::BackRight => Vec2::new(1.0, -1.0),
            Self::FrontLeft => Vec2::new(-1.0, 1.0),
            Self::BackLeft => Vec2::new(-1.0, -1.0),
        }
    }
}

impl fmt::Display for MotorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrontLeft => "front-left",
            Self::FrontRight => "front-right",
            Self::BackLeft => "back-left",
            Self::BackRight => "back-right",
        };
        f.write_str(name)
    }
}

/// Where a motor is attached on the chassis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotorMount {
    pub label: MotorLabel,

    /// Offset from the robot center [px].
    pub offset: Vec2,
}

impl MotorMount {
    /// Standard mount for `label`: 40% of the half-width and half-height out
    /// from center, toward that corner.
    #[must_use]
    pub fn standard(label: MotorLabel) -> Self {
        let diff = Vec2::new(ROBOT_WIDTH, ROBOT_HEIGHT) * MOTOR_INSET;
        Self {
            label,
            offset: label.corner() * diff,
        }
    }
}

/// A single per-tick drive decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveCommand {
    /// Same power on all four motors.
    Translate(f32),
    /// `+power` on the right side, `-power` on the left.
    Rotate(f32),
}

impl DriveCommand {
    /// Power commanded to the motor at `label`, after clamping.
    #[must_use]
    pub fn power_for(self, label: MotorLabel, clamp: &PowerClamp) -> f32 {
        match self {
            Self::Translate(power) => clamp.apply(power),
            Self::Rotate(power) => {
                let power = clamp.apply(power);
                match label.side() {
                    Side::Right => power,
                    Side::Left => -power,
                }
            }
        }
    }
}

/// The motors and sensor a script drives, bound once from the host.
#[derive(Debug)]
pub struct RobotBinding<M, S> {
    pub front_left: M,
    pub front_right: M,
    pub back_left: M,
    pub back_right: M,

    /// The forward-facing distance sensor.
    pub distance: S,

    /// Shaping applied to every power before it reaches a motor.
    pub clamp: PowerClamp,
}

impl<M: Actuator, S: RangeSensor> RobotBinding<M, S> {
    /// Attaches the four drive motors and fetches the distance sensor.
    ///
    /// Any failure here is fatal for the run; nothing is retried.
    pub fn bind<H>(host: &mut H) -> Result<Self>
    where
        H: Host<Motor = M, Sensor = S>,
    {
        let front_right = host.add_motor(MotorMount::standard(MotorLabel::FrontRight))?;
        let back_right = host.add_motor(MotorMount::standard(MotorLabel::BackRight))?;
        let front_left = host.add_motor(MotorMount::standard(MotorLabel::FrontLeft))?;
        let back_left = host.add_motor(MotorMount::standard(MotorLabel::BackLeft))?;
        let distance = host.sensor(DISTANCE_SENSOR_INDEX)?;

        info!("robot bound: 4 drive motors, distance sensor {DISTANCE_SENSOR_INDEX}");

        Ok(Self {
            front_left,
            front_right,
            back_left,
            back_right,
            distance,
            clamp: PowerClamp::default(),
        })
    }

    /// Replaces the power shaping (builder pattern).
    #[must_use]
    pub fn with_clamp(mut self, clamp: PowerClamp) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn motor_mut(&mut self, label: MotorLabel) -> &mut M {
        match label {
            MotorLabel::FrontLeft => &mut self.front_left,
            MotorLabel::FrontRight => &mut self.front_right,
            MotorLabel::BackLeft => &mut self.back_left,
            MotorLabel::BackRight => &mut self.back_right,
        }
    }

    pub fn read_distance(&mut self) -> Result<DistanceReading> {
        self.distance.reading()
    }

    /// Drives all four motors with the same clamped power.
    pub fn drive(&mut self, power: f32) -> Result<()> {
        self.apply(DriveCommand::Translate(power))
    }

    /// Spins in place: right side forward, left side backward for positive power.
    pub fn rotate(&mut self, power: f32) -> Result<()> {
        self.apply(DriveCommand::Rotate(power))
    }

    /// Writes `command` to every motor.
    ///
    /// A failing motor does not stop the others from being written; the
    /// first failure is returned once all four have been tried.
    pub fn apply(&mut self, command: DriveCommand) -> Result<()> {
        let clamp = self.clamp;
        let mut first_err = None;
        for label in [
            MotorLabel::FrontLeft,
            MotorLabel::FrontRight,
            MotorLabel::BackLeft,
            MotorLabel::BackRight,
        ] {
            let power = command.power_for(label, &clamp);
            if let Err(err) = self.motor_mut(label).set_power(power) {
                warn!(motor = %label, error = %err, "motor write failed");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
