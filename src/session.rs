//! Tick driver that runs a [`Behavior`] against a bound robot.
//!
//! The entry point is [`Session`]. Bind a [`RobotBinding`] from a host, pick a
//! behavior (directly or through [`Sample`](crate::Sample)), then call
//! [`Session::update`] once per host frame. The session owns the
//! running/paused flags, the run speed and the simulated clock.

use crate::behavior::{Behavior, Phase};
use crate::error::Result;
use crate::hardware::{Actuator, DistanceReading, RangeSensor};
use crate::power::PowerClamp;
use crate::robot::{DriveCommand, RobotBinding};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Multiplier on simulated time per tick, limited to `[0.01, 5.0]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct RunSpeed(f64);

impl RunSpeed {
    pub const MIN: f64 = 0.01;
    pub const MAX: f64 = 5.0;

    /// Clamps `speed` into range. NaN falls back to normal speed.
    #[must_use]
    pub fn new(speed: f64) -> Self {
        if speed.is_nan() {
            return Self::default();
        }
        Self(speed.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for RunSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for RunSpeed {
    fn from(speed: f64) -> Self {
        Self::new(speed)
    }
}

impl From<RunSpeed> for f64 {
    fn from(speed: RunSpeed) -> Self {
        speed.0
    }
}

/// Ticks per simulated second at normal speed. Always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TickRate(f64);

/// Error returned for a tick rate that is zero, negative or not finite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("tick rate must be finite and positive, got {0}")]
pub struct InvalidTickRate(pub f64);

impl TickRate {
    pub fn new(rate: f64) -> std::result::Result<Self, InvalidTickRate> {
        if rate.is_finite() && rate > 0.0 {
            Ok(Self(rate))
        } else {
            Err(InvalidTickRate(rate))
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(60.0)
    }
}

impl TryFrom<f64> for TickRate {
    type Error = InvalidTickRate;

    fn try_from(rate: f64) -> std::result::Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<TickRate> for f64 {
    fn from(rate: TickRate) -> Self {
        rate.0
    }
}

/// Configuration for a [`Session`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ticks per simulated second at normal speed. Default: 60.
    pub tick_rate: TickRate,
    /// Initial run speed.
    pub run_speed: RunSpeed,
    /// Power shaping applied to every motor command.
    pub clamp: PowerClamp,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: TickRate::default(),
            run_speed: RunSpeed::default(),
            clamp: PowerClamp::default(),
        }
    }
}

/// What happened on one successful tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Reading handed to the behavior, already in its units.
    pub reading: DistanceReading,
    pub command: DriveCommand,
    pub phase: Phase,
}

/// Runs a behavior against a robot, one tick per [`update`](Self::update).
pub struct Session<M, S, B> {
    robot: RobotBinding<M, S>,
    behavior: B,
    config: SessionConfig,
    running: bool,
    paused: bool,
    runtime: f64,
    ticks: u64,
    failures: u64,
}

impl<M: Actuator, S: RangeSensor, B: Behavior> Session<M, S, B> {
    /// Creates a stopped session. The config's clamp replaces the robot's.
    pub fn new(robot: RobotBinding<M, S>, behavior: B, config: SessionConfig) -> Self {
        let robot = robot.with_clamp(config.clamp);
        Self {
            robot,
            behavior,
            config,
            running: false,
            paused: false,
            runtime: 0.0,
            ticks: 0,
            failures: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("session started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(runtime = self.runtime, ticks = self.ticks, "session stopped");
        }
        self.running = false;
    }

    pub fn pause(&mut self) {
        if !self.paused {
            info!("session paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("session resumed");
        }
        self.paused = false;
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the run speed, clamped to `[0.01, 5.0]`.
    pub fn set_run_speed(&mut self, speed: f64) {
        let clamped = RunSpeed::new(speed);
        if clamped.get() != speed {
            warn!(requested = speed, applied = clamped.get(), "run speed clamped");
        }
        self.config.run_speed = clamped;
    }

    #[must_use]
    pub const fn run_speed(&self) -> RunSpeed {
        self.config.run_speed
    }

    /// Simulated seconds elapsed since the last reset.
    #[must_use]
    pub const fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Number of ticks that completed without error.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of ticks that failed talking to the host.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Simulated seconds covered by one tick at the current run speed.
    #[must_use]
    pub fn delta_time(&self) -> f64 {
        self.config.run_speed.get() / self.config.tick_rate.get()
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn robot(&self) -> &RobotBinding<M, S> {
        &self.robot
    }

    /// Advances one frame if the session is running and not paused.
    ///
    /// A tick that fails against the host is logged and skipped; the next
    /// update tries again.
    pub fn update(&mut self) -> Option<TickReport> {
        if !self.running || self.paused {
            return None;
        }

        self.runtime += self.delta_time();

        match self.tick() {
            Ok(report) => Some(report),
            Err(err) => {
                self.failures += 1;
                warn!(error = %err, runtime = self.runtime, "tick failed");
                None
            }
        }
    }

    /// Reads the sensor, runs the behavior once and drives the motors.
    ///
    /// Ignores the running and paused flags.
    pub fn tick(&mut self) -> Result<TickReport> {
        let units = self.behavior.units();
        let reading = self
            .robot
            .read_distance()?
            .map(|cm| units.convert_centimeters(cm));

        let command = self.behavior.tick(reading);
        let phase = self.behavior.phase();
        debug!(?reading, ?command, ?phase, "tick");

        self.robot.apply(command)?;
        self.ticks += 1;

        Ok(TickReport {
            reading,
            command,
            phase,
        })
    }

    /// Returns to the initial state: stopped, unpaused, clock at zero and
    /// behavior state cleared.
    pub fn reset(&mut self) {
        self.running = false;
        self.paused = false;
        self.runtime = 0.0;
        self.ticks = 0;
        self.failures = 0;
        self.behavior.reset();
        info!("session reset");
    }
}
