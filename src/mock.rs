//! An in-memory [`Host`] for exercising behaviors without a simulator.
//!
//! Handles share state with the [`MockHost`] that issued them, so a test can
//! keep the host around, feed it distances, and inspect what every motor was
//! told to do.

use crate::error::{HostError, Result};
use crate::hardware::{Actuator, Host, OUT_OF_RANGE, RangeSensor};
use crate::robot::{MotorLabel, MotorMount};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug)]
struct MotorState {
    mount: MotorMount,
    power: f32,
    history: Vec<f32>,
    connected: bool,
}

#[derive(Debug)]
struct SensorState {
    raw: f32,
    queued: VecDeque<f32>,
    connected: bool,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            raw: OUT_OF_RANGE,
            queued: VecDeque::new(),
            connected: true,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    motors: Vec<MotorState>,
    sensors: Vec<SensorState>,
    motor_limit: Option<usize>,
}

impl Shared {
    fn motor(&mut self, index: usize) -> Result<&mut MotorState> {
        let motor = self
            .motors
            .get_mut(index)
            .ok_or(HostError::MotorUnavailable { index })?;
        if !motor.connected {
            return Err(HostError::disconnected(format!(
                "{} motor",
                motor.mount.label
            )));
        }
        Ok(motor)
    }

    fn sensor(&mut self, index: usize) -> Result<&mut SensorState> {
        let sensor = self
            .sensors
            .get_mut(index)
            .ok_or(HostError::SensorUnavailable { index })?;
        if !sensor.connected {
            return Err(HostError::disconnected(format!("sensor {index}")));
        }
        Ok(sensor)
    }
}

/// A host with no physics: motors record power, sensors replay set values.
#[derive(Clone, Debug)]
pub struct MockHost {
    shared: Rc<RefCell<Shared>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// A host with a single distance sensor that sees nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sensors(1)
    }

    #[must_use]
    pub fn with_sensors(count: usize) -> Self {
        let shared = Shared {
            sensors: (0..count).map(|_| SensorState::default()).collect(),
            ..Shared::default()
        };
        Self {
            shared: Rc::new(RefCell::new(shared)),
        }
    }

    /// Rejects any motor added beyond the first `limit`.
    #[must_use]
    pub fn with_motor_limit(self, limit: usize) -> Self {
        self.shared.borrow_mut().motor_limit = Some(limit);
        self
    }

    /// Sets what sensor `index` reports once its queue is empty.
    pub fn set_distance(&self, index: usize, raw: f32) {
        if let Some(sensor) = self.shared.borrow_mut().sensors.get_mut(index) {
            sensor.raw = raw;
        }
    }

    /// Queues readings for sensor `index`, one per read. The last one sticks.
    pub fn queue_distances(&self, index: usize, raws: impl IntoIterator<Item = f32>) {
        if let Some(sensor) = self.shared.borrow_mut().sensors.get_mut(index) {
            sensor.queued.extend(raws);
        }
    }

    pub fn disconnect_sensor(&self, index: usize) {
        if let Some(sensor) = self.shared.borrow_mut().sensors.get_mut(index) {
            sensor.connected = false;
        }
    }

    pub fn reconnect_sensor(&self, index: usize) {
        if let Some(sensor) = self.shared.borrow_mut().sensors.get_mut(index) {
            sensor.connected = true;
        }
    }

    pub fn disconnect_motor(&self, label: MotorLabel) {
        let mut shared = self.shared.borrow_mut();
        if let Some(motor) = shared.motors.iter_mut().find(|m| m.mount.label == label) {
            motor.connected = false;
        }
    }

    /// Last power written to the motor at `label`, if it was ever added.
    #[must_use]
    pub fn motor_power(&self, label: MotorLabel) -> Option<f32> {
        self.shared
            .borrow()
            .motors
            .iter()
            .find(|m| m.mount.label == label)
            .map(|m| m.power)
    }

    /// Every power written to the motor at `label`, oldest first.
    #[must_use]
    pub fn motor_history(&self, label: MotorLabel) -> Vec<f32> {
        self.shared
            .borrow()
            .motors
            .iter()
            .find(|m| m.mount.label == label)
            .map(|m| m.history.clone())
            .unwrap_or_default()
    }

    /// Mount points in the order motors were added.
    #[must_use]
    pub fn mounts(&self) -> Vec<MotorMount> {
        self.shared.borrow().motors.iter().map(|m| m.mount).collect()
    }
}

/// Motor handle issued by [`MockHost`].
#[derive(Clone, Debug)]
pub struct MockMotor {
    index: usize,
    shared: Rc<RefCell<Shared>>,
}

impl MockMotor {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl Actuator for MockMotor {
    fn set_power(&mut self, power: f32) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        let motor = shared.motor(self.index)?;
        motor.power = power;
        motor.history.push(power);
        Ok(())
    }
}

/// Sensor handle issued by [`MockHost`].
#[derive(Clone, Debug)]
pub struct MockSensor {
    index: usize,
    shared: Rc<RefCell<Shared>>,
}

impl RangeSensor for MockSensor {
    fn get_distance(&mut self) -> Result<f32> {
        let mut shared = self.shared.borrow_mut();
        let sensor = shared.sensor(self.index)?;
        if let Some(next) = sensor.queued.pop_front() {
            sensor.raw = next;
        }
        Ok(sensor.raw)
    }
}

impl Host for MockHost {
    type Motor = MockMotor;
    type Sensor = MockSensor;

    fn add_motor(&mut self, mount: MotorMount) -> Result<MockMotor> {
        let mut shared = self.shared.borrow_mut();
        if let Some(limit) = shared.motor_limit
            && shared.motors.len() >= limit
        {
            return Err(HostError::motor_rejected(
                mount.label,
                format!("host supports {limit} motors"),
            ));
        }

        let index = shared.motors.len();
        shared.motors.push(MotorState {
            mount,
            power: 0.0,
            history: Vec::new(),
            connected: true,
        });

        Ok(MockMotor {
            index,
            shared: Rc::clone(&self.shared),
        })
    }

    fn sensor(&mut self, index: usize) -> Result<MockSensor> {
        if index >= self.shared.borrow().sensors.len() {
            return Err(HostError::SensorUnavailable { index });
        }
        Ok(MockSensor {
            index,
            shared: Rc::clone(&self.shared),
        })
    }

    fn power_motor(&mut self, power: f32, index: usize) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        let motor = shared.motor(index)?;
        motor.power = power;
        motor.history.push(power);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motors_record_power() {
        let mut host = MockHost::new();
        let mut motor = host
            .add_motor(MotorMount::standard(MotorLabel::FrontLeft))
            .unwrap();
        motor.set_power(0.5).unwrap();
        motor.set_power(-0.25).unwrap();
        assert_eq!(host.motor_power(MotorLabel::FrontLeft), Some(-0.25));
        assert_eq!(host.motor_history(MotorLabel::FrontLeft), vec![0.5, -0.25]);
    }

    #[test]
    fn power_motor_by_index() {
        let mut host = MockHost::new();
        host.add_motor(MotorMount::standard(MotorLabel::FrontRight))
            .unwrap();
        host.power_motor(0.75, 0).unwrap();
        assert_eq!(host.motor_power(MotorLabel::FrontRight), Some(0.75));
        assert_eq!(
            host.power_motor(1.0, 4),
            Err(HostError::MotorUnavailable { index: 4 })
        );
    }

    #[test]
    fn sensor_replays_queue_then_holds() {
        let mut host = MockHost::new();
        let mut sensor = host.sensor(0).unwrap();
        assert_eq!(sensor.get_distance(), Ok(OUT_OF_RANGE));

        host.queue_distances(0, [30.0, 10.0]);
        assert_eq!(sensor.get_distance(), Ok(30.0));
        assert_eq!(sensor.get_distance(), Ok(10.0));
        assert_eq!(sensor.get_distance(), Ok(10.0));
    }

    #[test]
    fn missing_sensor() {
        let mut host = MockHost::with_sensors(0);
        assert_eq!(
            host.sensor(0).unwrap_err(),
            HostError::SensorUnavailable { index: 0 }
        );
    }

    #[test]
    fn motor_limit() {
        let mut host = MockHost::new().with_motor_limit(1);
        host.add_motor(MotorMount::standard(MotorLabel::FrontRight))
            .unwrap();
        let err = host
            .add_motor(MotorMount::standard(MotorLabel::BackRight))
            .unwrap_err();
        assert!(matches!(
            err,
            HostError::MotorRejected {
                label: MotorLabel::BackRight,
                ..
            }
        ));
    }

    #[test]
    fn disconnected_devices_error() {
        let mut host = MockHost::new();
        let mut motor = host
            .add_motor(MotorMount::standard(MotorLabel::BackLeft))
            .unwrap();
        let mut sensor = host.sensor(0).unwrap();

        host.disconnect_motor(MotorLabel::BackLeft);
        host.disconnect_sensor(0);
        assert!(matches!(motor.set_power(1.0), Err(HostError::Disconnected(_))));
        assert!(matches!(sensor.get_distance(), Err(HostError::Disconnected(_))));

        host.reconnect_sensor(0);
        assert!(sensor.get_distance().is_ok());
    }
}
