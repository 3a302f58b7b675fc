// tests/robot_binding.rs
use approx::assert_relative_eq;
use glam::Vec2;
use robosim_control::mock::MockHost;
use robosim_control::{DistanceReading, HostError, MotorLabel, RobotBinding};

#[test]
fn test_binds_standard_layout() {
    let mut host = MockHost::new();
    let robot = RobotBinding::bind(&mut host).unwrap();

    // Motors are attached right side first, front before back.
    let mounts = host.mounts();
    let labels: Vec<MotorLabel> = mounts.iter().map(|m| m.label).collect();
    assert_eq!(labels, MotorLabel::ATTACH_ORDER.to_vec());

    // 18" robot = 45 px; 40% of that is 18 px from center on each axis.
    let expected = [
        Vec2::new(18.0, 18.0),
        Vec2::new(18.0, -18.0),
        Vec2::new(-18.0, 18.0),
        Vec2::new(-18.0, -18.0),
    ];
    for (mount, want) in mounts.iter().zip(expected) {
        assert_relative_eq!(mount.offset.x, want.x, epsilon = 1e-5);
        assert_relative_eq!(mount.offset.y, want.y, epsilon = 1e-5);
    }

    assert_eq!(robot.front_right.index(), 0);
    assert_eq!(robot.back_left.index(), 3);
}

#[test]
fn test_bind_fails_without_sensor() {
    let mut host = MockHost::with_sensors(0);
    let err = RobotBinding::bind(&mut host).unwrap_err();
    assert_eq!(err, HostError::SensorUnavailable { index: 0 });
}

#[test]
fn test_bind_fails_when_motor_rejected() {
    let mut host = MockHost::new().with_motor_limit(3);
    let err = RobotBinding::bind(&mut host).unwrap_err();
    assert!(matches!(
        err,
        HostError::MotorRejected {
            label: MotorLabel::BackLeft,
            ..
        }
    ));
}

#[test]
fn test_drive_and_rotate() {
    let mut host = MockHost::new();
    let mut robot = RobotBinding::bind(&mut host).unwrap();

    robot.drive(0.05).unwrap();
    for label in MotorLabel::ATTACH_ORDER {
        assert_relative_eq!(host.motor_power(label).unwrap(), 0.1);
    }

    robot.rotate(0.6).unwrap();
    assert_relative_eq!(host.motor_power(MotorLabel::FrontRight).unwrap(), 0.6);
    assert_relative_eq!(host.motor_power(MotorLabel::BackRight).unwrap(), 0.6);
    assert_relative_eq!(host.motor_power(MotorLabel::FrontLeft).unwrap(), -0.6);
    assert_relative_eq!(host.motor_power(MotorLabel::BackLeft).unwrap(), -0.6);

    robot.drive(-3.0).unwrap();
    for label in MotorLabel::ATTACH_ORDER {
        assert_relative_eq!(host.motor_power(label).unwrap(), -1.0);
    }
}

#[test]
fn test_read_distance_maps_sentinel() {
    let mut host = MockHost::new();
    let mut robot = RobotBinding::bind(&mut host).unwrap();

    assert_eq!(robot.read_distance().unwrap(), DistanceReading::OutOfRange);
    host.set_distance(0, 42.0);
    assert_eq!(robot.read_distance().unwrap(), DistanceReading::Detected(42.0));
}
