//! Error types for host interaction.

use crate::robot::MotorLabel;
use thiserror::Error;

/// Errors reported while talking to the host simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host refused to attach a motor.
    #[error("host rejected motor {label}: {reason}")]
    MotorRejected {
        /// Which drive motor was being attached.
        label: MotorLabel,
        /// Reason given by the host.
        reason: String,
    },

    /// No sensor is installed at the requested index.
    #[error("no sensor at index {index}")]
    SensorUnavailable {
        /// The requested sensor index.
        index: usize,
    },

    /// No motor has been added at the requested index.
    #[error("no motor at index {index}")]
    MotorUnavailable {
        /// The requested motor index.
        index: usize,
    },

    /// A previously acquired device stopped responding.
    #[error("device disconnected: {0}")]
    Disconnected(String),
}

impl HostError {
    /// Creates a motor rejection error.
    #[must_use]
    pub fn motor_rejected(label: MotorLabel, reason: impl Into<String>) -> Self {
        Self::MotorRejected {
            label,
            reason: reason.into(),
        }
    }

    /// Creates a disconnection error.
    #[must_use]
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected(device.into())
    }
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_motor_rejected() {
        let err = HostError::motor_rejected(MotorLabel::BackLeft, "port busy");
        let msg = format!("{err}");
        assert!(msg.contains("back-left"));
        assert!(msg.contains("port busy"));
    }

    #[test]
    fn error_sensor_unavailable() {
        let err = HostError::SensorUnavailable { index: 3 };
        assert_eq!(format!("{err}"), "no sensor at index 3");
    }

    #[test]
    fn error_disconnected() {
        let err = HostError::disconnected("distance sensor");
        assert!(format!("{err}").contains("distance sensor"));
    }
}
