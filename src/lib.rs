//! # robosim-control
//!
//! Reactive drive behaviors for a four-motor robot with a single forward
//! distance sensor, written against capability traits instead of a concrete
//! simulator.
//!
//! A host hands out motors and sensors through [`Host`]. [`RobotBinding`]
//! attaches the standard drive layout, a [`Behavior`] turns each distance
//! reading into a [`DriveCommand`], and [`Session`] calls it once per tick.
//! [`mock::MockHost`] stands in for the simulator in tests.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod behavior;
pub mod error;
pub mod hardware;
pub mod mock;
pub mod power;
pub mod robot;
pub mod session;
pub mod units;

pub use behavior::*;
pub use error::*;
pub use hardware::*;
pub use power::*;
pub use robot::*;
pub use session::*;
