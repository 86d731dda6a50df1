// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! # libbaxter-rs
//! libbaxter-rs is a library to drive the arms of a [Baxter](https://sdk.rethinkrobotics.com/wiki/Home)
//! research robot through its robot bridge.
//!
//! **ALWAYS HAVE THE EMERGENCY STOP BUTTON AT
//! HAND WHILE COMMANDING THE ROBOT!**
//!
//! ## Design
//! Every robot endpoint is reached through its own client, each holding one connection to the
//! bridge:
//! * [trajectory](`crate::trajectory`) - executes joint trajectories on one arm. This is the
//! heart of the library.
//! * [limb](`crate::limb`) - identifies the arms and reads their joint states.
//! * [gripper](`crate::gripper`) - calibrates, opens and closes the grippers.
//! * [ik](`crate::ik`) - asks the inverse kinematics solver for joint configurations.
//! * [robot_enable](`crate::robot_enable`) - enables and disables the motors.
//!
//! Clients take `&mut self` for every operation, so a client is used by one thread at a time.
//! Connection parameters are passed as an optional [`BridgeConfig`], `None` selects the
//! defaults.
//!
//! # Example:
//!```no_run
//! use std::time::Duration;
//! use baxter::{BaxterResult, Limb, RobotEnable, Side, TrajectoryClient};
//! fn main() -> BaxterResult<()> {
//!     let mut robot = RobotEnable::new("baxter.local", None)?;
//!     robot.enable()?;
//!     let mut limb = Limb::new("baxter.local", Side::Right, None)?;
//!     let mut trajectory = TrajectoryClient::new("baxter.local", Side::Right, None)?;
//!     let current = limb.joint_angles()?;
//!     let mut target = current.clone();
//!     target[3] += 0.2;
//!     trajectory.add_point(&current, Duration::from_secs(0))?;
//!     trajectory.add_point(&target, Duration::from_secs(2))?;
//!     trajectory.start()?;
//!     trajectory.wait(Duration::from_secs(4))?;
//!     println!("{:?}", trajectory.result());
//!     Ok(())
//! }
//!   ```
//!
//! The main function returns a BaxterResult<()> which means that it returns either Ok(())
//! or an Error of type BaxterException.
//!
//! A goal is built with repeated calls to
//! [`add_point`](`crate::TrajectoryClient::add_point`), handed to the arm with
//! [`start`](`crate::TrajectoryClient::start`) which returns immediately, and awaited with
//! [`wait`](`crate::TrajectoryClient::wait`). `wait` never fails because of its timeout: check
//! [`state`](`crate::TrajectoryClient::state`) or
//! [`result`](`crate::TrajectoryClient::result`) afterwards. Before the next goal is built,
//! the client needs to be [`clear`](`crate::TrajectoryClient::clear`)ed.
//!
//! Logging goes through the [`tracing`](https://docs.rs/tracing) macros; install a subscriber
//! to see it.

pub mod config;
pub mod exception;
pub mod gripper;
pub mod ik;
pub mod limb;
mod network;
pub mod robot_enable;
pub(crate) mod service_types;
pub mod trajectory;
pub mod utils;

#[cfg(test)]
mod mock_server;

pub use config::BridgeConfig;
pub use exception::{BaxterException, BaxterResult};
pub use gripper::gripper_state::GripperState;
pub use gripper::Gripper;
pub use ik::{IkRequest, IkService, IkSolution, JointState, PoseStamped, SeedType};
pub use limb::limb_state::LimbState;
pub use limb::{Limb, Side};
pub use robot_enable::assembly_state::AssemblyState;
pub use robot_enable::RobotEnable;
pub use trajectory::goal::{
    GoalState, GoalStatus, JointTrajectoryGoal, TrajectoryErrorCode, TrajectoryResult, Waypoint,
};
pub use trajectory::TrajectoryClient;
pub use utils::*;
