// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::AssemblyState type.

use std::time::Duration;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::robot_enable::types::AssemblyStateIntern;

/// State of the emergency stop button.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum EstopButton {
    Unpressed,
    Pressed,
    Unknown,
    Released,
}

/// What triggered the last emergency stop.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum EstopSource {
    None,
    User,
    Unknown,
    Fault,
    Brake,
}

/// Describes the enable state of the whole robot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AssemblyState {
    /// Indicates whether the motors are powered and the arms accept commands.
    pub enabled: bool,

    /// Indicates whether the robot was stopped.
    pub stopped: bool,

    /// Indicates whether the robot is in an error state. Requires a
    /// [`reset`](`crate::RobotEnable::reset`).
    pub error: bool,

    pub estop_button: EstopButton,

    pub estop_source: EstopSource,

    /// Strictly monotonically increasing timestamp since bridge start.
    pub time: Duration,
}

impl From<AssemblyStateIntern> for AssemblyState {
    fn from(intern: AssemblyStateIntern) -> Self {
        AssemblyState {
            enabled: intern.enabled,
            stopped: intern.stopped,
            error: intern.error,
            estop_button: intern.estop_button,
            estop_source: intern.estop_source,
            time: Duration::from_millis(intern.message_id as u64),
        }
    }
}
