// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::GripperState type.

use crate::gripper::types::GripperStateIntern;
use std::time::Duration;

/// Describes the gripper state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GripperState {
    /// Current finger position, 0 is closed and 100 fully open. Unit: \[%\].
    pub position: f64,

    /// Current gripping force in percent of the maximum force. Unit: \[%\].
    pub force: f64,

    /// Indicates whether the gripper was calibrated since power up.
    ///
    /// See [`Gripper::calibrate()`](`crate::Gripper::calibrate`)
    pub calibrated: bool,

    /// Indicates whether the gripper accepts commands.
    pub ready: bool,

    /// Indicates whether the fingers are moving.
    pub moving: bool,

    /// Indicates whether an object is currently gripped.
    pub gripping: bool,

    /// Indicates whether the gripper is in an error state.
    pub error: bool,

    /// Strictly monotonically increasing timestamp since bridge start.
    pub time: Duration,
}

impl From<GripperStateIntern> for GripperState {
    fn from(intern: GripperStateIntern) -> Self {
        GripperState {
            position: intern.position,
            force: intern.force,
            calibrated: intern.calibrated,
            ready: intern.ready,
            moving: intern.moving,
            gripping: intern.gripping,
            error: intern.error,
            time: Duration::from_millis(intern.message_id as u64),
        }
    }
}
