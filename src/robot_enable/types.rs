// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::robot_enable::assembly_state::{EstopButton, EstopSource};

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u32)]
pub enum RobotCommandEnum {
    Connect,
    Enable,
    Disable,
    Reset,
    Stop,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum Status {
    Success,
    Fail,
    Timeout,
    EmergencyStopped,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct RobotResponse {
    pub status: Status,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct AssemblyStateIntern {
    pub message_id: u32,
    pub enabled: bool,
    pub stopped: bool,
    pub error: bool,
    pub estop_button: EstopButton,
    pub estop_source: EstopSource,
}

impl Default for AssemblyStateIntern {
    fn default() -> Self {
        AssemblyStateIntern {
            message_id: 0,
            enabled: false,
            stopped: false,
            error: false,
            estop_button: EstopButton::Unpressed,
            estop_source: EstopSource::None,
        }
    }
}
