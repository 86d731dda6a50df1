// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u32)]
pub enum GripperCommandEnum {
    Connect,
    Calibrate,
    Move,
    Stop,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum Status {
    Success,
    Fail,
    Unsuccessful,
    Aborted,
    NotCalibrated,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct MoveRequest {
    /// Finger position in percent of the opening range.
    pub position: f64,
}

impl MoveRequest {
    pub fn new(position: f64) -> Self {
        MoveRequest { position }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct GripperResponse {
    pub status: Status,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct GripperStateIntern {
    pub message_id: u32,
    pub position: f64,
    pub force: f64,
    pub calibrated: bool,
    pub ready: bool,
    pub moving: bool,
    pub gripping: bool,
    pub error: bool,
}
