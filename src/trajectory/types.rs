// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::trajectory::goal::{GoalStatus, JointTrajectoryGoal};

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u32)]
pub enum ActionCommandEnum {
    Connect,
    SendGoal,
    CancelGoal,
}

/// The reply to a SendGoal request is a [`GoalResultResponse`], sent once the goal ended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SendGoalRequest {
    pub goal: JointTrajectoryGoal,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct CancelGoalRequest {
    /// Command ID of the SendGoal request to cancel.
    pub goal_id: u32,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum CancelStatus {
    Accepted,
    NoActiveGoal,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct CancelGoalResponse {
    pub status: CancelStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GoalResultResponse {
    pub status: GoalStatus,
    pub error_code: i32,
    pub error_string: String,
    pub actual_positions: Vec<f64>,
}
