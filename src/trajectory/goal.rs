// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the goal, waypoint and result types of joint trajectory actions.
use std::time::Duration;

use num_derive::{FromPrimitive, ToPrimitive};
use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::exception::{BaxterException, BaxterResult};

/// Default tolerance on how late the goal may finish relative to the last waypoint.
pub const DEFAULT_GOAL_TIME_TOLERANCE: Duration = Duration::from_millis(100);

/// One timed joint position target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Joint positions, one per joint of the goal. Unit: \[rad\]
    pub positions: Vec<f64>,
    /// Time at which the positions should be reached, relative to the goal stamp.
    pub time_from_start: Duration,
}

/// A joint trajectory for one limb as it is sent to the trajectory action server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointTrajectoryGoal {
    /// Time since the UNIX epoch at which the goal was started. Zero until then.
    pub stamp: Duration,
    pub joint_names: Vec<String>,
    pub points: Vec<Waypoint>,
    pub goal_time_tolerance: Duration,
}

impl JointTrajectoryGoal {
    pub fn new(joint_names: Vec<String>, goal_time_tolerance: Duration) -> Self {
        JointTrajectoryGoal {
            stamp: Duration::from_secs(0),
            joint_names,
            points: Vec::new(),
            goal_time_tolerance,
        }
    }

    /// Checks that the goal can be executed: it has waypoints, every waypoint has one position
    /// per joint and the waypoint times are strictly increasing.
    pub fn validate(&self) -> BaxterResult<()> {
        if self.points.is_empty() {
            return Err(BaxterException::EmptyGoalError);
        }
        for point in &self.points {
            if point.positions.len() != self.joint_names.len() {
                return Err(BaxterException::WaypointSizeError {
                    expected: self.joint_names.len(),
                    actual: point.positions.len(),
                });
            }
        }
        for (index, pair) in self.points.windows(2).enumerate() {
            if pair[1].time_from_start <= pair[0].time_from_start {
                return Err(BaxterException::NonIncreasingTimeError {
                    index: index + 1,
                    previous: pair[0].time_from_start,
                    current: pair[1].time_from_start,
                });
            }
        }
        Ok(())
    }

    /// Time of the last waypoint.
    pub fn duration(&self) -> Duration {
        self.points
            .last()
            .map(|point| point.time_from_start)
            .unwrap_or_default()
    }
}

/// Terminal status of a goal as reported by the action server.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum GoalStatus {
    /// The trajectory was executed.
    Succeeded,
    /// Execution started but failed, see the error code.
    Aborted,
    /// The goal was cancelled while running.
    Preempted,
    /// The server refused the goal without executing it.
    Rejected,
}

/// Error codes of a joint trajectory result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum TrajectoryErrorCode {
    Successful = 0,
    InvalidGoal = -1,
    InvalidJoints = -2,
    OldHeaderTimestamp = -3,
    PathToleranceViolated = -4,
    GoalToleranceViolated = -5,
}

/// Outcome of a finished goal.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryResult {
    pub status: GoalStatus,
    pub error_code: TrajectoryErrorCode,
    /// Human readable explanation, empty on success.
    pub error_string: String,
    /// Joint positions when the goal ended, ordered like the goal's joint names.
    pub final_positions: Vec<f64>,
}

impl TrajectoryResult {
    pub fn is_success(&self) -> bool {
        self.status == GoalStatus::Succeeded && self.error_code == TrajectoryErrorCode::Successful
    }
}

/// Lifecycle of the goal held by a [`TrajectoryClient`](`crate::TrajectoryClient`).
///
/// `Empty -> Building -> Active -> (Cancelling ->) Done`. A
/// [`wait`](`crate::TrajectoryClient::wait`) that times out leaves the goal `Active` or
/// `Cancelling`; [`clear`](`crate::TrajectoryClient::clear`) returns to `Empty` from any state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GoalState {
    /// No waypoints yet.
    Empty,
    /// Waypoints are being added.
    Building,
    /// Sent to the action server, no result yet.
    Active,
    /// Cancellation was acknowledged, no result yet.
    Cancelling,
    /// The server reported a result.
    Done(GoalStatus),
}

impl GoalState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GoalState::Done(_))
    }

    /// True while the goal is with the action server and no result arrived.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GoalState::Active | GoalState::Cancelling)
    }
}
