// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains exception and Result definitions
use std::time::Duration;

use thiserror::Error;

use crate::trajectory::goal::GoalState;

/// Represents all kind of errors which can occur while talking to the robot bridge.
#[derive(Error, Debug)]
pub enum BaxterException {
    /// SetupException is returned if an endpoint does not become ready within the connect timeout.
    /// Nothing can be commanded without the endpoint, so callers usually terminate.
    #[error("Endpoint {endpoint:?} not ready: {message}")]
    SetupException {
        /// Name of the endpoint, e.g. `robot/limb/right/follow_joint_trajectory`.
        endpoint: String,
        /// Explanatory string.
        message: String,
    },

    /// IncompatibleLibraryVersionError is returned if the bridge does not support this version of libbaxter-rs.
    #[error("Incompatible library version: Bridge has version {server_version:?} and libbaxter-rs has {library_version:?}")]
    IncompatibleLibraryVersionError {
        /// Bridge protocol version.
        server_version: u16,
        /// libbaxter-rs protocol version.
        library_version: u16,
    },

    /// WaypointSizeError is returned if a waypoint does not have one position per joint.
    #[error("Waypoint has {actual} positions but the limb has {expected} joints")]
    WaypointSizeError { expected: usize, actual: usize },

    /// NonIncreasingTimeError is returned if the waypoint times of a goal are not strictly increasing.
    #[error("Waypoint {index} starts at {current:?} which is not after the previous waypoint at {previous:?}")]
    NonIncreasingTimeError {
        index: usize,
        previous: Duration,
        current: Duration,
    },

    /// EmptyGoalError is returned when trying to start a goal without waypoints.
    #[error("Trying to start a trajectory goal without waypoints!")]
    EmptyGoalError,

    /// GoalStateError is returned if an operation is not allowed in the current goal state,
    /// e.g. adding waypoints to a goal which is already running.
    #[error("Cannot {operation} while the goal is {state:?}")]
    GoalStateError {
        operation: &'static str,
        state: GoalState,
    },

    /// UnknownJointError is returned when asking for a joint which does not belong to the limb.
    #[error("Unknown joint {name:?}")]
    UnknownJointError { name: String },

    /// UnknownLimbError is returned when parsing a limb name other than "left" or "right".
    #[error("Unknown limb {name:?}, expected \"left\" or \"right\"")]
    UnknownLimbError { name: String },

    /// ServiceException is returned if a service call fails or returns no usable answer.
    #[error("Service {service:?} failed: {message}")]
    ServiceException { service: String, message: String },

    /// NetworkException is returned if the connection to the bridge is lost, or when a timeout occurs.
    #[error("{message:?}")]
    NetworkException { message: String },

    /// CommandException is returned if an error occurs during command execution.
    #[error("{message:?}")]
    CommandException { message: String },
}

/// creates a CommandException from a static string slice
pub(crate) fn create_command_exception(message: &'static str) -> BaxterException {
    BaxterException::CommandException {
        message: message.to_string(),
    }
}

/// creates a NetworkException from any displayable error
pub(crate) fn create_network_exception<E: ToString>(error: E) -> BaxterException {
    BaxterException::NetworkException {
        message: error.to_string(),
    }
}

/// Result type which can have BaxterException as Error
pub type BaxterResult<T> = Result<T, BaxterException>;
