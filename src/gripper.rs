// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//!  Contains the baxter::Gripper type.

use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::exception::{create_command_exception, BaxterResult};
use crate::gripper::gripper_state::GripperState;
use crate::gripper::types::{
    GripperCommandEnum, GripperResponse, GripperStateIntern, MoveRequest, Status,
};
use crate::limb::Side;
use crate::network::{DeviceData, Network};

pub mod gripper_state;
pub(crate) mod types;

/// Finger position of a fully closed gripper. \[%\]
pub const CLOSED_POSITION: f64 = 0.;
/// Finger position of a fully open gripper. \[%\]
pub const OPEN_POSITION: f64 = 100.;

/// Maintains a connection to the gripper of one arm, provides the current gripper state,
/// and allows the execution of commands.
pub struct Gripper {
    network: Network<GripperData>,
    side: Side,
}

impl Gripper {
    ///  Establishes a connection with the gripper mounted on the arm on `side`.
    /// # Arguments
    /// * `bridge_address` - IP/hostname of the robot bridge.
    /// * `side` - arm the gripper is mounted on.
    /// * `config` - connection parameters, defaults if None.
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the gripper endpoint does not become ready in time.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`) if this version of libbaxter-rs is not supported
    pub fn new(bridge_address: &str, side: Side, config: Option<BridgeConfig>) -> BaxterResult<Gripper> {
        let config = config.unwrap_or_default();
        let endpoint = format!("robot/end_effector/{}_gripper", side);
        Ok(Gripper {
            network: Network::new(bridge_address, &endpoint, &config)?,
            side,
        })
    }

    /// Calibrates the gripper.
    ///
    /// After power up, a calibration needs to be done before the fingers can be positioned.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost, e.g. after a timeout.
    /// * [`CommandException`](`crate::exception::BaxterException::CommandException`) if an error occurred
    /// # Return
    /// True if command was successful, false otherwise.
    pub fn calibrate(&mut self) -> BaxterResult<bool> {
        self.execute(GripperCommandEnum::Calibrate, ())
    }

    /// Opens the gripper fully.
    /// # Errors
    /// See [`command_position`](`Self::command_position`)
    pub fn open(&mut self) -> BaxterResult<bool> {
        self.command_position(OPEN_POSITION)
    }

    /// Closes the gripper fully, gripping whatever is between the fingers.
    /// # Errors
    /// See [`command_position`](`Self::command_position`)
    pub fn close(&mut self) -> BaxterResult<bool> {
        self.command_position(CLOSED_POSITION)
    }

    /// Moves the fingers to a position.
    /// # Arguments
    /// * `position` - intended position between 0 (closed) and 100 (open). \[%\]
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost, e.g. after a timeout.
    /// * [`CommandException`](`crate::exception::BaxterException::CommandException`) if the position is out of range, the gripper is not calibrated or an error occurred
    /// # Return
    /// True if command was successful, false otherwise.
    pub fn command_position(&mut self, position: f64) -> BaxterResult<bool> {
        if !(CLOSED_POSITION..=OPEN_POSITION).contains(&position) {
            return Err(create_command_exception(
                "libbaxter-rs gripper: position must be between 0 and 100!",
            ));
        }
        self.execute(GripperCommandEnum::Move, MoveRequest::new(position))
    }

    /// Stops a currently running gripper move.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost, e.g. after a timeout.
    /// * [`CommandException`](`crate::exception::BaxterException::CommandException`) if an error occurred
    /// # Return
    /// True if command was successful, false otherwise.
    pub fn stop(&mut self) -> BaxterResult<bool> {
        self.execute(GripperCommandEnum::Stop, ())
    }

    /// Waits for a gripper state update and returns it.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost, e.g. after a timeout.
    /// # Return
    ///  Current gripper state.
    pub fn read_once(&mut self) -> BaxterResult<GripperState> {
        while self.network.udp_receive::<GripperStateIntern>()?.is_some() {}
        Ok(self
            .network
            .udp_blocking_receive::<GripperStateIntern>()?
            .into())
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the protocol version reported by the bridge.
    pub fn server_version(&self) -> u16 {
        self.network.server_version()
    }

    fn execute<T: serde::Serialize>(
        &mut self,
        command: GripperCommandEnum,
        request: T,
    ) -> BaxterResult<bool> {
        let command_id: u32 = self.network.tcp_send_request(command, request)?;
        let response: GripperResponse = self.network.tcp_blocking_receive_response(command_id)?;
        debug!(gripper = %self.side, ?command, status = ?response.status, "gripper replied");
        handle_response_status(&response.status)
    }
}

fn handle_response_status(status: &Status) -> BaxterResult<bool> {
    match status {
        Status::Success => Ok(true),
        Status::Fail => Err(create_command_exception(
            "libbaxter-rs gripper: Command failed!",
        )),
        Status::Unsuccessful => {
            warn!("gripper command was unsuccessful");
            Ok(false)
        }
        Status::Aborted => Err(create_command_exception(
            "libbaxter-rs gripper: Command aborted!",
        )),
        Status::NotCalibrated => Err(create_command_exception(
            "libbaxter-rs gripper: Gripper is not calibrated!",
        )),
    }
}

pub(crate) struct GripperData {}

impl DeviceData for GripperData {
    type CommandEnum = GripperCommandEnum;

    fn connect_command() -> Self::CommandEnum {
        GripperCommandEnum::Connect
    }
}
