// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::RobotEnable type.

use tracing::info;

use crate::config::BridgeConfig;
use crate::exception::{create_command_exception, BaxterResult};
use crate::network::{DeviceData, Network};
use crate::robot_enable::assembly_state::AssemblyState;
use crate::robot_enable::types::{AssemblyStateIntern, RobotCommandEnum, RobotResponse, Status};

pub mod assembly_state;
pub(crate) mod types;

/// Controls whether the robot's motors are enabled.
///
/// The arms only follow trajectories while the robot is enabled.
pub struct RobotEnable {
    network: Network<RobotData>,
}

impl RobotEnable {
    /// Connects to the robot state endpoint of the bridge.
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the endpoint does not become ready in time.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`) if this version of libbaxter-rs is not supported
    pub fn new(bridge_address: &str, config: Option<BridgeConfig>) -> BaxterResult<RobotEnable> {
        let config = config.unwrap_or_default();
        Ok(RobotEnable {
            network: Network::new(bridge_address, "robot/state", &config)?,
        })
    }

    /// Enables the robot and blocks until the bridge confirms it.
    /// # Errors
    /// * [`CommandException`](`crate::exception::BaxterException::CommandException`) if the robot could not be enabled, e.g. because the emergency stop is pressed.
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost, e.g. after a timeout.
    pub fn enable(&mut self) -> BaxterResult<()> {
        self.execute(RobotCommandEnum::Enable)
    }

    /// Disables the robot. The arms go limp.
    /// # Errors
    /// See [`enable`](`Self::enable`)
    pub fn disable(&mut self) -> BaxterResult<()> {
        self.execute(RobotCommandEnum::Disable)
    }

    /// Clears an error state, leaving the robot disabled.
    /// # Errors
    /// See [`enable`](`Self::enable`)
    pub fn reset(&mut self) -> BaxterResult<()> {
        self.execute(RobotCommandEnum::Reset)
    }

    /// Stops the robot like the emergency stop button does.
    /// # Errors
    /// See [`enable`](`Self::enable`)
    pub fn stop(&mut self) -> BaxterResult<()> {
        self.execute(RobotCommandEnum::Stop)
    }

    /// Waits for a robot state update and returns it.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if no state arrives, e.g. after a timeout.
    pub fn state(&mut self) -> BaxterResult<AssemblyState> {
        while self.network.udp_receive::<AssemblyStateIntern>()?.is_some() {}
        Ok(self
            .network
            .udp_blocking_receive::<AssemblyStateIntern>()?
            .into())
    }

    pub fn server_version(&self) -> u16 {
        self.network.server_version()
    }

    fn execute(&mut self, command: RobotCommandEnum) -> BaxterResult<()> {
        let command_id: u32 = self.network.tcp_send_request(command, ())?;
        let response: RobotResponse = self.network.tcp_blocking_receive_response(command_id)?;
        handle_response_status(&response.status)?;
        info!(?command, "robot state changed");
        Ok(())
    }
}

fn handle_response_status(status: &Status) -> BaxterResult<()> {
    match status {
        Status::Success => Ok(()),
        Status::Fail => Err(create_command_exception(
            "libbaxter-rs robot: Command failed!",
        )),
        Status::Timeout => Err(create_command_exception(
            "libbaxter-rs robot: Robot did not reach the requested state in time!",
        )),
        Status::EmergencyStopped => Err(create_command_exception(
            "libbaxter-rs robot: Emergency stop is active!",
        )),
    }
}

pub(crate) struct RobotData {}

impl DeviceData for RobotData {
    type CommandEnum = RobotCommandEnum;

    fn connect_command() -> Self::CommandEnum {
        RobotCommandEnum::Connect
    }
}
