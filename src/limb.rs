// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::Side and baxter::Limb types.

use std::fmt;
use std::str::FromStr;

use crate::config::BridgeConfig;
use crate::exception::{BaxterException, BaxterResult};
use crate::limb::limb_state::LimbState;
use crate::limb::types::{JointStateIntern, LimbCommandEnum};
use crate::network::{DeviceData, Network};

pub mod limb_state;
pub(crate) mod types;

/// Joints of one arm from shoulder to wrist, in the order the controllers expect them.
pub const JOINTS: [&str; 7] = ["s0", "s1", "e0", "e1", "w0", "w1", "w2"];

/// Identifies one of the two arms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Ordered joint names of this arm, e.g. `right_s0` .. `right_w2`.
    ///
    /// ```
    /// use baxter::Side;
    /// let names = Side::Right.joint_names();
    /// assert_eq!(names.len(), 7);
    /// assert_eq!(names[0], "right_s0");
    /// assert_eq!(names[6], "right_w2");
    /// ```
    pub fn joint_names(&self) -> Vec<String> {
        JOINTS
            .iter()
            .map(|joint| format!("{}_{}", self.name(), joint))
            .collect()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Side {
    type Err = BaxterException;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(BaxterException::UnknownLimbError {
                name: s.to_string(),
            }),
        }
    }
}

/// Provides the measured joint state of one arm.
pub struct Limb {
    network: Network<LimbData>,
    side: Side,
    joint_names: Vec<String>,
}

impl Limb {
    /// Subscribes to the joint states of the arm on `side`.
    /// # Arguments
    /// * `bridge_address` - IP/hostname of the robot bridge.
    /// * `side` - which arm.
    /// * `config` - connection parameters, defaults if None.
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the endpoint does not become ready in time.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`) if this version of libbaxter-rs is not supported
    pub fn new(bridge_address: &str, side: Side, config: Option<BridgeConfig>) -> BaxterResult<Limb> {
        let config = config.unwrap_or_default();
        let endpoint = format!("robot/limb/{}/joint_states", side);
        Ok(Limb {
            network: Network::new(bridge_address, &endpoint, &config)?,
            side,
            joint_names: side.joint_names(),
        })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// Waits for a joint state update and returns it.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if no state arrives, e.g. after a timeout.
    pub fn read_once(&mut self) -> BaxterResult<LimbState> {
        while self.network.udp_receive::<JointStateIntern>()?.is_some() {}
        let intern = self.network.udp_blocking_receive::<JointStateIntern>()?;
        LimbState::from_intern(&intern, &self.joint_names)
    }

    /// Current joint positions, ordered like [`joint_names`](`Self::joint_names`).
    pub fn joint_angles(&mut self) -> BaxterResult<Vec<f64>> {
        Ok(self.read_once()?.positions)
    }

    /// Current position of a single joint.
    /// # Errors
    /// * [`UnknownJointError`](`crate::exception::BaxterException::UnknownJointError`) if `name` is not a joint of this arm.
    pub fn joint_angle(&mut self, name: &str) -> BaxterResult<f64> {
        if !self.joint_names.iter().any(|joint| joint == name) {
            return Err(BaxterException::UnknownJointError {
                name: name.to_string(),
            });
        }
        self.read_once()?
            .position(name)
            .ok_or_else(|| BaxterException::UnknownJointError {
                name: name.to_string(),
            })
    }

    pub fn server_version(&self) -> u16 {
        self.network.server_version()
    }
}

pub(crate) struct LimbData {}

impl DeviceData for LimbData {
    type CommandEnum = LimbCommandEnum;

    fn connect_command() -> Self::CommandEnum {
        LimbCommandEnum::Connect
    }
}
