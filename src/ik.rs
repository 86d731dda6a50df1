// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::IkService type and the inverse kinematics request and solution types.

use std::time::Duration;

use nalgebra::Isometry3;
use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};
use tracing::debug;

use crate::config::BridgeConfig;
use crate::exception::{BaxterException, BaxterResult};
use crate::ik::types::{IkCommandEnum, IkStatus, PoseStampedIntern, SolveRequest, SolveResponse};
use crate::limb::Side;
use crate::network::{DeviceData, Network};
use crate::utils::now_stamp;

pub(crate) mod types;

/// How long [`IkService::new`] waits for the solver by default.
pub const IK_SERVICE_TIMEOUT: Duration = Duration::from_secs(5);

/// A pose of the end effector expressed in the frame `frame_id`, e.g. "base".
#[derive(Debug, Clone, PartialEq)]
pub struct PoseStamped {
    pub frame_id: String,
    pub stamp: Duration,
    pub pose: Isometry3<f64>,
}

impl PoseStamped {
    /// Creates a pose stamped with the current time.
    pub fn new(frame_id: &str, pose: Isometry3<f64>) -> Self {
        PoseStamped {
            frame_id: frame_id.to_string(),
            stamp: now_stamp(),
            pose,
        }
    }
}

/// Named joint positions. \[rad\]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct JointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
}

impl JointState {
    pub fn new(names: Vec<String>, positions: Vec<f64>) -> Self {
        JointState { names, positions }
    }

    /// Positions reordered to `joint_names`.
    /// # Errors
    /// * [`UnknownJointError`](`crate::exception::BaxterException::UnknownJointError`) if a joint of `joint_names` is missing.
    pub fn positions_for(&self, joint_names: &[String]) -> BaxterResult<Vec<f64>> {
        joint_names
            .iter()
            .map(|joint| {
                self.names
                    .iter()
                    .position(|name| name == joint)
                    .and_then(|index| self.positions.get(index).copied())
                    .ok_or_else(|| BaxterException::UnknownJointError {
                        name: joint.clone(),
                    })
            })
            .collect()
    }
}

/// Which seed led the solver to a solution.
#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SeedType {
    /// No solution was found.
    None,
    /// The seed passed with the request.
    User,
    /// The current joint angles.
    Current,
    /// The solver's null space map.
    NsMap,
}

/// Poses to solve for, optionally with one seed configuration per pose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IkRequest {
    pub poses: Vec<PoseStamped>,
    pub seeds: Vec<JointState>,
}

impl IkRequest {
    pub fn new() -> Self {
        IkRequest::default()
    }

    pub fn with_pose(mut self, pose: PoseStamped) -> Self {
        self.poses.push(pose);
        self
    }

    pub fn with_seed(mut self, seed: JointState) -> Self {
        self.seeds.push(seed);
        self
    }
}

/// Joint solution for one requested pose.
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution {
    pub joints: JointState,
    pub seed_type: SeedType,
}

impl IkSolution {
    /// Joint positions ordered like `joint_names`, ready to be used as a waypoint.
    pub fn positions_for(&self, joint_names: &[String]) -> BaxterResult<Vec<f64>> {
        self.joints.positions_for(joint_names)
    }
}

/// Client of the position inverse kinematics solver of one arm.
///
/// ```no_run
/// use baxter::{pose_from_parts, quaternion_from_euler, IkRequest, IkService, PoseStamped, Side};
/// use std::f64::consts::PI;
/// # fn main() -> baxter::BaxterResult<()> {
/// let mut ik = IkService::new("localhost", Side::Right, None)?;
/// let down = quaternion_from_euler(PI, 0., PI / 2.);
/// let request = IkRequest::new()
///     .with_pose(PoseStamped::new("base", pose_from_parts([0.6, -0.4, 0.1], down)));
/// let solutions = ik.solve(&request)?;
/// let waypoint = solutions[0].positions_for(&Side::Right.joint_names())?;
/// # Ok(())
/// # }
/// ```
pub struct IkService {
    network: Network<IkData>,
    side: Side,
}

impl IkService {
    /// Waits for the solver of the arm on `side`, by default at most [`IK_SERVICE_TIMEOUT`].
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the solver does not become ready in time.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`) if this version of libbaxter-rs is not supported
    pub fn new(bridge_address: &str, side: Side, config: Option<BridgeConfig>) -> BaxterResult<IkService> {
        let config = config
            .unwrap_or_else(|| BridgeConfig::default().with_connect_timeout(IK_SERVICE_TIMEOUT));
        let endpoint = format!("ExternalTools/{}/PositionKinematicsNode/IKService", side);
        Ok(IkService {
            network: Network::new(bridge_address, &endpoint, &config)?,
            side,
        })
    }

    /// Solves for one joint configuration per requested pose.
    /// # Errors
    /// * [`ServiceException`](`crate::exception::BaxterException::ServiceException`) if the request is malformed,
    /// the solver does not answer in time or any pose has no valid solution.
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost.
    /// # Return
    /// Solutions in the order of the requested poses.
    pub fn solve(&mut self, request: &IkRequest) -> BaxterResult<Vec<IkSolution>> {
        if request.poses.is_empty() {
            return Err(self.service_exception("request contains no poses".to_string()));
        }
        if !request.seeds.is_empty() && request.seeds.len() != request.poses.len() {
            return Err(self.service_exception(format!(
                "{} seeds given for {} poses",
                request.seeds.len(),
                request.poses.len()
            )));
        }
        let solve_request = SolveRequest {
            poses: request.poses.iter().map(PoseStampedIntern::from).collect(),
            seeds: request.seeds.clone(),
        };
        let command_id = self
            .network
            .tcp_send_request(IkCommandEnum::Solve, solve_request)?;
        let timeout = self.network.response_timeout();
        let response: SolveResponse =
            match self.network.tcp_receive_response_timeout(command_id, timeout)? {
                Some(response) => response,
                None => {
                    self.network.discard_response(command_id);
                    return Err(self.service_exception(format!("no reply within {:?}", timeout)));
                }
            };
        self.into_solutions(response, request.poses.len())
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn server_version(&self) -> u16 {
        self.network.server_version()
    }

    fn into_solutions(
        &self,
        response: SolveResponse,
        number_of_poses: usize,
    ) -> BaxterResult<Vec<IkSolution>> {
        if response.status != IkStatus::Success {
            return Err(self.service_exception("solver rejected the request".to_string()));
        }
        if response.joints.len() != number_of_poses || response.is_valid.len() != number_of_poses
        {
            return Err(self.service_exception(format!(
                "{} solutions for {} poses",
                response.joints.len(),
                number_of_poses
            )));
        }
        if let Some(index) = response.is_valid.iter().position(|valid| !valid) {
            return Err(self.service_exception(format!("no valid joint solution for pose {}", index)));
        }
        let seed_types = response.seed_type;
        let solutions: Vec<IkSolution> = response
            .joints
            .into_iter()
            .enumerate()
            .map(|(index, joints)| IkSolution {
                joints,
                seed_type: seed_types.get(index).copied().unwrap_or(SeedType::None),
            })
            .collect();
        debug!(
            limb = %self.side,
            seeds = ?solutions.iter().map(|solution| solution.seed_type).collect::<Vec<_>>(),
            "inverse kinematics solved"
        );
        Ok(solutions)
    }

    fn service_exception(&self, message: String) -> BaxterException {
        BaxterException::ServiceException {
            service: self.network.endpoint().to_string(),
            message,
        }
    }
}

pub(crate) struct IkData {}

impl DeviceData for IkData {
    type CommandEnum = IkCommandEnum;

    fn connect_command() -> Self::CommandEnum {
        IkCommandEnum::Connect
    }
}
