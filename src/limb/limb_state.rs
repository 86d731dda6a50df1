// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::LimbState type.

use std::time::Duration;

use crate::exception::{BaxterException, BaxterResult};
use crate::limb::types::JointStateIntern;

/// Describes the measured state of one limb. All vectors are ordered like
/// [`Limb::joint_names`](`crate::Limb::joint_names`).
#[derive(Debug, Clone, PartialEq)]
pub struct LimbState {
    /// Names of the joints.
    pub joint_names: Vec<String>,

    /// Measured joint positions. Unit: \[rad\]
    pub positions: Vec<f64>,

    /// Measured joint velocities. Unit: \[rad/s\]
    pub velocities: Vec<f64>,

    /// Measured joint torques. Unit: \[Nm\]
    pub efforts: Vec<f64>,

    /// Strictly monotonically increasing timestamp since bridge start.
    pub time: Duration,
}

impl LimbState {
    /// Picks the joints of `joint_names` out of a joint state message.
    pub(crate) fn from_intern(
        intern: &JointStateIntern,
        joint_names: &[String],
    ) -> BaxterResult<LimbState> {
        if intern.position.len() != intern.name.len() {
            return Err(BaxterException::NetworkException {
                message: format!(
                    "libbaxter-rs: joint state has {} names but {} positions",
                    intern.name.len(),
                    intern.position.len()
                ),
            });
        }
        let mut positions = Vec::with_capacity(joint_names.len());
        let mut velocities = Vec::with_capacity(joint_names.len());
        let mut efforts = Vec::with_capacity(joint_names.len());
        for joint in joint_names {
            let index = intern
                .name
                .iter()
                .position(|name| name == joint)
                .ok_or_else(|| BaxterException::NetworkException {
                    message: format!("libbaxter-rs: joint state lacks joint {}", joint),
                })?;
            positions.push(intern.position[index]);
            velocities.push(intern.velocity.get(index).copied().unwrap_or(0.));
            efforts.push(intern.effort.get(index).copied().unwrap_or(0.));
        }
        Ok(LimbState {
            joint_names: joint_names.to_vec(),
            positions,
            velocities,
            efforts,
            time: Duration::from_millis(intern.message_id as u64),
        })
    }

    /// Position of the joint called `name`.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.joint_names
            .iter()
            .position(|joint| joint == name)
            .map(|index| self.positions[index])
    }
}
