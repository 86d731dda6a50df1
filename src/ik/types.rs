// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::ik::{JointState, PoseStamped, SeedType};

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u32)]
pub enum IkCommandEnum {
    Connect,
    Solve,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum IkStatus {
    Success,
    InvalidRequest,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PoseStampedIntern {
    pub frame_id: String,
    pub stamp: Duration,
    pub position: [f64; 3],
    /// x, y, z, w
    pub orientation: [f64; 4],
}

impl From<&PoseStamped> for PoseStampedIntern {
    fn from(pose: &PoseStamped) -> Self {
        let translation = pose.pose.translation.vector;
        let quaternion = pose.pose.rotation.quaternion();
        PoseStampedIntern {
            frame_id: pose.frame_id.clone(),
            stamp: pose.stamp,
            position: [translation.x, translation.y, translation.z],
            orientation: [quaternion.i, quaternion.j, quaternion.k, quaternion.w],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolveRequest {
    pub poses: Vec<PoseStampedIntern>,
    pub seeds: Vec<JointState>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolveResponse {
    pub status: IkStatus,
    pub joints: Vec<JointState>,
    pub is_valid: Vec<bool>,
    pub seed_type: Vec<SeedType>,
}
