// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! contains useful conversion functions.
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Creates an orientation from static-axis roll, pitch and yaw angles: first a rotation of
/// `roll` about x, then `pitch` about y, then `yaw` about z. \[rad\]
///
/// ```
/// use baxter::quaternion_from_euler;
/// use std::f64::consts::PI;
/// // gripper pointing down
/// let orientation = quaternion_from_euler(PI, 0., PI / 2.);
/// let q = orientation.quaternion();
/// assert!((q.i.abs() - 0.5_f64.sqrt()).abs() < 1e-12);
/// assert!((q.j.abs() - 0.5_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

/// Builds a pose from a position \[m\] and an orientation.
pub fn pose_from_parts(position: [f64; 3], orientation: UnitQuaternion<f64>) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::new(position[0], position[1], position[2]),
        orientation,
    )
}

/// Time since the UNIX epoch, used to stamp goals and requests.
pub(crate) fn now_stamp() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
