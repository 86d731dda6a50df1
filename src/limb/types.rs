// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u32)]
pub enum LimbCommandEnum {
    Connect,
}

/// Joint state message as streamed by the bridge. The joints may come in any order and may
/// include joints of other limbs; `velocity` and `effort` may be empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct JointStateIntern {
    pub message_id: u32,
    pub name: Vec<String>,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub effort: Vec<f64>,
}
