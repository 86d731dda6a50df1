// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use serde::Deserialize;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::exception::{create_network_exception, BaxterResult};

pub static PROTOCOL_VERSION: u16 = 1;

/// Encoded size of a [`CommandHeader`]: three little endian u32.
pub const COMMAND_HEADER_SIZE: usize = 12;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct CommandHeader<C> {
    pub command: C,
    pub command_id: u32,
    /// Size of the whole message including this header.
    pub size: u32,
}

impl<C> CommandHeader<C> {
    pub fn new(command: C, command_id: u32, size: u32) -> CommandHeader<C> {
        CommandHeader {
            command,
            command_id,
            size,
        }
    }
}

/// A request or response body prefixed by its command header.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message<C, T> {
    pub header: CommandHeader<C>,
    pub body: T,
}

impl<C: Serialize, T: Serialize> Message<C, T> {
    /// Wraps `body` and fills in the message size.
    pub fn new(command: C, command_id: u32, body: T) -> BaxterResult<Message<C, T>> {
        let body_size = bincode::serialized_size(&body).map_err(create_network_exception)?;
        Ok(Message {
            header: CommandHeader::new(
                command,
                command_id,
                (COMMAND_HEADER_SIZE as u64 + body_size) as u32,
            ),
            body,
        })
    }

    pub fn to_bytes(&self) -> BaxterResult<Vec<u8>> {
        bincode::serialize(self).map_err(create_network_exception)
    }
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum ConnectStatus {
    Success,
    IncompatibleLibraryVersion,
    UnknownEndpoint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectRequest {
    pub version: u16,
    pub udp_port: u16,
    pub endpoint: String,
}

impl ConnectRequest {
    pub fn new(udp_port: u16, endpoint: &str) -> Self {
        ConnectRequest {
            version: PROTOCOL_VERSION,
            udp_port,
            endpoint: endpoint.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct ConnectResponse {
    pub status: ConnectStatus,
    pub version: u16,
}
