// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! A local stand-in for the robot bridge used by the unit tests.
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mockall::automock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::BridgeConfig;
use crate::network::DeviceData;
use crate::service_types::{
    ConnectRequest, ConnectResponse, ConnectStatus, Message, COMMAND_HEADER_SIZE,
};

#[automock]
pub(crate) trait ServerReaction {
    fn process_received_bytes(&self, bytes: &mut Vec<u8>) -> Vec<u8>;
    fn number_of_reactions(&self) -> usize;
}

pub(crate) struct MockBridge<Data: DeviceData> {
    listener: TcpListener,
    endpoint: String,
    server_version: u16,
    state_messages: Vec<Vec<u8>>,
    device: PhantomData<Data>,
}

impl<Data: DeviceData> MockBridge<Data> {
    pub fn new(endpoint: &str, server_version: u16) -> Self {
        MockBridge {
            listener: TcpListener::bind("127.0.0.1:0").unwrap(),
            endpoint: endpoint.to_string(),
            server_version,
            state_messages: Vec::new(),
            device: PhantomData,
        }
    }

    /// State messages which are streamed round-robin to the client's UDP port.
    pub fn with_state_messages<T: Serialize>(mut self, messages: &[T]) -> Self {
        self.state_messages = messages
            .iter()
            .map(|message| bincode::serialize(message).unwrap())
            .collect();
        self
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig::default()
            .with_port(self.listener.local_addr().unwrap().port())
            .with_connect_timeout(Duration::from_secs(2))
            .with_response_timeout(Duration::from_secs(2))
    }

    pub fn server_thread(self, reaction: &mut MockServerReaction) {
        let (mut tcp_socket, _remote_address) = self.listener.accept().unwrap();
        tcp_socket.set_nodelay(true).unwrap();

        let request = read_message(&mut tcp_socket).unwrap();
        let request: Message<Data::CommandEnum, ConnectRequest> = decode(&request);
        let status = if request.body.endpoint != self.endpoint {
            ConnectStatus::UnknownEndpoint
        } else if request.body.version != self.server_version {
            ConnectStatus::IncompatibleLibraryVersion
        } else {
            ConnectStatus::Success
        };
        tcp_socket
            .write_all(&response(
                Data::connect_command(),
                request.header.command_id,
                ConnectResponse {
                    status,
                    version: self.server_version,
                },
            ))
            .unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let udp_thread = if self.state_messages.is_empty() {
            None
        } else {
            let udp_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
            udp_socket
                .connect(("127.0.0.1", request.body.udp_port))
                .unwrap();
            let messages = self.state_messages;
            let running = running.clone();
            Some(std::thread::spawn(move || {
                let mut counter = 0;
                while running.load(Ordering::SeqCst) {
                    let bytes = &messages[counter % messages.len()];
                    if udp_socket.send(bytes).is_err() {
                        return;
                    }
                    counter += 1;
                    std::thread::sleep(Duration::from_millis(5));
                }
            }))
        };

        for _ in 0..reaction.number_of_reactions() {
            let mut bytes = read_message(&mut tcp_socket).unwrap();
            let response = reaction.process_received_bytes(&mut bytes);
            tcp_socket.write_all(&response).unwrap();
        }
        // keep the connection open until the client hangs up
        while read_message(&mut tcp_socket).is_some() {}
        running.store(false, Ordering::SeqCst);
        if let Some(thread) = udp_thread {
            thread.join().unwrap();
        }
    }
}

/// Reads one framed message, or returns None once the peer closed the connection.
pub(crate) fn read_message(tcp_socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut bytes = vec![0_u8; COMMAND_HEADER_SIZE];
    tcp_socket.read_exact(&mut bytes).ok()?;
    let size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let mut body = vec![0_u8; size - COMMAND_HEADER_SIZE];
    tcp_socket.read_exact(&mut body).ok()?;
    bytes.append(&mut body);
    Some(bytes)
}

pub(crate) fn decode<C: DeserializeOwned, T: DeserializeOwned>(bytes: &[u8]) -> Message<C, T> {
    bincode::deserialize(bytes).unwrap()
}

pub(crate) fn response<C: Serialize, T: Serialize>(command: C, command_id: u32, body: T) -> Vec<u8> {
    Message::new(command, command_id, body)
        .unwrap()
        .to_bytes()
        .unwrap()
}
