// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

extern crate nix;

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::io::{ErrorKind, Read, Write};
use std::marker::PhantomData;
use std::net::TcpStream as StdTcpStream;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::os::unix::io::AsRawFd;
use std::str::FromStr;
use std::time::{Duration, Instant};

use mio::net::{TcpStream, UdpSocket};
use mio::{Events, Interest, Poll, Token};

use nix::sys::socket::setsockopt;
use nix::sys::socket::sockopt::{KeepAlive, TcpKeepCount, TcpKeepIdle, TcpKeepInterval};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::exception::{create_network_exception, BaxterException, BaxterResult};
use crate::service_types::{
    CommandHeader, ConnectRequest, ConnectResponse, ConnectStatus, Message, COMMAND_HEADER_SIZE,
    PROTOCOL_VERSION,
};

const CLIENT: Token = Token(1);
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(100);
const MAX_UDP_MESSAGE_SIZE: usize = 65507;

/// Describes the command set of one kind of bridge endpoint.
pub(crate) trait DeviceData {
    type CommandEnum: Serialize + DeserializeOwned + Debug + Copy;
    fn connect_command() -> Self::CommandEnum;
}

/// Connection to one bridge endpoint: a TCP channel for commands and their replies and a
/// UDP socket on which the bridge streams state messages.
pub(crate) struct Network<Data: DeviceData> {
    endpoint: String,
    tcp_socket: TcpStream,
    udp_socket: UdpSocket,
    udp_port: u16,
    udp_timeout: Duration,
    response_timeout: Duration,
    command_id: u32,
    server_version: u16,
    pending_response: Vec<u8>,
    received_responses: HashMap<u32, Vec<u8>>,
    discarded_responses: HashSet<u32>,
    poll_read: Poll,
    events: Events,
    poll_read_udp: Poll,
    events_udp: Events,
    device: PhantomData<Data>,
}

impl<Data: DeviceData> Network<Data> {
    /// Connects to `endpoint` on the bridge at `bridge_address` and performs the handshake.
    ///
    /// Refused connections are retried until `config.connect_timeout` has passed, so the
    /// bridge may still be starting up when this is called.
    ///
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the endpoint
    /// is not ready within the timeout or unknown to the bridge.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`)
    /// if the bridge speaks another protocol version.
    pub fn new(
        bridge_address: &str,
        endpoint: &str,
        config: &BridgeConfig,
    ) -> BaxterResult<Network<Data>> {
        let deadline = Instant::now() + config.connect_timeout;
        let setup_error = |message: String| BaxterException::SetupException {
            endpoint: endpoint.to_string(),
            message,
        };
        let address_str: String = format!("{}:{}", bridge_address, config.port);
        let sock_address = address_str
            .to_socket_addrs()
            .map_err(|e| setup_error(e.to_string()))?
            .next()
            .ok_or_else(|| setup_error(format!("could not resolve {}", address_str)))?;
        let std_socket = connect_until(sock_address, deadline).map_err(setup_error)?;
        std_socket
            .set_nodelay(true)
            .map_err(create_network_exception)?;
        std_socket
            .set_nonblocking(true)
            .map_err(create_network_exception)?;
        let mut tcp_socket = TcpStream::from_std(std_socket);
        let fd = tcp_socket.as_raw_fd();

        setsockopt(fd, KeepAlive, &true).map_err(create_network_exception)?;
        setsockopt(fd, TcpKeepIdle, &1).map_err(create_network_exception)?;
        setsockopt(fd, TcpKeepCount, &3).map_err(create_network_exception)?;
        setsockopt(fd, TcpKeepInterval, &1).map_err(create_network_exception)?;

        let ip_addr = IpAddr::from_str("0.0.0.0").map_err(create_network_exception)?;
        let mut udp_socket =
            UdpSocket::bind(SocketAddr::new(ip_addr, 0)).map_err(create_network_exception)?;
        let udp_port = udp_socket
            .local_addr()
            .map_err(create_network_exception)?
            .port();

        let poll_read = Poll::new().map_err(create_network_exception)?;
        poll_read
            .registry()
            .register(&mut tcp_socket, CLIENT, Interest::READABLE)
            .map_err(create_network_exception)?;
        let poll_read_udp = Poll::new().map_err(create_network_exception)?;
        poll_read_udp
            .registry()
            .register(&mut udp_socket, CLIENT, Interest::READABLE)
            .map_err(create_network_exception)?;

        let mut network = Network {
            endpoint: endpoint.to_string(),
            tcp_socket,
            udp_socket,
            udp_port,
            udp_timeout: config.udp_timeout,
            response_timeout: config.response_timeout,
            command_id: 0,
            server_version: 0,
            pending_response: Vec::new(),
            received_responses: HashMap::new(),
            discarded_responses: HashSet::new(),
            poll_read,
            events: Events::with_capacity(128),
            poll_read_udp,
            events_udp: Events::with_capacity(1),
            device: PhantomData,
        };
        network.connect_endpoint(deadline)?;
        info!(
            endpoint = %network.endpoint,
            server_version = network.server_version,
            "connected to bridge endpoint"
        );
        Ok(network)
    }

    fn connect_endpoint(&mut self, deadline: Instant) -> BaxterResult<()> {
        let request = ConnectRequest::new(self.udp_port, &self.endpoint);
        let command_id = self.tcp_send_request(Data::connect_command(), request)?;
        let response: ConnectResponse = match self.tcp_receive_response_until(command_id, deadline)?
        {
            Some(response) => response,
            None => {
                return Err(BaxterException::SetupException {
                    endpoint: self.endpoint.clone(),
                    message: "timed out waiting for the handshake".to_string(),
                })
            }
        };
        match response.status {
            ConnectStatus::Success => {
                self.server_version = response.version;
                Ok(())
            }
            ConnectStatus::IncompatibleLibraryVersion => {
                Err(BaxterException::IncompatibleLibraryVersionError {
                    server_version: response.version,
                    library_version: PROTOCOL_VERSION,
                })
            }
            ConnectStatus::UnknownEndpoint => Err(BaxterException::SetupException {
                endpoint: self.endpoint.clone(),
                message: "the bridge does not provide this endpoint".to_string(),
            }),
        }
    }

    /// Sends a request and returns its command ID without waiting for the reply.
    pub fn tcp_send_request<T: Serialize>(
        &mut self,
        command: Data::CommandEnum,
        request: T,
    ) -> BaxterResult<u32> {
        let command_id = self.command_id;
        self.command_id = self.command_id.wrapping_add(1);
        let bytes = Message::new(command, command_id, request)?.to_bytes()?;
        self.tcp_write_all(&bytes)?;
        debug!(
            endpoint = %self.endpoint,
            ?command,
            command_id,
            size = bytes.len(),
            "sent request"
        );
        Ok(command_id)
    }

    /// Blocks until a Response message with the given command ID has been received and returns
    /// its body.
    ///
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if no
    /// reply arrives within the response timeout or the connection is lost.
    pub fn tcp_blocking_receive_response<T: DeserializeOwned>(
        &mut self,
        command_id: u32,
    ) -> BaxterResult<T> {
        let timeout = self.response_timeout;
        self.tcp_receive_response_timeout(command_id, timeout)?
            .ok_or_else(|| BaxterException::NetworkException {
                message: format!(
                    "libbaxter-rs: no reply from {} within {:?}",
                    self.endpoint, timeout
                ),
            })
    }

    /// Waits at most `timeout` for the Response message with the given command ID.
    ///
    /// # Return
    /// * `Some(body)` - if the reply arrived in time
    /// * `None` - if the timeout elapsed first
    pub fn tcp_receive_response_timeout<T: DeserializeOwned>(
        &mut self,
        command_id: u32,
        timeout: Duration,
    ) -> BaxterResult<Option<T>> {
        self.tcp_receive_response_until(command_id, Instant::now() + timeout)
    }

    fn tcp_receive_response_until<T: DeserializeOwned>(
        &mut self,
        command_id: u32,
        deadline: Instant,
    ) -> BaxterResult<Option<T>> {
        match self.wait_for_response_to_arrive(command_id, deadline)? {
            Some(bytes) => {
                let message: Message<Data::CommandEnum, T> = deserialize(&bytes)?;
                Ok(Some(message.body))
            }
            None => Ok(None),
        }
    }

    /// Drops the reply to `command_id`, whether it already arrived or arrives later.
    pub fn discard_response(&mut self, command_id: u32) {
        if self.received_responses.remove(&command_id).is_none() {
            self.discarded_responses.insert(command_id);
        }
    }

    fn wait_for_response_to_arrive(
        &mut self,
        command_id: u32,
        deadline: Instant,
    ) -> BaxterResult<Option<Vec<u8>>> {
        loop {
            if let Some(bytes) = self.received_responses.remove(&command_id) {
                return Ok(Some(bytes));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            if !self.tcp_read_from_buffer(deadline - now)? {
                return match self.received_responses.remove(&command_id) {
                    Some(bytes) => Ok(Some(bytes)),
                    None => Err(BaxterException::NetworkException {
                        message: format!(
                            "libbaxter-rs: connection to {} closed by the bridge",
                            self.endpoint
                        ),
                    }),
                };
            }
        }
    }

    /// Reads everything available on the TCP socket, waiting at most `timeout` for data, and
    /// moves complete messages into the mailbox. Returns false once the bridge closed the
    /// connection.
    fn tcp_read_from_buffer(&mut self, timeout: Duration) -> BaxterResult<bool> {
        self.poll_read
            .poll(&mut self.events, Some(timeout))
            .map_err(create_network_exception)?;
        let mut connected = true;
        let mut buffer = [0_u8; 4096];
        loop {
            match self.tcp_socket.read(&mut buffer) {
                Ok(0) => {
                    connected = false;
                    break;
                }
                Ok(read_bytes) => self.pending_response.extend_from_slice(&buffer[..read_bytes]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(create_network_exception(e)),
            }
        }
        self.split_pending_responses()?;
        Ok(connected)
    }

    fn split_pending_responses(&mut self) -> BaxterResult<()> {
        while self.pending_response.len() >= COMMAND_HEADER_SIZE {
            let header: CommandHeader<Data::CommandEnum> =
                deserialize(&self.pending_response[..COMMAND_HEADER_SIZE])?;
            let size = header.size as usize;
            if size < COMMAND_HEADER_SIZE {
                return Err(BaxterException::NetworkException {
                    message: format!("libbaxter-rs: invalid TCP message size {}", size),
                });
            }
            if self.pending_response.len() < size {
                break;
            }
            let rest = self.pending_response.split_off(size);
            let message = std::mem::replace(&mut self.pending_response, rest);
            if self.discarded_responses.remove(&header.command_id) {
                debug!(
                    endpoint = %self.endpoint,
                    command_id = header.command_id,
                    "dropped discarded reply"
                );
                continue;
            }
            if self
                .received_responses
                .insert(header.command_id, message)
                .is_some()
            {
                warn!(
                    endpoint = %self.endpoint,
                    command_id = header.command_id,
                    "reply overwrote an unread reply with the same command id"
                );
            }
        }
        Ok(())
    }

    fn tcp_write_all(&mut self, mut bytes: &[u8]) -> BaxterResult<()> {
        let deadline = Instant::now() + self.response_timeout;
        while !bytes.is_empty() {
            match self.tcp_socket.write(bytes) {
                Ok(0) => {
                    return Err(BaxterException::NetworkException {
                        message: "libbaxter-rs: TCP request could not be sent".to_string(),
                    })
                }
                Ok(written) => bytes = &bytes[written..],
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(BaxterException::NetworkException {
                            message: "libbaxter-rs: TCP send: timeout".to_string(),
                        });
                    }
                    std::thread::yield_now();
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(create_network_exception(e)),
            }
        }
        Ok(())
    }

    /// Takes one state message from the UDP socket if one is available (non-blocking).
    pub fn udp_receive<T: DeserializeOwned>(&mut self) -> BaxterResult<Option<T>> {
        let mut buffer = vec![0_u8; MAX_UDP_MESSAGE_SIZE];
        match self.udp_socket.recv_from(&mut buffer) {
            Ok((read_bytes, _address)) => Ok(Some(deserialize(&buffer[..read_bytes])?)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(create_network_exception(e)),
        }
    }

    /// Waits for state messages and returns the newest one.
    ///
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if no
    /// message arrives within the UDP timeout.
    pub fn udp_blocking_receive<T: DeserializeOwned>(&mut self) -> BaxterResult<T> {
        let deadline = Instant::now() + self.udp_timeout;
        loop {
            let mut latest = None;
            while let Some(message) = self.udp_receive::<T>()? {
                latest = Some(message);
            }
            if let Some(message) = latest {
                return Ok(message);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BaxterException::NetworkException {
                    message: "libbaxter-rs: UDP receive: timeout".to_string(),
                });
            }
            self.poll_read_udp
                .poll(&mut self.events_udp, Some(deadline - now))
                .map_err(create_network_exception)?;
        }
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    pub fn server_version(&self) -> u16 {
        self.server_version
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(test)]
    pub fn number_of_unread_replies(&self) -> usize {
        self.received_responses.len()
    }
}

fn connect_until(address: SocketAddr, deadline: Instant) -> Result<StdTcpStream, String> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining == Duration::from_secs(0) {
            return Err(format!("timed out connecting to {}", address));
        }
        match StdTcpStream::connect_timeout(&address, remaining) {
            Ok(socket) => return Ok(socket),
            Err(e) => {
                if Instant::now() + CONNECT_RETRY_INTERVAL >= deadline {
                    return Err(format!("timed out connecting to {}: {}", address, e));
                }
                debug!(%address, error = %e, "bridge not reachable yet");
                std::thread::sleep(CONNECT_RETRY_INTERVAL);
            }
        }
    }
}

fn deserialize<T: DeserializeOwned>(encoded: &[u8]) -> BaxterResult<T> {
    bincode::deserialize(encoded).map_err(create_network_exception)
}
