// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the baxter::TrajectoryClient type.

use std::time::Duration;

use num_traits::FromPrimitive;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::exception::{BaxterException, BaxterResult};
use crate::limb::Side;
use crate::network::{DeviceData, Network};
use crate::trajectory::goal::{
    GoalState, JointTrajectoryGoal, TrajectoryErrorCode, TrajectoryResult, Waypoint,
    DEFAULT_GOAL_TIME_TOLERANCE,
};
use crate::trajectory::types::{
    ActionCommandEnum, CancelGoalRequest, CancelGoalResponse, CancelStatus, GoalResultResponse,
    SendGoalRequest,
};
use crate::utils::now_stamp;

pub mod goal;
pub(crate) mod types;

/// Executes joint trajectories on one arm through the joint trajectory action server of the
/// bridge.
///
/// A client holds at most one goal. It is built with [`add_point`](`Self::add_point`), handed
/// to the server with [`start`](`Self::start`), awaited with [`wait`](`Self::wait`) and
/// discarded with [`clear`](`Self::clear`) before the next goal is built.
///
/// ```no_run
/// use baxter::{BaxterResult, Side, TrajectoryClient};
/// use std::time::Duration;
/// fn main() -> BaxterResult<()> {
///     let mut trajectory = TrajectoryClient::new("localhost", Side::Right, None)?;
///     trajectory.add_point(&[0.; 7], Duration::from_secs(0))?;
///     trajectory.add_point(&[0.1, -0.5, 0., 1., 0., 0.5, 0.], Duration::from_secs(3))?;
///     trajectory.start()?;
///     trajectory.wait(Duration::from_secs(6))?;
///     println!("{:?}", trajectory.result());
///     Ok(())
/// }
/// ```
pub struct TrajectoryClient {
    network: Network<ActionData>,
    side: Side,
    goal: JointTrajectoryGoal,
    goal_time_tolerance: Duration,
    state: GoalState,
    goal_id: Option<u32>,
    result: Option<TrajectoryResult>,
}

impl TrajectoryClient {
    /// Connects to the trajectory action server of the arm on `side`.
    ///
    /// Blocks until the server accepted the connection, at most `config.connect_timeout`
    /// (10 s by default).
    /// # Errors
    /// * [`SetupException`](`crate::exception::BaxterException::SetupException`) if the action server does not become ready in time.
    /// * [`IncompatibleLibraryVersionError`](`crate::exception::BaxterException::IncompatibleLibraryVersionError`) if this version of libbaxter-rs is not supported
    pub fn new(
        bridge_address: &str,
        side: Side,
        config: Option<BridgeConfig>,
    ) -> BaxterResult<TrajectoryClient> {
        let config = config.unwrap_or_default();
        let endpoint = format!("robot/limb/{}/follow_joint_trajectory", side);
        let network = Network::new(bridge_address, &endpoint, &config)?;
        let mut client = TrajectoryClient {
            network,
            side,
            goal: JointTrajectoryGoal::new(Vec::new(), DEFAULT_GOAL_TIME_TOLERANCE),
            goal_time_tolerance: DEFAULT_GOAL_TIME_TOLERANCE,
            state: GoalState::Empty,
            goal_id: None,
            result: None,
        };
        client.clear(side);
        Ok(client)
    }

    /// Appends a waypoint to the goal.
    /// # Arguments
    /// * `positions` - one position per joint, ordered like [`joint_names`](`Self::joint_names`). \[rad\]
    /// * `time_from_start` - when the positions should be reached.
    /// # Errors
    /// * [`WaypointSizeError`](`crate::exception::BaxterException::WaypointSizeError`) if the number of positions does not match the number of joints.
    /// * [`GoalStateError`](`crate::exception::BaxterException::GoalStateError`) if the goal was already started.
    pub fn add_point(&mut self, positions: &[f64], time_from_start: Duration) -> BaxterResult<()> {
        match self.state {
            GoalState::Empty | GoalState::Building => {}
            state => {
                return Err(BaxterException::GoalStateError {
                    operation: "add a waypoint",
                    state,
                })
            }
        }
        if positions.len() != self.goal.joint_names.len() {
            return Err(BaxterException::WaypointSizeError {
                expected: self.goal.joint_names.len(),
                actual: positions.len(),
            });
        }
        self.goal.points.push(Waypoint {
            positions: positions.to_vec(),
            time_from_start,
        });
        self.state = GoalState::Building;
        Ok(())
    }

    /// Stamps the goal with the current time and hands it to the action server. Returns as
    /// soon as the goal is sent.
    /// # Errors
    /// * [`EmptyGoalError`](`crate::exception::BaxterException::EmptyGoalError`) if no waypoint was added.
    /// * [`NonIncreasingTimeError`](`crate::exception::BaxterException::NonIncreasingTimeError`) if the waypoint times are not strictly increasing.
    /// * [`GoalStateError`](`crate::exception::BaxterException::GoalStateError`) if the goal was already started and not cleared since.
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the goal could not be sent.
    pub fn start(&mut self) -> BaxterResult<()> {
        match self.state {
            GoalState::Empty => return Err(BaxterException::EmptyGoalError),
            GoalState::Building => {}
            state => {
                return Err(BaxterException::GoalStateError {
                    operation: "start the goal",
                    state,
                })
            }
        }
        self.goal.validate()?;
        self.goal.stamp = now_stamp();
        let goal_id = self.network.tcp_send_request(
            ActionCommandEnum::SendGoal,
            SendGoalRequest {
                goal: self.goal.clone(),
            },
        )?;
        self.goal_id = Some(goal_id);
        self.state = GoalState::Active;
        info!(
            limb = %self.side,
            goal_id,
            waypoints = self.goal.points.len(),
            duration = ?self.goal.duration(),
            "started trajectory goal"
        );
        Ok(())
    }

    /// Asks the action server to cancel the running goal. The arm may not halt instantly;
    /// the goal's result arrives through [`wait`](`Self::wait`).
    ///
    /// Does nothing if no goal is running.
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the server does not acknowledge the request
    /// within the response timeout. The goal stays active.
    pub fn stop(&mut self) -> BaxterResult<()> {
        let goal_id = match (self.state, self.goal_id) {
            (GoalState::Active, Some(goal_id)) => goal_id,
            (state, _) => {
                debug!(limb = %self.side, ?state, "no running goal to cancel");
                return Ok(());
            }
        };
        let command_id = self
            .network
            .tcp_send_request(ActionCommandEnum::CancelGoal, CancelGoalRequest { goal_id })?;
        let timeout = self.network.response_timeout();
        let response: CancelGoalResponse =
            match self.network.tcp_receive_response_timeout(command_id, timeout)? {
                Some(response) => response,
                None => {
                    self.network.discard_response(command_id);
                    return Err(BaxterException::NetworkException {
                        message: format!(
                            "libbaxter-rs: cancel of goal {} not acknowledged within {:?}",
                            goal_id, timeout
                        ),
                    });
                }
            };
        match response.status {
            CancelStatus::Accepted => {
                self.state = GoalState::Cancelling;
                info!(limb = %self.side, goal_id, "cancelling trajectory goal");
            }
            CancelStatus::NoActiveGoal => {
                debug!(limb = %self.side, goal_id, "goal ended before it could be cancelled");
            }
        }
        Ok(())
    }

    /// Blocks until the action server reports the result of the running goal or `timeout`
    /// elapsed, whichever comes first. Returns immediately if no goal is running.
    ///
    /// Returning does not mean the goal finished: check [`state`](`Self::state`) or
    /// [`result`](`Self::result`).
    /// # Errors
    /// * [`NetworkException`](`crate::exception::BaxterException::NetworkException`) if the connection is lost or the
    /// result carries an unknown error code. In the latter case the goal is still done.
    pub fn wait(&mut self, timeout: Duration) -> BaxterResult<()> {
        let goal_id = match self.goal_id {
            Some(goal_id) if self.state.is_in_flight() => goal_id,
            _ => return Ok(()),
        };
        match self
            .network
            .tcp_receive_response_timeout::<GoalResultResponse>(goal_id, timeout)?
        {
            Some(response) => {
                // the server is done with the goal even if its result cannot be decoded
                self.state = GoalState::Done(response.status);
                self.goal_id = None;
                let result = into_result(response)?;
                if result.is_success() {
                    info!(limb = %self.side, goal_id, "trajectory goal succeeded");
                } else {
                    warn!(
                        limb = %self.side,
                        goal_id,
                        status = ?result.status,
                        error_code = ?result.error_code,
                        error = %result.error_string,
                        "trajectory goal did not succeed"
                    );
                }
                self.result = Some(result);
            }
            None => {
                debug!(limb = %self.side, goal_id, ?timeout, "goal still running after wait");
            }
        }
        Ok(())
    }

    /// Result of the last goal, None until the action server reported one.
    pub fn result(&self) -> Option<&TrajectoryResult> {
        self.result.as_ref()
    }

    /// Discards the goal and starts an empty one for the joints of `side`. A running goal is
    /// not cancelled, its result is ignored.
    pub fn clear(&mut self, side: Side) {
        if let (true, Some(goal_id)) = (self.state.is_in_flight(), self.goal_id) {
            warn!(limb = %self.side, goal_id, "clearing a running goal, its result will be ignored");
            self.network.discard_response(goal_id);
        }
        if side != self.side {
            warn!(
                connected = %self.side,
                requested = %side,
                "goal uses the joints of the other limb"
            );
        }
        self.goal = JointTrajectoryGoal::new(side.joint_names(), self.goal_time_tolerance);
        self.state = GoalState::Empty;
        self.goal_id = None;
        self.result = None;
    }

    /// Sets how late the goal may finish relative to its last waypoint. Applies to the goal
    /// being built and to all later goals.
    pub fn set_goal_time_tolerance(&mut self, tolerance: Duration) {
        self.goal_time_tolerance = tolerance;
        if !self.state.is_in_flight() && !self.state.is_terminal() {
            self.goal.goal_time_tolerance = tolerance;
        }
    }

    pub fn joint_names(&self) -> &[String] {
        &self.goal.joint_names
    }

    pub fn goal(&self) -> &JointTrajectoryGoal {
        &self.goal
    }

    pub fn state(&self) -> GoalState {
        self.state
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the protocol version reported by the bridge.
    pub fn server_version(&self) -> u16 {
        self.network.server_version()
    }
}

fn into_result(response: GoalResultResponse) -> BaxterResult<TrajectoryResult> {
    let error_code = TrajectoryErrorCode::from_i32(response.error_code).ok_or_else(|| {
        BaxterException::NetworkException {
            message: format!(
                "libbaxter-rs: unknown trajectory error code {}",
                response.error_code
            ),
        }
    })?;
    Ok(TrajectoryResult {
        status: response.status,
        error_code,
        error_string: response.error_string,
        final_positions: response.actual_positions,
    })
}

pub(crate) struct ActionData {}

impl DeviceData for ActionData {
    type CommandEnum = ActionCommandEnum;

    fn connect_command() -> Self::CommandEnum {
        ActionCommandEnum::Connect
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::exception::BaxterException;
    use crate::limb::Side;
    use crate::mock_server::{decode, response, MockBridge, MockServerReaction};
    use crate::service_types::{Message, PROTOCOL_VERSION};
    use crate::trajectory::goal::{GoalState, GoalStatus, TrajectoryErrorCode};
    use crate::trajectory::types::{
        ActionCommandEnum, CancelGoalRequest, CancelGoalResponse, CancelStatus,
        GoalResultResponse, SendGoalRequest,
    };
    use crate::trajectory::{ActionData, TrajectoryClient};

    const ENDPOINT: &str = "robot/limb/right/follow_joint_trajectory";

    const CURRENT: [f64; 7] = [0.0, -0.55, 0.0, 0.75, 0.0, 1.26, 0.0];
    const SOLUTION_A: [f64; 7] = [0.3, -0.4, 0.1, 1.2, -0.1, 0.8, 0.2];
    const SOLUTION_B: [f64; 7] = [0.3, -0.2, 0.1, 1.4, -0.1, 0.4, 0.2];

    fn result_bytes(goal_id: u32, status: GoalStatus, error_code: i32) -> Vec<u8> {
        response(
            ActionCommandEnum::SendGoal,
            goal_id,
            GoalResultResponse {
                status,
                error_code,
                error_string: String::new(),
                actual_positions: SOLUTION_B.to_vec(),
            },
        )
    }

    fn spawn_bridge<F>(number_of_reactions: usize, reaction: F) -> (std::thread::JoinHandle<()>, crate::BridgeConfig)
    where
        F: FnMut(&mut Vec<u8>) -> Vec<u8> + Send + 'static,
    {
        let bridge = MockBridge::<ActionData>::new(ENDPOINT, PROTOCOL_VERSION);
        let config = bridge.config();
        let thread = std::thread::spawn(move || {
            let mut mock = MockServerReaction::default();
            mock.expect_process_received_bytes()
                .returning(reaction)
                .times(number_of_reactions);
            mock.expect_number_of_reactions()
                .return_const(number_of_reactions);
            bridge.server_thread(&mut mock);
        });
        (thread, config)
    }

    #[test]
    fn pick_trajectory_end_to_end() {
        let (thread, config) = spawn_bridge(1, |bytes: &mut Vec<u8>| -> Vec<u8> {
            let request: Message<ActionCommandEnum, SendGoalRequest> = decode(bytes);
            assert_eq!(request.header.command, ActionCommandEnum::SendGoal);
            let goal = request.body.goal;
            assert_eq!(goal.joint_names, Side::Right.joint_names());
            assert_eq!(goal.points.len(), 3);
            assert_eq!(goal.points[0].positions, CURRENT.to_vec());
            assert_eq!(goal.points[1].positions, SOLUTION_A.to_vec());
            assert_eq!(goal.points[2].positions, SOLUTION_B.to_vec());
            assert_eq!(goal.points[2].time_from_start, Duration::from_secs(6));
            assert_eq!(goal.goal_time_tolerance, Duration::from_millis(100));
            assert!(goal.stamp > Duration::from_secs(0));
            std::thread::sleep(Duration::from_millis(20));
            result_bytes(request.header.command_id, GoalStatus::Succeeded, 0)
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            assert_eq!(trajectory.server_version(), PROTOCOL_VERSION);
            assert_eq!(trajectory.state(), GoalState::Empty);
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.add_point(&SOLUTION_B, Duration::from_secs(6)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Building);
            trajectory.start().unwrap();
            assert_eq!(trajectory.state(), GoalState::Active);
            assert!(trajectory.result().is_none());

            let start = Instant::now();
            trajectory.wait(Duration::from_secs(12)).unwrap();
            assert!(start.elapsed() < Duration::from_secs(2));
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Succeeded));
            let result = trajectory.result().unwrap();
            assert!(result.is_success());
            assert_eq!(result.error_code, TrajectoryErrorCode::Successful);
            assert_eq!(result.final_positions, SOLUTION_B.to_vec());
        }
        thread.join().unwrap();
    }

    #[test]
    fn waypoint_size_is_checked() {
        let (thread, config) = spawn_bridge(0, |_bytes: &mut Vec<u8>| Vec::new());
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            match trajectory.add_point(&[0.; 6], Duration::from_secs(1)) {
                Err(BaxterException::WaypointSizeError { expected, actual }) => {
                    assert_eq!(expected, 7);
                    assert_eq!(actual, 6);
                }
                other => panic!("Expected waypoint size error but found {:?}", other),
            }
            assert!(trajectory.goal().points.is_empty());
            assert_eq!(trajectory.state(), GoalState::Empty);
            assert!(trajectory.add_point(&[0.; 8], Duration::from_secs(1)).is_err());
        }
        thread.join().unwrap();
    }

    #[test]
    fn goal_is_validated_before_sending() {
        let (thread, config) = spawn_bridge(0, |_bytes: &mut Vec<u8>| Vec::new());
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            assert!(matches!(
                trajectory.start(),
                Err(BaxterException::EmptyGoalError)
            ));
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory
                .add_point(&SOLUTION_A, Duration::from_millis(2500))
                .unwrap();
            trajectory.add_point(&SOLUTION_B, Duration::from_secs(2)).unwrap();
            match trajectory.start() {
                Err(BaxterException::NonIncreasingTimeError { index, .. }) => assert_eq!(index, 2),
                other => panic!("Expected non increasing time but found {:?}", other),
            }
            assert_eq!(trajectory.state(), GoalState::Building);
        }
        thread.join().unwrap();
    }

    #[test]
    fn start_twice_is_rejected() {
        let (thread, config) = spawn_bridge(1, |_bytes: &mut Vec<u8>| Vec::new());
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();
            match trajectory.start() {
                Err(BaxterException::GoalStateError { state, .. }) => {
                    assert_eq!(state, GoalState::Active)
                }
                other => panic!("Expected goal state error but found {:?}", other),
            }
            assert!(matches!(
                trajectory.add_point(&SOLUTION_B, Duration::from_secs(6)),
                Err(BaxterException::GoalStateError { .. })
            ));
            assert_eq!(trajectory.goal().points.len(), 2);
        }
        thread.join().unwrap();
    }

    #[test]
    fn wait_is_bounded_and_stop_preempts() {
        let mut goal_id = None;
        let (thread, config) = spawn_bridge(2, move |bytes: &mut Vec<u8>| -> Vec<u8> {
            let header: Message<ActionCommandEnum, ()> = decode(&bytes[..12]);
            match header.header.command {
                ActionCommandEnum::SendGoal => {
                    goal_id = Some(header.header.command_id);
                    Vec::new()
                }
                ActionCommandEnum::CancelGoal => {
                    let request: Message<ActionCommandEnum, CancelGoalRequest> = decode(bytes);
                    assert_eq!(Some(request.body.goal_id), goal_id);
                    let mut reply = response(
                        ActionCommandEnum::CancelGoal,
                        request.header.command_id,
                        CancelGoalResponse {
                            status: CancelStatus::Accepted,
                        },
                    );
                    reply.append(&mut result_bytes(
                        request.body.goal_id,
                        GoalStatus::Preempted,
                        0,
                    ));
                    reply
                }
                ActionCommandEnum::Connect => panic!("unexpected connect"),
            }
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();

            let timeout = Duration::from_millis(200);
            let start = Instant::now();
            trajectory.wait(timeout).unwrap();
            let elapsed = start.elapsed();
            assert!(elapsed >= timeout);
            assert!(elapsed < timeout + Duration::from_millis(500));
            assert_eq!(trajectory.state(), GoalState::Active);
            assert!(trajectory.result().is_none());

            trajectory.stop().unwrap();
            assert_eq!(trajectory.state(), GoalState::Cancelling);
            trajectory.wait(Duration::from_secs(2)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Preempted));
            assert!(!trajectory.result().unwrap().is_success());
            // nothing left to cancel
            trajectory.stop().unwrap();
        }
        thread.join().unwrap();
    }

    #[test]
    fn clear_resets_goal_and_ignores_late_result() {
        let mut first_goal = None;
        let (thread, config) = spawn_bridge(2, move |bytes: &mut Vec<u8>| -> Vec<u8> {
            let request: Message<ActionCommandEnum, SendGoalRequest> = decode(bytes);
            match first_goal {
                None => {
                    first_goal = Some(request.header.command_id);
                    Vec::new()
                }
                Some(first_id) => {
                    assert_eq!(request.body.goal.points.len(), 2);
                    let mut reply = result_bytes(first_id, GoalStatus::Aborted, -4);
                    reply.append(&mut result_bytes(
                        request.header.command_id,
                        GoalStatus::Succeeded,
                        0,
                    ));
                    reply
                }
            }
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.add_point(&SOLUTION_B, Duration::from_secs(6)).unwrap();
            trajectory.start().unwrap();

            trajectory.clear(Side::Right);
            assert_eq!(trajectory.state(), GoalState::Empty);
            assert!(trajectory.goal().points.is_empty());
            assert_eq!(trajectory.joint_names(), Side::Right.joint_names().as_slice());
            assert!(trajectory.result().is_none());

            trajectory.add_point(&SOLUTION_B, Duration::from_secs(0)).unwrap();
            trajectory
                .add_point(&SOLUTION_A, Duration::from_millis(2500))
                .unwrap();
            trajectory.start().unwrap();
            trajectory.wait(Duration::from_secs(2)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Succeeded));
            assert!(trajectory.result().unwrap().is_success());
        }
        thread.join().unwrap();
    }

    #[test]
    fn unknown_error_code_still_ends_the_goal() {
        let (thread, config) = spawn_bridge(1, |bytes: &mut Vec<u8>| -> Vec<u8> {
            let request: Message<ActionCommandEnum, SendGoalRequest> = decode(bytes);
            result_bytes(request.header.command_id, GoalStatus::Aborted, 7)
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();
            assert!(matches!(
                trajectory.wait(Duration::from_secs(2)),
                Err(BaxterException::NetworkException { .. })
            ));
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Aborted));
            assert!(trajectory.state().is_terminal());

            let start = Instant::now();
            trajectory.wait(Duration::from_millis(500)).unwrap();
            assert!(start.elapsed() < Duration::from_millis(100));
            // finished goals are not cancelled
            trajectory.stop().unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Aborted));
        }
        thread.join().unwrap();
    }

    #[test]
    fn cancel_without_active_goal_keeps_waiting_for_result() {
        let mut goal_id = None;
        let (thread, config) = spawn_bridge(2, move |bytes: &mut Vec<u8>| -> Vec<u8> {
            let header: Message<ActionCommandEnum, ()> = decode(&bytes[..12]);
            match header.header.command {
                ActionCommandEnum::SendGoal => {
                    goal_id = Some(header.header.command_id);
                    Vec::new()
                }
                _ => {
                    let request: Message<ActionCommandEnum, CancelGoalRequest> = decode(bytes);
                    assert_eq!(Some(request.body.goal_id), goal_id);
                    let mut reply = response(
                        ActionCommandEnum::CancelGoal,
                        request.header.command_id,
                        CancelGoalResponse {
                            status: CancelStatus::NoActiveGoal,
                        },
                    );
                    reply.append(&mut result_bytes(
                        request.body.goal_id,
                        GoalStatus::Succeeded,
                        0,
                    ));
                    reply
                }
            }
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();
            trajectory.stop().unwrap();
            assert_eq!(trajectory.state(), GoalState::Active);
            assert!(trajectory.result().is_none());
            trajectory.wait(Duration::from_secs(2)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Succeeded));
            assert!(trajectory.result().unwrap().is_success());
        }
        thread.join().unwrap();
    }

    #[test]
    fn late_cancel_acknowledgement_is_dropped() {
        let (thread, config) = spawn_bridge(2, |bytes: &mut Vec<u8>| -> Vec<u8> {
            let header: Message<ActionCommandEnum, ()> = decode(&bytes[..12]);
            match header.header.command {
                ActionCommandEnum::SendGoal => Vec::new(),
                _ => {
                    let request: Message<ActionCommandEnum, CancelGoalRequest> = decode(bytes);
                    std::thread::sleep(Duration::from_millis(400));
                    let mut reply = response(
                        ActionCommandEnum::CancelGoal,
                        request.header.command_id,
                        CancelGoalResponse {
                            status: CancelStatus::Accepted,
                        },
                    );
                    reply.append(&mut result_bytes(
                        request.body.goal_id,
                        GoalStatus::Preempted,
                        0,
                    ));
                    reply
                }
            }
        });
        {
            let config = config.with_response_timeout(Duration::from_millis(200));
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();
            assert!(matches!(
                trajectory.stop(),
                Err(BaxterException::NetworkException { .. })
            ));
            assert_eq!(trajectory.state(), GoalState::Active);
            trajectory.wait(Duration::from_secs(2)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Preempted));
            assert_eq!(trajectory.network.number_of_unread_replies(), 0);
        }
        thread.join().unwrap();
    }

    #[test]
    fn clear_switches_to_other_limb() {
        let (thread, config) = spawn_bridge(1, |bytes: &mut Vec<u8>| -> Vec<u8> {
            let request: Message<ActionCommandEnum, SendGoalRequest> = decode(bytes);
            assert_eq!(request.body.goal.joint_names, Side::Left.joint_names());
            result_bytes(request.header.command_id, GoalStatus::Succeeded, 0)
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.clear(Side::Left);
            assert_eq!(trajectory.joint_names(), Side::Left.joint_names().as_slice());
            assert_eq!(trajectory.side(), Side::Right);
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();
            trajectory.wait(Duration::from_secs(2)).unwrap();
            assert_eq!(trajectory.state(), GoalState::Done(GoalStatus::Succeeded));
        }
        thread.join().unwrap();
    }

    #[test]
    fn goal_time_tolerance_applies_while_building() {
        let (thread, config) = spawn_bridge(1, |bytes: &mut Vec<u8>| -> Vec<u8> {
            let request: Message<ActionCommandEnum, SendGoalRequest> = decode(bytes);
            assert_eq!(
                request.body.goal.goal_time_tolerance,
                Duration::from_millis(250)
            );
            Vec::new()
        });
        {
            let mut trajectory =
                TrajectoryClient::new("127.0.0.1", Side::Right, Some(config)).unwrap();
            trajectory.add_point(&CURRENT, Duration::from_secs(0)).unwrap();
            trajectory.set_goal_time_tolerance(Duration::from_millis(250));
            assert_eq!(
                trajectory.goal().goal_time_tolerance,
                Duration::from_millis(250)
            );
            trajectory.add_point(&SOLUTION_A, Duration::from_secs(3)).unwrap();
            trajectory.start().unwrap();

            trajectory.set_goal_time_tolerance(Duration::from_secs(1));
            assert_eq!(
                trajectory.goal().goal_time_tolerance,
                Duration::from_millis(250)
            );
            trajectory.clear(Side::Right);
            assert_eq!(trajectory.goal().goal_time_tolerance, Duration::from_secs(1));
        }
        thread.join().unwrap();
    }
}
