// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use std::f64::consts::PI;
use std::time::Duration;

use baxter::{
    pose_from_parts, quaternion_from_euler, BaxterResult, BridgeConfig, Gripper,
    IkRequest, IkService, JointState, Limb, PoseStamped, RobotEnable, Side, TrajectoryClient,
};
use clap::Parser;
use tracing::{error, info};

/// Picks up an object in front of the right arm and lifts it.
#[derive(Parser, Debug)]
#[clap(author, version, name = "pick_and_lift")]
struct CommandLineArguments {
    /// IP-Address or hostname of the robot bridge
    pub bridge_hostname: String,
    /// Port of the robot bridge
    #[clap(long, default_value_t = baxter::config::DEFAULT_BRIDGE_PORT)]
    pub port: u16,
    /// Arm to use, "left" or "right"
    #[clap(long, default_value = "right")]
    pub side: Side,
    /// Seed the IK solver with the current joint angles
    #[clap(long)]
    pub seed_current: bool,
}

/// Everything the task talks to, connected before the first motion.
struct Collaborators {
    robot: RobotEnable,
    gripper: Gripper,
    limb: Limb,
    ik: IkService,
    trajectory: TrajectoryClient,
}

impl Collaborators {
    fn connect(hostname: &str, side: Side, config: BridgeConfig) -> BaxterResult<Collaborators> {
        Ok(Collaborators {
            robot: RobotEnable::new(hostname, Some(config))?,
            gripper: Gripper::new(hostname, side, Some(config))?,
            limb: Limb::new(hostname, side, Some(config))?,
            ik: IkService::new(
                hostname,
                side,
                Some(config.with_connect_timeout(baxter::ik::IK_SERVICE_TIMEOUT)),
            )?,
            trajectory: TrajectoryClient::new(hostname, side, Some(config))?,
        })
    }
}

fn pick_and_lift(c: &mut Collaborators, side: Side, seed_current: bool) -> BaxterResult<()> {
    c.robot.enable()?;
    c.gripper.calibrate()?;
    info!("opening gripper");
    c.gripper.open()?;

    let current_angles = c.limb.joint_angles()?;

    let orient_down = quaternion_from_euler(PI, 0., PI / 2.);
    let y = match side {
        Side::Right => -0.428,
        Side::Left => 0.428,
    };
    let mut request = IkRequest::new();
    for z in [-0.57, -0.71, -0.5] {
        request = request.with_pose(PoseStamped::new("base", pose_from_parts([0., y, z], orient_down)));
    }
    if seed_current {
        let seed = JointState::new(c.limb.joint_names().to_vec(), current_angles.clone());
        for _ in 0..request.poses.len() {
            request = request.with_seed(seed.clone());
        }
    }
    let solutions = c.ik.solve(&request)?;
    let joint_names = c.trajectory.joint_names().to_vec();
    let high = solutions[0].positions_for(&joint_names)?;
    let grip = solutions[1].positions_for(&joint_names)?;
    let lift = solutions[2].positions_for(&joint_names)?;

    c.trajectory.add_point(&current_angles, Duration::from_secs(0))?;
    c.trajectory.add_point(&high, Duration::from_secs(3))?;
    c.trajectory.add_point(&grip, Duration::from_secs(6))?;
    c.trajectory.start()?;
    c.trajectory.wait(Duration::from_secs(12))?;
    info!(state = ?c.trajectory.state(), "reached the object");
    c.gripper.close()?;

    let current_angles = c.limb.joint_angles()?;
    c.trajectory.clear(side);
    c.trajectory.add_point(&current_angles, Duration::from_secs(0))?;
    c.trajectory.add_point(&lift, Duration::from_secs_f64(2.5))?;
    c.trajectory.start()?;
    c.trajectory.wait(Duration::from_secs_f64(2.5))?;
    info!(state = ?c.trajectory.state(), result = ?c.trajectory.result(), "lifted the object");
    Ok(())
}

fn main() -> BaxterResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "baxter=info"
                    .parse()
                    .expect("static directive is valid"),
            ),
        )
        .init();
    let args: CommandLineArguments = CommandLineArguments::parse();
    let config = BridgeConfig::default().with_port(args.port);
    let mut collaborators = match Collaborators::connect(&args.bridge_hostname, args.side, config) {
        Ok(collaborators) => collaborators,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    pick_and_lift(&mut collaborators, args.side, args.seed_current)
}
