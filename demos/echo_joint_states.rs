// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use baxter::{BaxterResult, BridgeConfig, Limb, Side};
use clap::Parser;

/// An example showing how to read the joint states of an arm.
#[derive(Parser, Debug)]
#[clap(author, version, name = "echo_joint_states")]
struct CommandLineArguments {
    /// IP-Address or hostname of the robot bridge
    pub bridge_hostname: String,
    /// Arm to read, "left" or "right"
    #[clap(long, default_value = "right")]
    pub side: Side,
    /// Number of states to print
    #[clap(long, default_value_t = 10)]
    pub count: usize,
}

fn main() -> BaxterResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args: CommandLineArguments = CommandLineArguments::parse();
    let mut limb = Limb::new(&args.bridge_hostname, args.side, Some(BridgeConfig::default()))?;
    for _ in 0..args.count {
        let state = limb.read_once()?;
        for (name, position) in state.joint_names.iter().zip(state.positions.iter()) {
            print!("{}: {:.4} ", name, position);
        }
        println!();
    }
    Ok(())
}
