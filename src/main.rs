use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

use a3c_kinematics::forward_kinematics::ForwardKinematics;
use a3c_kinematics::inverse_kinematics::{IkConfig, InverseKinematics, Tracking};
use a3c_kinematics::kinematic_traits::{Joints, Pose};
use a3c_kinematics::parameters::dh_kinematics::DHParams;
use a3c_kinematics::utils::{dump_joints, dump_trajectory, joints_from_slice, translated};

/// Forward and inverse kinematics of the A3C arm.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pose of the flange for the given joints
    Fk(RobotArgs),
    /// Analytic Jacobian for the given joints
    Jacobian(RobotArgs),
    /// Joint trajectory moving the flange on a straight line by the given offset
    Ik {
        #[command(flatten)]
        robot: RobotArgs,

        /// Cartesian offset of the target, meters: dx,dy,dz
        #[arg(long, required = true, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        delta: Vec<f64>,

        /// Number of integration steps (overrides the configuration file)
        #[arg(long)]
        steps: Option<usize>,

        /// Also keep the orientation of the flange
        #[arg(long)]
        hold_orientation: bool,

        /// Print every configuration, not only the last one
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
struct RobotArgs {
    /// Joint angles, radians unless --degrees is given
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    joints: Vec<f64>,

    /// Joint angles are given in degrees
    #[arg(long)]
    degrees: bool,

    /// YAML file with DH parameters (and optional inverse_kinematics section)
    #[arg(long)]
    params: Option<PathBuf>,
}

impl RobotArgs {
    fn joints(&self) -> Result<Joints> {
        let joints = joints_from_slice(&self.joints).context("Six joint values expected")?;
        Ok(if self.degrees { joints.map(f64::to_radians) } else { joints })
    }

    fn parameters(&self) -> Result<DHParams> {
        match &self.params {
            Some(path) => DHParams::from_yaml_file(path)
                .with_context(|| format!("Failed to read DH parameters from {}", path.display())),
            None => Ok(DHParams::a3c()),
        }
    }

    fn ik_config(&self) -> Result<IkConfig> {
        match &self.params {
            Some(path) => IkConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to read IK settings from {}", path.display())),
            None => Ok(IkConfig::default()),
        }
    }
}

fn print_pose(pose: &Pose) {
    let p = pose.translation.vector;
    let q = pose.rotation.quaternion();
    println!("position:    [{:.6}, {:.6}, {:.6}]", p.x, p.y, p.z);
    println!("orientation: [{:.6}, {:.6}, {:.6}, {:.6}] (x, y, z, w)", q.i, q.j, q.k, q.w);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Fk(args) => {
            let fk = ForwardKinematics::new(args.parameters()?);
            print_pose(&fk.fk(&args.joints()?));
        }
        Command::Jacobian(args) => {
            let ik = InverseKinematics::new(args.parameters()?, args.joints()?);
            let jacobian = ik.get_jacobian(ik.initial_joints());
            for row in jacobian.row_iter() {
                let values: Vec<String> = row.iter().map(|v| format!("{:9.5}", v)).collect();
                println!("[{}]", values.join(" "));
            }
        }
        Command::Ik { robot, delta, steps, hold_orientation, all } => {
            let parameters = robot.parameters()?;
            let joints = robot.joints()?;

            let mut config = robot.ik_config()?;
            if let Some(steps) = steps {
                let stepped = IkConfig::with_steps(steps)?;
                config.delta_time = stepped.delta_time;
                config.step_rate = stepped.step_rate;
            }
            if hold_orientation {
                config = config.tracking(Tracking::HoldOrientation);
            }

            let fk = ForwardKinematics::new(parameters);
            let current = fk.fk(&joints);
            let target = translated(&current, &Vector3::new(delta[0], delta[1], delta[2]));

            let ik = InverseKinematics::with_config(parameters, joints, config)?;
            let report = ik.linear_ik_report(&current, &target)?;

            if all {
                dump_trajectory(&report.trajectory);
            } else if let Some(last) = report.final_joints() {
                dump_joints(last);
            }

            if let Some(last) = report.final_joints() {
                let reached = fk.fk(last);
                let error = (reached.translation.vector - target.translation.vector).norm();
                println!("steps: {}, position error: {:.3e} m", report.trajectory.len(), error);
            }
            if report.rank_deficient_steps > 0 {
                println!("rank deficient steps: {} (minimum task rank {})", report.rank_deficient_steps, report.min_rank);
            }
            if report.singular_steps > 0 {
                println!("singular steps: {} (minimum Jacobian rank {} of 6)", report.singular_steps, report.min_full_rank);
            }
        }
    }
    Ok(())
}
