use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use rs_arm_ik::arm_from_file::ArmConfig;
use rs_arm_ik::kinematic_traits::{Kinematics, Position};
use rs_arm_ik::trajectory::{Driver, Trajectory};
use rs_arm_ik::utils::{dump_expmaps, dump_positions, format_position, is_valid};

/// Drives an arm with differential inverse kinematics, printing positions instead of rendering.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// YAML arm description. The built-in demo arm is used when not given.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step towards a fixed goal until it is reached or steps run out.
    Reach {
        /// Goal as x,y,z
        #[arg(short, long, value_parser = parse_point, allow_hyphen_values = true)]
        goal: Position,

        #[arg(long, default_value_t = 50)]
        max_steps: usize,

        #[arg(long, default_value_t = 1e-3)]
        tolerance: f64,
    },
    /// Track the figure-eight goal, one step per frame.
    Follow {
        #[arg(long, default_value_t = 1000)]
        frames: usize,

        /// Print the tracking error every that many frames.
        #[arg(long, default_value_t = 100)]
        every: usize,
    },
    /// Print the arm description in YAML.
    Show,
}

fn parse_point(s: &str) -> Result<Position, String> {
    let coordinates = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("'{}': {}", c, e)))
        .collect::<Result<Vec<_>, _>>()?;
    match coordinates[..] {
        [x, y, z] => Ok(Position::new(x, y, z)),
        _ => Err(format!("expected x,y,z, found {} values", coordinates.len())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).init();

    let config = match &cli.config {
        Some(path) => ArmConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to read arm description from {}", path))?,
        None => ArmConfig::default(),
    };
    let mut arm = config.arm().context("Invalid solver settings")?;
    info!("arm with {} joints, {} DOF", arm.chain.joint_count(), arm.dof());

    match cli.command {
        Command::Reach { goal, max_steps, tolerance } => {
            ensure!(tolerance > 0.0, "tolerance must be positive, got {}", tolerance);
            let result = Driver::reach(&mut arm, &goal, tolerance, max_steps);
            for (step, error) in result.errors.iter().enumerate() {
                println!("step {:3}: error {:.6e}", step + 1, error);
            }
            if result.converged {
                println!("Reached [{}] in {} steps", format_position(&goal), result.steps);
            } else {
                println!("Not reached after {} steps, remaining error {:.6e}",
                         result.steps, result.final_error);
            }
            dump_positions(&arm.joint_positions());
        }
        Command::Follow { frames, every } => {
            ensure!(every > 0, "--every must be positive");
            let mut driver = config.driver();
            for chunk in 0..frames.div_ceil(every) {
                let ticks = every.min(frames - chunk * every);
                let errors = driver.follow(&mut arm, &config.trajectory, ticks);
                let worst = errors.iter().cloned().fold(0.0, f64::max);
                println!("t = {:6.2}: goal [{}], worst error {:.3e}",
                         driver.t, format_position(&config.trajectory.goal_at(driver.t)), worst);
            }
            let positions = arm.joint_positions();
            ensure!(is_valid(&positions), "Arm diverged: {:?}", positions);
            dump_positions(&positions);
            let last = arm.step_towards(&config.trajectory.goal_at(driver.t));
            println!("Next increments:");
            dump_expmaps(&last.increments);
        }
        Command::Show => {
            print!("{}", config.to_yaml());
            dump_positions(&arm.joint_positions());
        }
    }
    Ok(())
}
