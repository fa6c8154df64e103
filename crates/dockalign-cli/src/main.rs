//! `dockalign-cli` – docking alignment command line.
//!
//! Subcommands:
//!
//! - `scene`  – simulate a sensor reading from the configured world layout,
//!   carry it into the wheel chair frame and solve the manoeuvre.
//! - `solve`  – solve for a POI and normal already in the wheel chair frame.
//! - `sensor` – carry a sensor-frame POI and normal through the configured
//!   mount, then solve.
//! - `init`   – write the default configuration file.

mod config;
mod report;

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use nalgebra::{Point3, Vector3};
use tracing::info;

use dockalign_perception::{DockingTarget, Scene, TurningAngles};

#[derive(Debug, Parser)]
#[command(author, version, about = "Wheel chair docking alignment")]
struct Cli {
    /// Config file (defaults to ~/.dockalign/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the simulated docking scene.
    Scene {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Solve for a target given in the wheel chair frame.
    Solve(TargetArgs),
    /// Solve for a target measured in the sensor frame.
    Sensor(TargetArgs),
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// POI position as `x,y,z`.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    poi: [f64; 3],

    /// Surface normal as `x,y,z`, pointing from the surface toward the
    /// wheel chair.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    normal: [f64; 3],

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_vec3(s: &str) -> Result<[f64; 3], String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {}", p.trim(), e)))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected 3 comma-separated numbers, got {}", parts.len())),
    }
}

fn main() {
    // Logs go to stderr so that `--json` output on stdout stays parseable.
    // Set DOCKALIGN_LOG_FORMAT=json for newline-delimited JSON logs.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("DOCKALIGN_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = cli.config;
    let load = || config::resolve(config_path.as_deref());

    match cli.command {
        Command::Init { force } => init(config_path.clone(), force)?,
        Command::Scene { json } => {
            let cfg = load()?;
            let scene = Scene::build(&cfg.scene, &cfg.mount)?;
            let mut report = scene.analyze(&cfg.solver.solver(), cfg.solver.tolerance)?;
            if cfg.solver.wrap_turns {
                report.angles = report.angles.wrapped();
            }
            if json {
                println!("{}", report::scene_json(&report)?);
            } else {
                print!("{}", report::render_scene(&report));
            }
        }
        Command::Solve(args) => {
            let cfg = load()?;
            let angles = cfg
                .solver
                .solver()
                .solve(Point3::from(args.poi), Vector3::from(args.normal))?;
            print_angles(&angles, cfg.solver.wrap_turns, args.json)?;
        }
        Command::Sensor(args) => {
            let cfg = load()?;
            let measurement = DockingTarget::new(Point3::from(args.poi), Vector3::from(args.normal));
            let target = cfg.mount.to_platform(&measurement)?;
            info!(poi = ?target.poi, normal = ?target.normal, "measurement in wheel chair frame");
            let angles = cfg.solver.solver().solve(target.poi, target.normal)?;
            print_angles(&angles, cfg.solver.wrap_turns, args.json)?;
        }
    }
    Ok(())
}

fn print_angles(angles: &TurningAngles, wrap: bool, json: bool) -> Result<(), Box<dyn Error>> {
    let angles = if wrap { angles.wrapped() } else { *angles };
    if json {
        println!("{}", report::angles_json(&angles)?);
    } else {
        print!("{}", report::render_angles(&angles));
    }
    Ok(())
}

fn init(path: Option<PathBuf>, force: bool) -> Result<(), Box<dyn Error>> {
    let path = path.unwrap_or_else(config::config_path);
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    config::save_to(&config::Config::default(), &path)?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}
