//! Dual-sensor motion fusion demo.

use anyhow::Result;
use clap::Parser;
use dual_motion_fusion::app::{AppConfig, DataSource, MotionApp};
use dual_motion_fusion::config::{Config, EXAMPLE_CONFIG};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file of samples to replay (role,timestamp_ms,ax,ay,az,gx,gy,gz[,quality])
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of synthetic cycles when no input file is given
    #[arg(short = 'n', long, default_value = "800")]
    cycles: usize,

    /// Use the first N dual-sensor cycles as a calibration batch
    #[arg(long, default_value = "0")]
    calibrate: usize,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Dual Motion Fusion");

    let pipeline = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let config = AppConfig {
        source: match args.input {
            Some(path) => DataSource::File(path),
            None => DataSource::Synthetic { cycles: args.cycles },
        },
        calibration_cycles: args.calibrate,
        pipeline,
    };

    let mut app = MotionApp::new(config)?;
    let summary = app.run()?;

    println!(
        "{} cycles processed, {} compensated samples, {} patterns emitted",
        summary.cycles, summary.compensated_samples, summary.patterns_emitted
    );

    Ok(())
}
