//! cad2urdf: export a CAD assembly snapshot as a ROS description package

mod package;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cad2urdf_core::{ExportConfig, HostSnapshot, export};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cad2urdf")]
#[command(about = "Export a CAD assembly snapshot as a URDF description package", long_about = None)]
struct Args {
    /// Host snapshot (JSON)
    snapshot: PathBuf,

    /// Export configuration (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the package is created in
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Override the robot name derived from the root component
    #[arg(long)]
    robot_name: Option<String>,

    /// Override the root body identifier
    #[arg(long)]
    root_body: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let args = Args::parse();

    let default_filter = if args.verbose {
        "cad2urdf=debug"
    } else {
        "cad2urdf=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    if let Some(name) = args.robot_name {
        config.robot_name = Some(name);
    }
    if let Some(root) = args.root_body {
        config.root_body = root;
    }

    let content = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", args.snapshot.display()))?;
    let snapshot = HostSnapshot::from_json(&content)?;

    let report = export(&snapshot, &config)?;
    let written = package::write_package(&args.output, &report, &config)?;

    let summary = report.summary();
    println!("Robot:    {}", summary.robot);
    println!("Package:  {}", written.name);
    println!("Folder:   {}", written.root.display());
    println!("URDF:     {}", written.urdf.display());
    println!("Joints:   {}", summary.joints);
    println!("Mimic followers annotated: {}", summary.mimics_annotated);
    println!("Name-based mimics unmatched: {}", summary.mimics_unmatched);
    if summary.diagnostics > 0 {
        println!(
            "{} warnings, see {}",
            summary.diagnostics,
            package::LOG_FILE
        );
    }

    Ok(())
}
