//! beamline-to-srw: CLI tool for translating beamline descriptions to SRW scripts

use anyhow::{Context, Result};
use clap::Parser;
use srw_beamline::{translate, DriverConfig, LengthUnit};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "beamline-to-srw")]
#[command(about = "Translate generic beamline descriptions to SRW wavefront simulations")]
#[command(version)]
struct Args {
    /// Input JSON file (beamline scene)
    #[arg(short, long)]
    input: PathBuf,

    /// Output Python file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Samples per transverse axis of the initial wavefront
    #[arg(long, default_value = "1000")]
    grid_size: usize,

    /// Undulator mesh half-angle in central cone divergences
    #[arg(long, default_value = "2.5")]
    cone_factor: f64,

    /// Photon energy for bending magnets in eV (overridden by the scene)
    #[arg(long, default_value = "0.061992")]
    photon_energy: f64,

    /// Display unit for intensity and phase meshes (m, mm, um, nm)
    #[arg(long, default_value = "um")]
    display_unit: String,

    /// Print generated script to stdout instead of file
    #[arg(long)]
    stdout: bool,
}

fn parse_unit(s: &str) -> Result<LengthUnit> {
    match s.to_lowercase().as_str() {
        "m" | "meter" | "meters" => Ok(LengthUnit::Meter),
        "mm" | "millimeter" | "millimeters" => Ok(LengthUnit::Millimeter),
        "um" | "µm" | "micrometer" | "micrometers" => Ok(LengthUnit::Micrometer),
        "nm" | "nanometer" | "nanometers" => Ok(LengthUnit::Nanometer),
        _ => anyhow::bail!("Unknown unit: {}. Use: m, mm, um, or nm", s),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Read input
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {:?}", args.input))?;

    // Build config
    let config = DriverConfig {
        grid_size: args.grid_size,
        cone_factor: args.cone_factor,
        photon_energy_ev: args.photon_energy,
        display_unit: parse_unit(&args.display_unit)?,
    };

    // Translate
    let script = translate(&json, &config)
        .context("Translation failed")?;

    // Output
    if args.stdout {
        println!("{}", script);
    } else {
        let output = args.output.unwrap_or_else(|| args.input.with_extension("py"));
        fs::write(&output, &script)
            .with_context(|| format!("Failed to write output file: {:?}", output))?;
        info!("Generated SRW script: {:?}", output);
    }

    Ok(())
}
