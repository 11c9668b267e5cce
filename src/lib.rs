//! srw-beamline: Translate generic synchrotron beamlines to SRW simulations
//!
//! This crate provides:
//! - A program-independent domain model (electron beam, sources, beamline)
//! - Per-driver settings attached to domain objects
//! - Translation to SRW native records with automatic drift insertion
//! - Execution through an injected [`srw::SrwEngine`]
//! - Python script generation for running the same simulation with srwlib
//!
//! SRW works in SI units (m, rad, eV). Only the display meshes returned by
//! the intensity and phase extraction are rescaled.

pub mod codegen;
pub mod domain;
pub mod scene;
pub mod settings;
pub mod srw;

pub use codegen::{generate_srw_script, RegressionReference};
pub use domain::{Beamline, BeamlineComponent, BeamlinePosition, ElectronBeam, RadiationSource};
pub use scene::Scene;
pub use settings::{DriverId, DriverIdentity, DriverSettings, HasSettings, SettingsBag, SettingsError};
pub use srw::{DriverError, FieldMap, SrwDriver, SrwEngine, SrwSimulation, Wavefront};

use anyhow::Result;

/// Main entry point: parse a JSON scene and generate an srwlib Python script
pub fn translate(json: &str, config: &DriverConfig) -> Result<String> {
    let scene = Scene::from_json(json)?;

    let mut config = config.clone();
    if let Some(energy) = scene.photon_energy_ev {
        config.photon_energy_ev = energy;
    }

    let driver = DriverId::next();
    let objects = scene.build(&driver);
    let simulation = SrwSimulation::build(
        driver,
        &config,
        &objects.electron_beam,
        &objects.source,
        &objects.beamline,
    )?;
    let script = generate_srw_script(&simulation, &config, scene.reference.as_ref())?;
    Ok(script)
}

/// Configuration for the driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Samples per transverse axis of the initial wavefront (default: 1000)
    pub grid_size: usize,
    /// Undulator mesh half-angle in units of the central cone divergence
    pub cone_factor: f64,
    /// Photon energy for bending magnet sources in eV
    pub photon_energy_ev: f64,
    /// Unit of the display meshes returned with intensity and phase
    pub display_unit: LengthUnit,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            grid_size: 1000,
            cone_factor: 2.5,
            photon_energy_ev: 0.5 * 0.123984, // 20 µm, far infrared
            display_unit: LengthUnit::Micrometer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    Meter,
    Millimeter,
    Micrometer,
    Nanometer,
}

impl LengthUnit {
    /// Convert from this unit to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            LengthUnit::Millimeter => value * 1e-3,
            LengthUnit::Micrometer => value * 1e-6,
            LengthUnit::Nanometer => value * 1e-9,
        }
    }

    /// Convert from meters to this unit
    pub fn from_meters(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            LengthUnit::Millimeter => value * 1e3,
            LengthUnit::Micrometer => value * 1e6,
            LengthUnit::Nanometer => value * 1e9,
        }
    }

    /// Get scale factor to convert from one unit to another
    pub fn scale_to(&self, target: &LengthUnit) -> f64 {
        target.from_meters(self.to_meters(1.0))
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meter => "m",
            LengthUnit::Millimeter => "mm",
            LengthUnit::Micrometer => "µm",
            LengthUnit::Nanometer => "nm",
        }
    }
}
