//! SRW driver: radiation calculation and field post-processing

use ndarray::Array2;

use super::engine::{Dependence, EngineError, ExtractionPoint, Polarization, Quantity, SrwEngine};
use super::error::Result;
use super::native::Wavefront;
use super::simulation::SrwSimulation;
use crate::domain::{Beamline, ElectronBeam, RadiationSource};
use crate::settings::{DriverId, DriverIdentity};
use crate::{DriverConfig, LengthUnit};

/// One axis of a display mesh, in display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayAxis {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Derived scalar field sampled on the wavefront mesh
///
/// `values` has shape `(ny, nx)` so its memory order is SRW's (x fastest).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    pub values: Array2<f64>,
    pub x: DisplayAxis,
    pub y: DisplayAxis,
}

/// Translates generic beamlines into SRW calls on `engine`
///
/// Each driver has its own [`DriverId`]: settings attached to a domain
/// object for one driver are invisible to any other.
#[derive(Debug)]
pub struct SrwDriver<E> {
    id: DriverId,
    engine: E,
    config: DriverConfig,
}

impl<E: SrwEngine> SrwDriver<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, DriverConfig::default())
    }

    pub fn with_config(engine: E, config: DriverConfig) -> Self {
        Self {
            id: DriverId::next(),
            engine,
            config,
        }
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Translate without running anything
    pub fn simulation(
        &self,
        electron_beam: &ElectronBeam,
        radiation_source: &RadiationSource,
        beamline: &Beamline,
    ) -> Result<SrwSimulation> {
        SrwSimulation::build(self.id, &self.config, electron_beam, radiation_source, beamline)
    }

    /// Radiation of `radiation_source` propagated to the end of `beamline`
    pub fn calculate_radiation(
        &self,
        electron_beam: &ElectronBeam,
        radiation_source: &RadiationSource,
        beamline: &Beamline,
    ) -> Result<Wavefront> {
        self.simulation(electron_beam, radiation_source, beamline)?
            .run(&self.engine)
    }

    /// Total single-electron intensity over the wavefront mesh
    pub fn calculate_intensity(&self, wavefront: &Wavefront) -> Result<FieldMap> {
        self.extract(wavefront, Polarization::Total, Quantity::SingleElectronIntensity)
    }

    /// Phase of the horizontal field component over the wavefront mesh
    pub fn calculate_phase(&self, wavefront: &Wavefront) -> Result<FieldMap> {
        self.extract(wavefront, Polarization::LinearHorizontal, Quantity::Phase)
    }

    fn extract(&self, wavefront: &Wavefront, polarization: Polarization, quantity: Quantity) -> Result<FieldMap> {
        let mesh = &wavefront.mesh;
        let mut samples = vec![0.0; mesh.nx * mesh.ny];
        self.engine.calc_int_from_elec_field(
            &mut samples,
            wavefront,
            polarization,
            quantity,
            Dependence::XY,
            ExtractionPoint {
                energy: mesh.e_start,
                x: 0.0,
                y: 0.0,
            },
        )?;

        let values = Array2::from_shape_vec((mesh.ny, mesh.nx), samples)
            .map_err(|e| EngineError::new("CalcIntFromElecField", e.to_string()))?;

        let scale = LengthUnit::Meter.scale_to(&self.config.display_unit);
        Ok(FieldMap {
            values,
            x: DisplayAxis {
                min: scale * mesh.x_start,
                max: scale * mesh.x_fin,
                count: mesh.nx,
            },
            y: DisplayAxis {
                min: scale * mesh.y_start,
                max: scale * mesh.y_fin,
                count: mesh.ny,
            },
        })
    }
}

impl<E> DriverIdentity for SrwDriver<E> {
    fn driver_id(&self) -> DriverId {
        self.id
    }
}
