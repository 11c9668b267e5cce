//! Fully translated SRW simulation, ready to run or export

use tracing::info;

use super::beamline::{reference_plane, translate_beamline};
use super::engine::SrwEngine;
use super::error::Result;
use super::native::{
    MagFieldContainer, OpticalContainer, ParticleMoments, PartBeam, RadMesh, Wavefront,
};
use super::source::build_source_field;
use crate::domain::{Beamline, ElectronBeam, RadiationSource};
use crate::settings::DriverId;
use crate::DriverConfig;

/// Every argument of the SRW calls for one `calculate_radiation`
///
/// Building a simulation never touches the engine, so translation errors
/// surface before any numerical work starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SrwSimulation {
    pub source_kind: &'static str,
    pub part_beam: PartBeam,
    pub magnetic_field: MagFieldContainer,
    /// `CalcElecFieldSR` precision parameters
    pub source_parameters: Vec<f64>,
    /// Initial wavefront mesh
    pub mesh: RadMesh,
    pub optics: OpticalContainer,
}

/// Electron beam as SRW sees it
///
/// Only valid for a pencil beam: longitudinal position and angles are zero.
pub fn part_beam(beam: &ElectronBeam) -> PartBeam {
    PartBeam {
        i_avg: beam.average_current(),
        mom1: ParticleMoments {
            x: beam.x(),
            y: beam.y(),
            z: 0.0,
            xp: 0.0,
            yp: 0.0,
            gamma: beam.gamma(),
        },
    }
}

impl SrwSimulation {
    /// Translate beam, source and beamline for the driver `driver`
    pub fn build(
        driver: DriverId,
        config: &DriverConfig,
        beam: &ElectronBeam,
        source: &RadiationSource,
        beamline: &Beamline,
    ) -> Result<Self> {
        let first_z = reference_plane(beamline)?;
        let part_beam = part_beam(beam);
        let source_field = build_source_field(source, beam, first_z, driver, config)?;
        let optics = translate_beamline(beamline, first_z, driver)?;

        info!(
            "Translated {} source and {} components into {} SRW elements",
            source.kind(),
            beamline.len(),
            optics.len()
        );

        Ok(Self {
            source_kind: source.kind(),
            part_beam,
            magnetic_field: source_field.magnetic_field,
            source_parameters: source_field.parameters,
            mesh: source_field.mesh,
            optics,
        })
    }

    /// Compute the source field and propagate it through the optics
    pub fn run<E: SrwEngine>(self, engine: &E) -> Result<Wavefront> {
        let mut wavefront = Wavefront::allocate(self.mesh, self.part_beam);

        info!(
            "Computing source field on {}x{} mesh at z = {} m",
            wavefront.mesh.nx, wavefront.mesh.ny, wavefront.mesh.z_start
        );
        engine.calc_elec_field_sr(&mut wavefront, &self.magnetic_field, &self.source_parameters)?;

        info!("Propagating through {} elements", self.optics.len());
        engine.propag_elec_field(&mut wavefront, &self.optics)?;

        Ok(wavefront)
    }
}
