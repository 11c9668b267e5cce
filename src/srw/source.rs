//! Source radiation: magnetic field and initial sampling mesh per source kind
//!
//! Each supported source kind implements [`SrwSource`]. Adding a kind means
//! one more implementation and one more arm in [`srw_source`].

use tracing::debug;

use super::error::{DriverError, Result};
use super::native::{
    FieldPlane, MagField, MagFieldContainer, MagFieldHarmonic, MagFieldMultipole,
    MagFieldUndulator, RadMesh,
};
use super::settings::{SrwBendingMagnetSetting, SrwUndulatorSetting};
use crate::domain::{BendingMagnet, ElectronBeam, RadiationSource, Undulator};
use crate::settings::{DriverId, HasSettings};
use crate::DriverConfig;

/// SRW view of a radiation source
pub trait SrwSource {
    /// Magnetic field container passed to `CalcElecFieldSR`
    fn field_container(&self) -> MagFieldContainer;

    /// Initial sampling mesh given the z of the first beamline component
    fn sampling_mesh(&self, beam: &ElectronBeam, first_z: f64, config: &DriverConfig) -> Result<RadMesh>;

    /// Resolved `CalcElecFieldSR` precision parameters for `driver`
    fn source_parameters(&self, driver: DriverId) -> Vec<f64>;
}

/// Everything needed to compute the initial field of a source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceField {
    pub magnetic_field: MagFieldContainer,
    pub mesh: RadMesh,
    pub parameters: Vec<f64>,
}

/// Pick the SRW translation for `source`
pub fn srw_source(source: &RadiationSource) -> Result<&dyn SrwSource> {
    match source {
        RadiationSource::Undulator(undulator) => Ok(undulator as &dyn SrwSource),
        RadiationSource::BendingMagnet(magnet) => Ok(magnet as &dyn SrwSource),
        other => Err(DriverError::UnsupportedSource(other.kind().to_string())),
    }
}

/// Translate `source` into field, mesh and precision parameters
pub fn build_source_field(
    source: &RadiationSource,
    beam: &ElectronBeam,
    first_z: f64,
    driver: DriverId,
    config: &DriverConfig,
) -> Result<SourceField> {
    let srw = srw_source(source)?;
    Ok(SourceField {
        magnetic_field: srw.field_container(),
        mesh: srw.sampling_mesh(beam, first_z, config)?,
        parameters: srw.source_parameters(driver),
    })
}

fn check_sampling_plane(z_start: f64) -> Result<()> {
    if z_start.is_finite() && z_start > 0.0 {
        Ok(())
    } else {
        Err(DriverError::InvalidBeamline(format!(
            "sampling plane at z = {} m gives an empty mesh",
            z_start
        )))
    }
}

impl SrwSource for Undulator {
    fn field_container(&self) -> MagFieldContainer {
        // Vertical harmonic first; SRW's phase convention depends on the order
        let mut harmonics = Vec::with_capacity(2);
        if self.k_vertical() > 0.0 {
            harmonics.push(MagFieldHarmonic {
                n: 1,
                plane: FieldPlane::Vertical,
                b: self.b_vertical(),
                ph: 0.0,
                s: 1,
                a: 1.0,
            });
        }
        if self.k_horizontal() > 0.0 {
            harmonics.push(MagFieldHarmonic {
                n: 1,
                plane: FieldPlane::Horizontal,
                b: self.b_horizontal(),
                ph: 0.0,
                s: -1,
                a: 1.0,
            });
        }

        MagFieldContainer::centered(MagField::Undulator(MagFieldUndulator {
            harmonics,
            per: self.period_length(),
            nper: self.period_number(),
        }))
    }

    fn sampling_mesh(&self, beam: &ElectronBeam, first_z: f64, config: &DriverConfig) -> Result<RadMesh> {
        let gamma = beam.gamma();
        let max_theta = self.gaussian_central_cone_divergence(gamma) * config.cone_factor;
        let z_start = self.length() + first_z;
        check_sampling_plane(z_start)?;

        let half_width = max_theta * z_start / 2.0_f64.sqrt();
        let energy = self.resonance_energy(gamma, 0.0, 0.0).trunc();
        debug!(
            "Undulator mesh: z_start={:.4} m, half-width={:.4e} m, energy={} eV",
            z_start, half_width, energy
        );

        Ok(RadMesh::centered(
            energy,
            half_width,
            half_width,
            config.grid_size,
            config.grid_size,
            z_start,
        ))
    }

    fn source_parameters(&self, driver: DriverId) -> Vec<f64> {
        self.settings_parameters::<SrwUndulatorSetting, _>(&driver)
    }
}

impl SrwSource for BendingMagnet {
    fn field_container(&self) -> MagFieldContainer {
        MagFieldContainer::centered(MagField::Multipole(MagFieldMultipole {
            g: self.magnetic_field(),
            m: 1,
            n_or_s: 'n',
            length: self.length(),
        }))
    }

    fn sampling_mesh(&self, _beam: &ElectronBeam, first_z: f64, config: &DriverConfig) -> Result<RadMesh> {
        // Sampling starts at the first component, without the magnet length
        let z_start = first_z;
        check_sampling_plane(z_start)?;

        let half_width_x = 0.5 * self.horizontal_acceptance() * z_start;
        let half_width_y = 0.5 * self.vertical_acceptance() * z_start;
        debug!(
            "Bending magnet mesh: z_start={:.4} m, half-widths=({:.4e}, {:.4e}) m, energy={} eV",
            z_start, half_width_x, half_width_y, config.photon_energy_ev
        );

        Ok(RadMesh::centered(
            config.photon_energy_ev,
            half_width_x,
            half_width_y,
            config.grid_size,
            config.grid_size,
            z_start,
        ))
    }

    fn source_parameters(&self, driver: DriverId) -> Vec<f64> {
        self.settings_parameters::<SrwBendingMagnetSetting, _>(&driver)
    }
}
