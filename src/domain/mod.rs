//! Program-independent description of a beamline
//!
//! These types describe what a scientist would need to physically build the
//! beamline. Simulation codes only ever read them; anything code-specific is
//! attached through [`crate::settings`].

pub mod beamline;
pub mod electron_beam;
pub mod source;

pub use beamline::{Aperture, Beamline, BeamlineComponent, BeamlinePosition, ImagePlane, LensIdeal};
pub use electron_beam::ElectronBeam;
pub use source::{BendingMagnet, RadiationSource, Undulator, Wiggler};

/// Physical constants (CODATA 2018)
pub mod constants {
    /// Speed of light in vacuum (m/s)
    pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
    /// Elementary charge (C)
    pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
    /// Electron mass (kg)
    pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;
    /// Planck constant (J s)
    pub const PLANCK: f64 = 6.626_070_15e-34;
    /// Electron rest energy (GeV)
    pub const ELECTRON_REST_ENERGY_GEV: f64 = 0.510_998_950e-3;
}
