//! The seam between the driver and the SRW numerical library
//!
//! Everything the driver needs from SRW goes through [`SrwEngine`]. A real
//! binding forwards these calls to `srwl.CalcElecFieldSR`,
//! `srwl.PropagElecField` and `srwl.CalcIntFromElecField`; tests plug in a
//! recording stub.

use thiserror::Error;

use super::native::{MagFieldContainer, OpticalContainer, Wavefront};

/// Failure reported by the engine. Passed through to the caller untouched.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("SRW {call} failed: {message}")]
pub struct EngineError {
    pub call: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Polarization component selector (`_pol`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarization {
    LinearHorizontal = 0,
    LinearVertical = 1,
    Linear45 = 2,
    Linear135 = 3,
    CircularRight = 4,
    CircularLeft = 5,
    Total = 6,
}

/// Derived quantity selector (`_int_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    SingleElectronIntensity = 0,
    MultiElectronIntensity = 1,
    SingleElectronFlux = 2,
    MultiElectronFlux = 3,
    Phase = 4,
    ReField = 5,
    ImField = 6,
}

/// Variables the extracted quantity depends on (`_depType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependence {
    Energy = 0,
    X = 1,
    Y = 2,
    XY = 3,
    EnergyX = 4,
    EnergyY = 5,
    EnergyXY = 6,
}

/// Where to evaluate a quantity along the dimensions it does not depend on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionPoint {
    pub energy: f64,
    pub x: f64,
    pub y: f64,
}

/// External SRW calls used by the driver
pub trait SrwEngine {
    /// Compute the synchrotron radiation field of the wavefront's electron
    /// beam travelling through `field`, writing into `wfr` in place.
    fn calc_elec_field_sr(
        &self,
        wfr: &mut Wavefront,
        field: &MagFieldContainer,
        parameters: &[f64],
    ) -> Result<(), EngineError>;

    /// Propagate `wfr` through `optics` in place. The mesh may change.
    fn propag_elec_field(
        &self,
        wfr: &mut Wavefront,
        optics: &OpticalContainer,
    ) -> Result<(), EngineError>;

    /// Fill `output` with a quantity derived from `wfr`.
    fn calc_int_from_elec_field(
        &self,
        output: &mut [f64],
        wfr: &Wavefront,
        polarization: Polarization,
        quantity: Quantity,
        dependence: Dependence,
        at: ExtractionPoint,
    ) -> Result<(), EngineError>;
}

impl<E: SrwEngine + ?Sized> SrwEngine for &E {
    fn calc_elec_field_sr(
        &self,
        wfr: &mut Wavefront,
        field: &MagFieldContainer,
        parameters: &[f64],
    ) -> Result<(), EngineError> {
        (**self).calc_elec_field_sr(wfr, field, parameters)
    }

    fn propag_elec_field(
        &self,
        wfr: &mut Wavefront,
        optics: &OpticalContainer,
    ) -> Result<(), EngineError> {
        (**self).propag_elec_field(wfr, optics)
    }

    fn calc_int_from_elec_field(
        &self,
        output: &mut [f64],
        wfr: &Wavefront,
        polarization: Polarization,
        quantity: Quantity,
        dependence: Dependence,
        at: ExtractionPoint,
    ) -> Result<(), EngineError> {
        (**self).calc_int_from_elec_field(output, wfr, polarization, quantity, dependence, at)
    }
}
