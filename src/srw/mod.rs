//! SRW (Synchrotron Radiation Workshop) driver
//!
//! Translates the generic domain model into SRW native records and runs
//! them through an [`SrwEngine`].

pub mod beamline;
pub mod driver;
pub mod engine;
pub mod error;
pub mod native;
pub mod settings;
pub mod simulation;
pub mod source;

pub use driver::{DisplayAxis, FieldMap, SrwDriver};
pub use engine::{Dependence, EngineError, ExtractionPoint, Polarization, Quantity, SrwEngine};
pub use error::DriverError;
pub use native::{OpticalContainer, OpticalElement, RadMesh, Wavefront};
pub use settings::{SrwBeamlineComponentSetting, SrwBendingMagnetSetting, SrwUndulatorSetting};
pub use simulation::SrwSimulation;
