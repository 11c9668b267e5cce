//! Beamline translation: optical elements plus implicit drifts
//!
//! Components are walked in order of increasing z. Free space between two
//! consecutive positions becomes an explicit drift. Supported component
//! kinds implement [`SrwComponent`].

use tracing::debug;

use super::error::{DriverError, Result};
use super::native::{Drift, OpticalContainer, OpticalElement, ThinLens};
use super::settings::SrwBeamlineComponentSetting;
use crate::domain::{Beamline, BeamlineComponent, ImagePlane, LensIdeal};
use crate::settings::{DriverId, DriverSettings, HasSettings};

/// SRW view of a beamline component
pub trait SrwComponent {
    /// The SRW optical element, or `None` for components without optical effect
    fn optical_element(&self) -> Option<OpticalElement>;
}

impl SrwComponent for LensIdeal {
    fn optical_element(&self) -> Option<OpticalElement> {
        Some(OpticalElement::ThinLens(ThinLens::new(self.focal_x(), self.focal_y())))
    }
}

impl SrwComponent for ImagePlane {
    fn optical_element(&self) -> Option<OpticalElement> {
        None
    }
}

/// Pick the SRW translation for `component`
pub fn srw_component(component: &BeamlineComponent) -> Result<&dyn SrwComponent> {
    match component {
        BeamlineComponent::LensIdeal(lens) => Ok(lens as &dyn SrwComponent),
        BeamlineComponent::ImagePlane(plane) => Ok(plane as &dyn SrwComponent),
        other => Err(DriverError::UnsupportedComponent(format!(
            "{} '{}'",
            other.kind(),
            other.name()
        ))),
    }
}

/// z of the first component, after checking every position is finite
pub fn reference_plane(beamline: &Beamline) -> Result<f64> {
    let (_, first) = beamline
        .first()
        .ok_or_else(|| DriverError::InvalidBeamline("beamline has no components".to_string()))?;

    if let Some((component, position)) = beamline.iter().find(|(_, p)| !p.z().is_finite()) {
        return Err(DriverError::InvalidBeamline(format!(
            "'{}' has non-finite position {}",
            component.name(),
            position.z()
        )));
    }

    Ok(first.z())
}

/// Translate `beamline` into an SRW optical container for `driver`
///
/// `reference_z` is the sampling plane returned by [`reference_plane`].
pub fn translate_beamline(
    beamline: &Beamline,
    reference_z: f64,
    driver: DriverId,
) -> Result<OpticalContainer> {
    let mut current_z = reference_z;
    let mut optics = OpticalContainer::new();

    for (component, position) in beamline.iter() {
        let srw = srw_component(component)?;
        let z = position.z();

        if z > current_z {
            let length = z - current_z;
            debug!("Drift of {:.4} m before '{}'", length, component.name());
            optics.push(
                OpticalElement::Drift(Drift { l: length }),
                SrwBeamlineComponentSetting::default().to_parameter_list(),
            );
            current_z = z;
        }

        if let Some(element) = srw.optical_element() {
            debug!("Element '{}' at z = {:.4} m", component.name(), z);
            let parameters = component.settings_parameters::<SrwBeamlineComponentSetting, _>(&driver);
            optics.push(element, parameters);
        }
    }

    Ok(optics)
}
