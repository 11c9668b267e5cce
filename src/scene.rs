//! JSON scene description of a beamline
//!
//! A scene declares the electron beam, the source and the beamline
//! components, each optionally with an `srw` block of driver settings.

use serde::{Deserialize, Serialize};

use crate::codegen::RegressionReference;
use crate::domain::{
    Aperture, Beamline, BeamlineComponent, BeamlinePosition, BendingMagnet, ElectronBeam, ImagePlane, LensIdeal,
    RadiationSource, Undulator, Wiggler,
};
use crate::settings::{DriverIdentity, HasSettings};
use crate::srw::{SrwBeamlineComponentSetting, SrwBendingMagnetSetting, SrwUndulatorSetting};

/// Top-level scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub electron_beam: ElectronBeamSpec,
    pub source: SourceSpec,
    pub components: Vec<ComponentSpec>,
    /// Photon energy for sources without a natural resonance (eV)
    #[serde(default)]
    pub photon_energy_ev: Option<f64>,
    /// Known results the exported script can check against
    #[serde(default)]
    pub reference: Option<RegressionReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectronBeamSpec {
    pub energy_gev: f64,
    #[serde(default)]
    pub energy_spread: f64,
    pub current: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    Undulator {
        period_length: f64,
        period_number: f64,
        #[serde(default)]
        k_vertical: f64,
        #[serde(default)]
        k_horizontal: f64,
        #[serde(default)]
        srw: Option<SrwUndulatorSetting>,
    },
    BendingMagnet {
        radius: f64,
        magnetic_field: f64,
        length: f64,
        /// (horizontal, vertical) acceptance angles (rad)
        #[serde(default)]
        acceptance: Option<[f64; 2]>,
        #[serde(default)]
        srw: Option<SrwBendingMagnetSetting>,
    },
    Wiggler {
        period_length: f64,
        period_number: f64,
        k_vertical: f64,
    },
}

/// A component at its position along the beamline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default)]
    pub name: String,
    /// Longitudinal position (m)
    pub position: f64,
    #[serde(flatten)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub srw: Option<SrwBeamlineComponentSetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    LensIdeal { focal_x: f64, focal_y: f64 },
    ImagePlane,
    Aperture { width: f64, height: f64 },
}

/// Domain objects built from a scene
#[derive(Debug, Clone)]
pub struct SceneObjects {
    pub electron_beam: ElectronBeam,
    pub source: RadiationSource,
    pub beamline: Beamline,
}

impl Scene {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Build domain objects, attaching `srw` blocks as settings for `driver`
    pub fn build<D: DriverIdentity + ?Sized>(&self, driver: &D) -> SceneObjects {
        let beam = &self.electron_beam;
        let electron_beam = ElectronBeam::pencil(beam.energy_gev, beam.energy_spread, beam.current)
            .with_position(beam.x, beam.y);

        let source = match &self.source {
            SourceSpec::Undulator {
                period_length,
                period_number,
                k_vertical,
                k_horizontal,
                srw,
            } => {
                let mut undulator = Undulator::new(*period_length, *period_number, *k_vertical, *k_horizontal);
                if let Some(settings) = srw {
                    undulator.add_settings(driver, settings.clone());
                }
                RadiationSource::Undulator(undulator)
            }
            SourceSpec::BendingMagnet {
                radius,
                magnetic_field,
                length,
                acceptance,
                srw,
            } => {
                let mut magnet = BendingMagnet::new(*radius, *magnetic_field, *length);
                if let Some([horizontal, vertical]) = acceptance {
                    magnet = magnet.with_acceptance(*horizontal, *vertical);
                }
                if let Some(settings) = srw {
                    magnet.add_settings(driver, settings.clone());
                }
                RadiationSource::BendingMagnet(magnet)
            }
            SourceSpec::Wiggler {
                period_length,
                period_number,
                k_vertical,
            } => RadiationSource::Wiggler(Wiggler::new(*period_length, *period_number, *k_vertical)),
        };

        let mut beamline = Beamline::new();
        for spec in &self.components {
            let mut component: BeamlineComponent = match &spec.kind {
                ComponentKind::LensIdeal { focal_x, focal_y } => {
                    LensIdeal::new(&spec.name, *focal_x, *focal_y).into()
                }
                ComponentKind::ImagePlane => ImagePlane::new(&spec.name).into(),
                ComponentKind::Aperture { width, height } => {
                    Aperture::new(&spec.name, *width, *height).into()
                }
            };
            if let Some(settings) = &spec.srw {
                component.add_settings(driver, settings.clone());
            }
            beamline.attach_component_at(component, BeamlinePosition::new(spec.position));
        }

        SceneObjects {
            electron_beam,
            source,
            beamline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DriverId;

    const BENDING_MAGNET_SCENE: &str = r#"{
        "electron_beam": {"energy_gev": 3.0, "energy_spread": 0.01, "current": 0.5},
        "source": {
            "type": "bending_magnet",
            "radius": 2.25, "magnetic_field": 0.4, "length": 4.0,
            "acceptance": [0.1, 0.02]
        },
        "components": [
            {"type": "image_plane", "name": "Image screen", "position": 10.0},
            {
                "type": "lens_ideal", "name": "focus lens", "position": 5.0,
                "focal_x": 2.5, "focal_y": 2.5,
                "srw": {"resolution_horizontal": 2.0, "resolution_vertical": 2.0}
            }
        ],
        "photon_energy_ev": 0.061992
    }"#;

    #[test]
    fn test_parse_bending_magnet_scene() {
        let scene = Scene::from_json(BENDING_MAGNET_SCENE).unwrap();
        assert_eq!(scene.components.len(), 2);
        assert_eq!(scene.photon_energy_ev, Some(0.061992));
        assert!(matches!(scene.source, SourceSpec::BendingMagnet { .. }));
        assert!(matches!(scene.components[1].kind, ComponentKind::LensIdeal { focal_x, .. } if focal_x == 2.5));
    }

    #[test]
    fn test_build_attaches_settings_to_driver() {
        let scene = Scene::from_json(BENDING_MAGNET_SCENE).unwrap();
        let driver = DriverId::next();
        let objects = scene.build(&driver);

        assert_eq!(objects.beamline.len(), 2);
        let (first, position) = objects.beamline.first().unwrap();
        assert_eq!(first.name(), "focus lens");
        assert_eq!(position.z(), 5.0);
        assert!(first.has_settings(&driver));
        assert!(!first.has_settings(&DriverId::next()));

        let settings: SrwBeamlineComponentSetting = first.settings(&driver).unwrap();
        assert_eq!(settings.resolution_horizontal, 2.0);

        let RadiationSource::BendingMagnet(magnet) = &objects.source else {
            panic!("Expected bending magnet");
        };
        assert_eq!(magnet.acceptance, (0.1, 0.02));
        assert!(!magnet.has_settings(&driver));
        assert!((objects.electron_beam.gamma() - 5870.85).abs() < 0.1);
    }

    #[test]
    fn test_parse_undulator_source() {
        let json = r#"{
            "type": "undulator", "period_length": 0.02, "period_number": 100,
            "k_vertical": 1.2, "srw": {"relative_precision": 0.005}
        }"#;
        let source: SourceSpec = serde_json::from_str(json).unwrap();
        match source {
            SourceSpec::Undulator { k_horizontal, srw, .. } => {
                assert_eq!(k_horizontal, 0.0);
                assert_eq!(srw.unwrap().precision.relative_precision, 0.005);
            }
            _ => panic!("Expected undulator"),
        }
    }

    #[test]
    fn test_unknown_component_type_is_rejected() {
        let json = r#"{"type": "mirror", "position": 1.0}"#;
        assert!(serde_json::from_str::<ComponentSpec>(json).is_err());
    }
}
