//! Optical components and their arrangement along the beam axis

use crate::settings::{HasSettings, SettingsBag};

/// Longitudinal position of a component, measured from the source (m)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BeamlinePosition {
    z: f64,
}

impl BeamlinePosition {
    pub fn new(z: f64) -> Self {
        Self { z }
    }

    pub fn z(&self) -> f64 {
        self.z
    }
}

/// Thin lens with independent horizontal and vertical focal lengths
#[derive(Debug, Clone)]
pub struct LensIdeal {
    pub name: String,
    /// Horizontal focal length (m)
    pub focal_x: f64,
    /// Vertical focal length (m)
    pub focal_y: f64,
    settings: SettingsBag,
}

impl LensIdeal {
    pub fn new(name: impl Into<String>, focal_x: f64, focal_y: f64) -> Self {
        Self {
            name: name.into(),
            focal_x,
            focal_y,
            settings: SettingsBag::new(),
        }
    }

    pub fn focal_x(&self) -> f64 {
        self.focal_x
    }

    pub fn focal_y(&self) -> f64 {
        self.focal_y
    }
}

/// Observation screen. Has no optical effect.
#[derive(Debug, Clone)]
pub struct ImagePlane {
    pub name: String,
    settings: SettingsBag,
}

impl ImagePlane {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: SettingsBag::new(),
        }
    }
}

/// Rectangular aperture centred on axis
#[derive(Debug, Clone)]
pub struct Aperture {
    pub name: String,
    /// Full horizontal opening (m)
    pub width: f64,
    /// Full vertical opening (m)
    pub height: f64,
    settings: SettingsBag,
}

impl Aperture {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            settings: SettingsBag::new(),
        }
    }
}

macro_rules! impl_has_settings {
    ($($ty:ty),*) => {
        $(
            impl HasSettings for $ty {
                fn settings_bag(&self) -> &SettingsBag {
                    &self.settings
                }

                fn settings_bag_mut(&mut self) -> &mut SettingsBag {
                    &mut self.settings
                }
            }
        )*
    };
}

impl_has_settings!(LensIdeal, ImagePlane, Aperture);

/// Any component that can be placed on a beamline
#[derive(Debug, Clone)]
pub enum BeamlineComponent {
    LensIdeal(LensIdeal),
    ImagePlane(ImagePlane),
    Aperture(Aperture),
}

impl BeamlineComponent {
    pub fn name(&self) -> &str {
        match self {
            BeamlineComponent::LensIdeal(c) => &c.name,
            BeamlineComponent::ImagePlane(c) => &c.name,
            BeamlineComponent::Aperture(c) => &c.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BeamlineComponent::LensIdeal(_) => "lens_ideal",
            BeamlineComponent::ImagePlane(_) => "image_plane",
            BeamlineComponent::Aperture(_) => "aperture",
        }
    }
}

impl HasSettings for BeamlineComponent {
    fn settings_bag(&self) -> &SettingsBag {
        match self {
            BeamlineComponent::LensIdeal(c) => c.settings_bag(),
            BeamlineComponent::ImagePlane(c) => c.settings_bag(),
            BeamlineComponent::Aperture(c) => c.settings_bag(),
        }
    }

    fn settings_bag_mut(&mut self) -> &mut SettingsBag {
        match self {
            BeamlineComponent::LensIdeal(c) => c.settings_bag_mut(),
            BeamlineComponent::ImagePlane(c) => c.settings_bag_mut(),
            BeamlineComponent::Aperture(c) => c.settings_bag_mut(),
        }
    }
}

impl From<LensIdeal> for BeamlineComponent {
    fn from(lens: LensIdeal) -> Self {
        BeamlineComponent::LensIdeal(lens)
    }
}

impl From<ImagePlane> for BeamlineComponent {
    fn from(plane: ImagePlane) -> Self {
        BeamlineComponent::ImagePlane(plane)
    }
}

impl From<Aperture> for BeamlineComponent {
    fn from(aperture: Aperture) -> Self {
        BeamlineComponent::Aperture(aperture)
    }
}

/// Components ordered by increasing z
#[derive(Debug, Clone, Default)]
pub struct Beamline {
    components: Vec<(BeamlineComponent, BeamlinePosition)>,
}

impl Beamline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `component` at `position`, after any component already at the same z
    pub fn attach_component_at(
        &mut self,
        component: impl Into<BeamlineComponent>,
        position: BeamlinePosition,
    ) {
        let index = self
            .components
            .partition_point(|(_, existing)| existing.z() <= position.z());
        self.components.insert(index, (component.into(), position));
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BeamlineComponent, &BeamlinePosition)> {
        self.components.iter().map(|(c, p)| (c, p))
    }

    pub fn component_by_index(&self, index: usize) -> Option<&BeamlineComponent> {
        self.components.get(index).map(|(c, _)| c)
    }

    pub fn component_by_index_mut(&mut self, index: usize) -> Option<&mut BeamlineComponent> {
        self.components.get_mut(index).map(|(c, _)| c)
    }

    pub fn position_by_index(&self, index: usize) -> Option<&BeamlinePosition> {
        self.components.get(index).map(|(_, p)| p)
    }

    /// Position of a component owned by this beamline (compared by identity)
    pub fn position_of(&self, component: &BeamlineComponent) -> Option<&BeamlinePosition> {
        self.components
            .iter()
            .find(|(c, _)| std::ptr::eq(c, component))
            .map(|(_, p)| p)
    }

    /// First component and its position
    pub fn first(&self) -> Option<(&BeamlineComponent, &BeamlinePosition)> {
        self.components.first().map(|(c, p)| (c, p))
    }
}
