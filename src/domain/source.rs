//! Radiation sources (magnetic structures)

use std::f64::consts::PI;

use super::constants::{ELECTRON_MASS, ELEMENTARY_CHARGE, PLANCK, SPEED_OF_LIGHT};
use crate::settings::{HasSettings, SettingsBag};

/// Planar or elliptical undulator
#[derive(Debug, Clone)]
pub struct Undulator {
    /// Period length (m)
    pub period_length: f64,
    /// Number of periods
    pub period_number: f64,
    /// Vertical deflection parameter
    pub k_vertical: f64,
    /// Horizontal deflection parameter
    pub k_horizontal: f64,
    settings: SettingsBag,
}

impl Undulator {
    pub fn new(period_length: f64, period_number: f64, k_vertical: f64, k_horizontal: f64) -> Self {
        Self {
            period_length,
            period_number,
            k_vertical,
            k_horizontal,
            settings: SettingsBag::new(),
        }
    }

    pub fn period_length(&self) -> f64 {
        self.period_length
    }

    pub fn period_number(&self) -> f64 {
        self.period_number
    }

    pub fn k_vertical(&self) -> f64 {
        self.k_vertical
    }

    pub fn k_horizontal(&self) -> f64 {
        self.k_horizontal
    }

    /// Magnetic length (m)
    pub fn length(&self) -> f64 {
        self.period_length * self.period_number
    }

    /// Peak field producing the vertical deflection parameter (T)
    pub fn b_vertical(&self) -> f64 {
        self.k_to_field(self.k_vertical)
    }

    /// Peak field producing the horizontal deflection parameter (T)
    pub fn b_horizontal(&self) -> f64 {
        self.k_to_field(self.k_horizontal)
    }

    fn k_to_field(&self, k: f64) -> f64 {
        2.0 * PI * ELECTRON_MASS * SPEED_OF_LIGHT * k / (ELEMENTARY_CHARGE * self.period_length)
    }

    /// First harmonic wavelength observed at angles `(theta_x, theta_y)` (m)
    pub fn resonance_wavelength(&self, gamma: f64, theta_x: f64, theta_y: f64) -> f64 {
        (self.period_length / (2.0 * gamma * gamma))
            * (1.0
                + self.k_vertical.powi(2) / 2.0
                + self.k_horizontal.powi(2) / 2.0
                + gamma * gamma * (theta_x * theta_x + theta_y * theta_y))
    }

    /// First harmonic photon energy (eV)
    pub fn resonance_energy(&self, gamma: f64, theta_x: f64, theta_y: f64) -> f64 {
        PLANCK * SPEED_OF_LIGHT / ELEMENTARY_CHARGE / self.resonance_wavelength(gamma, theta_x, theta_y)
    }

    /// RMS divergence of the gaussian central cone of the first harmonic (rad)
    pub fn gaussian_central_cone_divergence(&self, gamma: f64) -> f64 {
        (1.0 / gamma)
            * ((1.0 + self.k_horizontal.powi(2) / 2.0 + self.k_vertical.powi(2) / 2.0)
                / (2.0 * self.period_number))
                .sqrt()
    }
}

impl HasSettings for Undulator {
    fn settings_bag(&self) -> &SettingsBag {
        &self.settings
    }

    fn settings_bag_mut(&mut self) -> &mut SettingsBag {
        &mut self.settings
    }
}

/// Dipole bending magnet
#[derive(Debug, Clone)]
pub struct BendingMagnet {
    /// Bending radius (m)
    pub radius: f64,
    /// Field strength (T)
    pub magnetic_field: f64,
    /// Magnetic length (m)
    pub length: f64,
    /// Accepted (horizontal, vertical) emission angles (rad)
    pub acceptance: (f64, f64),
    settings: SettingsBag,
}

impl BendingMagnet {
    pub const DEFAULT_ACCEPTANCE: (f64, f64) = (0.1, 0.02);

    pub fn new(radius: f64, magnetic_field: f64, length: f64) -> Self {
        Self {
            radius,
            magnetic_field,
            length,
            acceptance: Self::DEFAULT_ACCEPTANCE,
            settings: SettingsBag::new(),
        }
    }

    pub fn with_acceptance(mut self, horizontal: f64, vertical: f64) -> Self {
        self.acceptance = (horizontal, vertical);
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn magnetic_field(&self) -> f64 {
        self.magnetic_field
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn horizontal_acceptance(&self) -> f64 {
        self.acceptance.0
    }

    pub fn vertical_acceptance(&self) -> f64 {
        self.acceptance.1
    }
}

impl HasSettings for BendingMagnet {
    fn settings_bag(&self) -> &SettingsBag {
        &self.settings
    }

    fn settings_bag_mut(&mut self) -> &mut SettingsBag {
        &mut self.settings
    }
}

/// Multipole wiggler
#[derive(Debug, Clone)]
pub struct Wiggler {
    pub period_length: f64,
    pub period_number: f64,
    pub k_vertical: f64,
    settings: SettingsBag,
}

impl Wiggler {
    pub fn new(period_length: f64, period_number: f64, k_vertical: f64) -> Self {
        Self {
            period_length,
            period_number,
            k_vertical,
            settings: SettingsBag::new(),
        }
    }

    pub fn length(&self) -> f64 {
        self.period_length * self.period_number
    }
}

impl HasSettings for Wiggler {
    fn settings_bag(&self) -> &SettingsBag {
        &self.settings
    }

    fn settings_bag_mut(&mut self) -> &mut SettingsBag {
        &mut self.settings
    }
}

/// Any radiation source a beamline can start from
#[derive(Debug, Clone)]
pub enum RadiationSource {
    Undulator(Undulator),
    BendingMagnet(BendingMagnet),
    Wiggler(Wiggler),
}

impl RadiationSource {
    pub fn kind(&self) -> &'static str {
        match self {
            RadiationSource::Undulator(_) => "undulator",
            RadiationSource::BendingMagnet(_) => "bending_magnet",
            RadiationSource::Wiggler(_) => "wiggler",
        }
    }
}

impl From<Undulator> for RadiationSource {
    fn from(undulator: Undulator) -> Self {
        RadiationSource::Undulator(undulator)
    }
}

impl From<BendingMagnet> for RadiationSource {
    fn from(magnet: BendingMagnet) -> Self {
        RadiationSource::BendingMagnet(magnet)
    }
}

impl From<Wiggler> for RadiationSource {
    fn from(wiggler: Wiggler) -> Self {
        RadiationSource::Wiggler(wiggler)
    }
}
