//! Electron beam description

use nalgebra::Vector2;

use super::constants::ELECTRON_REST_ENERGY_GEV;

/// Electron beam entering the radiation source
#[derive(Debug, Clone, PartialEq)]
pub struct ElectronBeam {
    /// Beam energy (GeV)
    pub energy_gev: f64,
    /// Relative energy spread
    pub energy_spread: f64,
    /// Average current (A)
    pub current: f64,
    /// Transverse first moments (m)
    pub position: Vector2<f64>,
}

impl ElectronBeam {
    /// Zero-emittance beam on axis
    pub fn pencil(energy_gev: f64, energy_spread: f64, current: f64) -> Self {
        Self {
            energy_gev,
            energy_spread,
            current,
            position: Vector2::zeros(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Vector2::new(x, y);
        self
    }

    /// Relativistic Lorentz factor
    pub fn gamma(&self) -> f64 {
        self.energy_gev / ELECTRON_REST_ENERGY_GEV
    }

    pub fn average_current(&self) -> f64 {
        self.current
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}
