//! SRW settings payloads
//!
//! These are attached to domain objects through [`crate::settings::HasSettings`]
//! and flattened into the positional lists SRW expects.

use serde::{Deserialize, Serialize};

use crate::settings::DriverSettings;

/// Field computation method (`arPrecPar[0]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    Manual = 0,
    AutoUndulator = 1,
    AutoWiggler = 2,
}

/// Precision parameters for `CalcElecFieldSR`, shared by all source kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrwPrecision {
    pub relative_precision: f64,
    /// Longitudinal integration start (m); 0 with `z_end_integration` 0 means the whole field
    pub z_start_integration: f64,
    pub z_end_integration: f64,
    /// Number of trajectory points (only used by the manual method)
    pub trajectory_points: u32,
    pub use_terminating_terms: bool,
    /// Sampling factor for propagation; 0 disables automatic mesh sizing
    pub sampling_factor: f64,
}

impl Default for SrwPrecision {
    fn default() -> Self {
        Self {
            relative_precision: 0.01,
            z_start_integration: 0.0,
            z_end_integration: 0.0,
            trajectory_points: 20000,
            use_terminating_terms: true,
            sampling_factor: 0.0,
        }
    }
}

impl SrwPrecision {
    fn to_list(&self, method: IntegrationMethod) -> Vec<f64> {
        vec![
            method as i32 as f64,
            self.relative_precision,
            self.z_start_integration,
            self.z_end_integration,
            self.trajectory_points as f64,
            flag(self.use_terminating_terms),
            self.sampling_factor,
        ]
    }
}

/// SRW settings for undulator sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrwUndulatorSetting {
    pub method: IntegrationMethod,
    #[serde(flatten)]
    pub precision: SrwPrecision,
}

impl Default for SrwUndulatorSetting {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::AutoUndulator,
            precision: SrwPrecision::default(),
        }
    }
}

impl DriverSettings for SrwUndulatorSetting {
    fn to_parameter_list(&self) -> Vec<f64> {
        self.precision.to_list(self.method)
    }

    crate::settings_boilerplate!();
}

/// SRW settings for bending magnet sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrwBendingMagnetSetting {
    pub method: IntegrationMethod,
    #[serde(flatten)]
    pub precision: SrwPrecision,
}

impl Default for SrwBendingMagnetSetting {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::AutoWiggler,
            precision: SrwPrecision::default(),
        }
    }
}

impl DriverSettings for SrwBendingMagnetSetting {
    fn to_parameter_list(&self) -> Vec<f64> {
        self.precision.to_list(self.method)
    }

    crate::settings_boilerplate!();
}

/// Propagation parameters of one optical element (`SRWLOptC.arProp` entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrwBeamlineComponentSetting {
    pub auto_resize_before: bool,
    pub auto_resize_after: bool,
    pub relative_precision: f64,
    pub semi_analytical_phase: bool,
    pub fourier_resize: bool,
    pub range_horizontal: f64,
    pub resolution_horizontal: f64,
    pub range_vertical: f64,
    pub resolution_vertical: f64,
}

impl Default for SrwBeamlineComponentSetting {
    fn default() -> Self {
        Self {
            auto_resize_before: false,
            auto_resize_after: false,
            relative_precision: 1.0,
            semi_analytical_phase: false,
            fourier_resize: false,
            range_horizontal: 1.0,
            resolution_horizontal: 1.0,
            range_vertical: 1.0,
            resolution_vertical: 1.0,
        }
    }
}

impl SrwBeamlineComponentSetting {
    pub fn set_resize_range_horizontal(&mut self, factor: f64) {
        self.range_horizontal = factor;
    }

    pub fn set_resize_range_vertical(&mut self, factor: f64) {
        self.range_vertical = factor;
    }

    pub fn set_resize_resolution_horizontal(&mut self, factor: f64) {
        self.resolution_horizontal = factor;
    }

    pub fn set_resize_resolution_vertical(&mut self, factor: f64) {
        self.resolution_vertical = factor;
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl DriverSettings for SrwBeamlineComponentSetting {
    fn to_parameter_list(&self) -> Vec<f64> {
        vec![
            flag(self.auto_resize_before),
            flag(self.auto_resize_after),
            self.relative_precision,
            flag(self.semi_analytical_phase),
            flag(self.fourier_resize),
            self.range_horizontal,
            self.resolution_horizontal,
            self.range_vertical,
            self.resolution_vertical,
        ]
    }

    crate::settings_boilerplate!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists() {
        assert_eq!(
            SrwUndulatorSetting::default().to_parameter_list(),
            vec![1.0, 0.01, 0.0, 0.0, 20000.0, 1.0, 0.0]
        );
        assert_eq!(
            SrwBendingMagnetSetting::default().to_parameter_list(),
            vec![2.0, 0.01, 0.0, 0.0, 20000.0, 1.0, 0.0]
        );
        assert_eq!(
            SrwBeamlineComponentSetting::default().to_parameter_list(),
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_resize_resolution() {
        let mut setting = SrwBeamlineComponentSetting::default();
        setting.set_resize_resolution_horizontal(2.0);
        setting.set_resize_resolution_vertical(2.0);
        let list = setting.to_parameter_list();
        assert_eq!(list[6], 2.0);
        assert_eq!(list[8], 2.0);
        assert_eq!(list[5], 1.0);
    }

    #[test]
    fn test_parse_partial_settings() {
        let json = r#"{"resolution_horizontal": 2.0, "auto_resize_after": true}"#;
        let setting: SrwBeamlineComponentSetting = serde_json::from_str(json).unwrap();
        assert_eq!(setting.resolution_horizontal, 2.0);
        assert!(setting.auto_resize_after);
        assert_eq!(setting.range_vertical, 1.0);

        let json = r#"{"method": "manual", "trajectory_points": 5000}"#;
        let setting: SrwUndulatorSetting = serde_json::from_str(json).unwrap();
        assert_eq!(setting.method, IntegrationMethod::Manual);
        assert_eq!(setting.to_parameter_list()[4], 5000.0);

        let setting: SrwBendingMagnetSetting = serde_json::from_str(r#"{"relative_precision": 0.001}"#).unwrap();
        assert_eq!(setting.method, IntegrationMethod::AutoWiggler);
        assert_eq!(setting.to_parameter_list()[1], 0.001);
    }
}
