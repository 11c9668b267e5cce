//! SrwDriver against a recording stub engine

use std::cell::RefCell;

use num_complex::Complex32;
use pretty_assertions::assert_eq;
use srw_beamline::domain::{
    Aperture, Beamline, BeamlinePosition, BendingMagnet, ElectronBeam, ImagePlane, LensIdeal,
    RadiationSource, Undulator, Wiggler,
};
use srw_beamline::srw::engine::{
    Dependence, EngineError, ExtractionPoint, Polarization, Quantity, SrwEngine,
};
use srw_beamline::srw::native::{
    Drift, MagFieldContainer, OpticalContainer, OpticalElement, ThinLens, Wavefront,
};
use srw_beamline::srw::{
    DriverError, SrwBeamlineComponentSetting, SrwBendingMagnetSetting, SrwDriver,
    SrwUndulatorSetting,
};
use srw_beamline::{DriverConfig, DriverSettings, HasSettings};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Field { parameters: Vec<f64>, nx: usize, ny: usize },
    Propagate { elements: Vec<OpticalElement>, parameters: Vec<Vec<f64>> },
    Extract { polarization: Polarization, quantity: Quantity, energy: f64 },
}

#[derive(Default)]
struct StubEngine {
    calls: RefCell<Vec<Call>>,
    fail_propagation: bool,
}

impl StubEngine {
    fn failing() -> Self {
        Self {
            fail_propagation: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl SrwEngine for StubEngine {
    fn calc_elec_field_sr(
        &self,
        wfr: &mut Wavefront,
        _field: &MagFieldContainer,
        parameters: &[f64],
    ) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(Call::Field {
            parameters: parameters.to_vec(),
            nx: wfr.mesh.nx,
            ny: wfr.mesh.ny,
        });
        wfr.ex.fill(Complex32::new(1.0, -0.5));
        wfr.ey.fill(Complex32::new(0.25, 0.0));
        Ok(())
    }

    fn propag_elec_field(
        &self,
        wfr: &mut Wavefront,
        optics: &OpticalContainer,
    ) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(Call::Propagate {
            elements: optics.elements().to_vec(),
            parameters: optics.propagation_parameters().to_vec(),
        });
        if self.fail_propagation {
            return Err(EngineError::new("PropagElecField", "mesh too coarse"));
        }
        for (element, parameters) in optics.iter() {
            if let OpticalElement::Drift(drift) = element {
                wfr.mesh.z_start += drift.l;
            }
            // Range and resolution factors resize the mesh like SRW does
            let Some(&[range_x, resolution_x, range_y, resolution_y]) = parameters.get(5..9) else {
                continue;
            };
            if range_x != 1.0 || resolution_x != 1.0 || range_y != 1.0 || resolution_y != 1.0 {
                let mut mesh = wfr.mesh.clone();
                mesh.x_start *= range_x;
                mesh.x_fin *= range_x;
                mesh.y_start *= range_y;
                mesh.y_fin *= range_y;
                mesh.nx = (mesh.nx as f64 * range_x * resolution_x).round() as usize;
                mesh.ny = (mesh.ny as f64 * range_y * resolution_y).round() as usize;
                wfr.reallocate(mesh);
            }
        }
        Ok(())
    }

    fn calc_int_from_elec_field(
        &self,
        output: &mut [f64],
        _wfr: &Wavefront,
        polarization: Polarization,
        quantity: Quantity,
        dependence: Dependence,
        at: ExtractionPoint,
    ) -> Result<(), EngineError> {
        assert_eq!(dependence, Dependence::XY);
        self.calls.borrow_mut().push(Call::Extract {
            polarization,
            quantity,
            energy: at.energy,
        });
        for (i, value) in output.iter_mut().enumerate() {
            *value = i as f64;
        }
        Ok(())
    }
}

fn small_config() -> DriverConfig {
    DriverConfig {
        grid_size: 20,
        ..DriverConfig::default()
    }
}

/// Bending magnet, lens at 5 m, screen at 10 m
fn bending_magnet_fixture<E>(driver: &SrwDriver<E>) -> (ElectronBeam, RadiationSource, Beamline)
where
    E: SrwEngine,
{
    let electron_beam = ElectronBeam::pencil(3.0, 0.01, 0.5);
    let magnet = BendingMagnet::new(2.25, 0.4, 4.0).with_acceptance(0.1, 0.02);

    let mut lens = LensIdeal::new("focus lens", 2.5, 2.5);
    let mut lens_setting = SrwBeamlineComponentSetting::default();
    lens_setting.set_resize_resolution_horizontal(2.0);
    lens_setting.set_resize_resolution_vertical(2.0);
    lens.add_settings(driver, lens_setting);

    let mut beamline = Beamline::new();
    beamline.attach_component_at(lens, BeamlinePosition::new(5.0));
    beamline.attach_component_at(ImagePlane::new("Image screen"), BeamlinePosition::new(10.0));

    (electron_beam, magnet.into(), beamline)
}

#[test]
fn test_bending_magnet_translation() {
    let driver = SrwDriver::with_config(StubEngine::default(), DriverConfig::default());
    let (beam, source, beamline) = bending_magnet_fixture(&driver);

    let sim = driver.simulation(&beam, &source, &beamline).unwrap();

    assert_eq!(sim.mesh.nx, 1000);
    assert_eq!(sim.mesh.ny, 1000);
    assert_eq!(sim.mesh.z_start, 5.0);
    assert!((sim.mesh.x_fin - 0.25).abs() < 1e-12);
    assert!((sim.mesh.y_fin - 0.05).abs() < 1e-12);
    assert!((sim.mesh.e_start - 0.5 * 0.123984).abs() < 1e-15);
    assert_eq!(sim.source_parameters, SrwBendingMagnetSetting::default().to_parameter_list());

    assert_eq!(
        sim.optics.elements(),
        &[
            OpticalElement::ThinLens(ThinLens::new(2.5, 2.5)),
            OpticalElement::Drift(Drift { l: 5.0 }),
        ]
    );
    assert_eq!(
        sim.optics.propagation_parameters(),
        &[
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 2.0, 1.0, 2.0],
            SrwBeamlineComponentSetting::default().to_parameter_list(),
        ]
    );

    // Translation alone never calls the engine
    assert!(driver.engine().calls().is_empty());
}

#[test]
fn test_calculate_radiation_runs_field_then_propagation() {
    let driver = SrwDriver::with_config(StubEngine::default(), small_config());
    let (beam, source, beamline) = bending_magnet_fixture(&driver);

    let wavefront = driver.calculate_radiation(&beam, &source, &beamline).unwrap();

    let calls = driver.engine().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        Call::Field {
            parameters: SrwBendingMagnetSetting::default().to_parameter_list(),
            nx: 20,
            ny: 20,
        }
    );
    match &calls[1] {
        Call::Propagate { elements, parameters } => {
            assert_eq!(elements.len(), 2);
            assert_eq!(elements.len(), parameters.len());
        }
        other => panic!("Expected propagation, got {:?}", other),
    }

    assert_eq!(wavefront.mesh.z_start, 10.0);
    assert_eq!(wavefront.part_beam.i_avg, 0.5);
    // Resolution factor 2 on the lens doubles both sample counts
    assert_eq!((wavefront.mesh.nx, wavefront.mesh.ny), (40, 40));
    assert_eq!(wavefront.ex.len(), 1600);
    assert_eq!(wavefront.ey.len(), 1600);
    // Only the first 400 samples were filled: 400 * 1.5 + |400 * 0.25|
    assert!((wavefront.field_checksum() - 700.0).abs() < 1e-9);
}

#[test]
fn test_settings_for_another_driver_are_ignored() {
    let first = SrwDriver::with_config(StubEngine::default(), small_config());
    let second = SrwDriver::with_config(StubEngine::default(), small_config());
    assert_ne!(first.id(), second.id());

    let (beam, source, mut beamline) = bending_magnet_fixture(&first);
    let sim = second.simulation(&beam, &source, &beamline).unwrap();

    let default = SrwBeamlineComponentSetting::default().to_parameter_list();
    assert_eq!(sim.optics.propagation_parameters(), &[default.clone(), default.clone()]);

    let mut range_setting = SrwBeamlineComponentSetting::default();
    range_setting.set_resize_range_horizontal(3.0);
    beamline
        .component_by_index_mut(0)
        .unwrap()
        .add_settings(&second, range_setting);

    let sim = second.simulation(&beam, &source, &beamline).unwrap();
    assert_eq!(
        sim.optics.propagation_parameters()[0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 3.0, 1.0, 1.0, 1.0]
    );
    // The first driver still sees its own resolution override
    let sim = first.simulation(&beam, &source, &beamline).unwrap();
    assert_eq!(
        sim.optics.propagation_parameters()[0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 2.0, 1.0, 2.0]
    );
}

#[test]
fn test_undulator_square_mesh() {
    let driver = SrwDriver::with_config(StubEngine::default(), small_config());
    let beam = ElectronBeam::pencil(6.0, 0.001, 0.2);
    let undulator = Undulator::new(0.02, 100.0, 1.2, 0.0);
    let expected_half_width =
        2.5 * undulator.gaussian_central_cone_divergence(beam.gamma()) * (undulator.length() + 30.0) / 2.0_f64.sqrt();
    let expected_energy = undulator.resonance_energy(beam.gamma(), 0.0, 0.0).trunc();

    let mut beamline = Beamline::new();
    beamline.attach_component_at(ImagePlane::new("screen"), BeamlinePosition::new(30.0));

    let sim = driver.simulation(&beam, &undulator.into(), &beamline).unwrap();
    assert_eq!(sim.mesh.nx, sim.mesh.ny);
    assert!((sim.mesh.x_fin - expected_half_width).abs() < 1e-15);
    assert_eq!(sim.mesh.x_start, -sim.mesh.x_fin);
    assert_eq!(sim.mesh.y_fin, sim.mesh.x_fin);
    assert_eq!(sim.mesh.e_start, expected_energy);
    assert_eq!(sim.mesh.z_start, 32.0);
    // Single image plane at the sampling reference: nothing to propagate through
    assert!(sim.optics.is_empty());
}

#[test]
fn test_intensity_and_phase_extraction() {
    let driver = SrwDriver::with_config(StubEngine::default(), small_config());
    let (beam, source, beamline) = bending_magnet_fixture(&driver);
    let wavefront = driver.calculate_radiation(&beam, &source, &beamline).unwrap();
    let mesh_before = wavefront.mesh.clone();
    let ex_before = wavefront.ex.clone();

    let intensity = driver.calculate_intensity(&wavefront).unwrap();
    assert_eq!(intensity.values.dim(), (40, 40));
    // Row-major (y, x) matches the engine's x-fastest layout
    assert_eq!(intensity.values[[1, 2]], 42.0);
    assert!((intensity.x.min - -0.25e6).abs() < 1e-6);
    assert!((intensity.x.max - 0.25e6).abs() < 1e-6);
    assert!((intensity.y.max - 0.05e6).abs() < 1e-6);
    assert_eq!(intensity.x.count, 40);
    assert_eq!(intensity.y.count, 40);

    let phase = driver.calculate_phase(&wavefront).unwrap();
    assert_eq!(phase.x, intensity.x);
    assert_eq!(phase.y, intensity.y);

    let calls = driver.engine().calls();
    assert_eq!(
        &calls[2..],
        &[
            Call::Extract {
                polarization: Polarization::Total,
                quantity: Quantity::SingleElectronIntensity,
                energy: mesh_before.e_start,
            },
            Call::Extract {
                polarization: Polarization::LinearHorizontal,
                quantity: Quantity::Phase,
                energy: mesh_before.e_start,
            },
        ]
    );

    assert_eq!(wavefront.mesh, mesh_before);
    assert_eq!(wavefront.ex, ex_before);
}

#[test]
fn test_errors_surface_before_engine_calls() {
    let driver = SrwDriver::with_config(StubEngine::default(), small_config());
    let beam = ElectronBeam::pencil(3.0, 0.01, 0.5);
    let magnet: RadiationSource = BendingMagnet::new(2.25, 0.4, 4.0).into();

    let err = driver.calculate_radiation(&beam, &magnet, &Beamline::new()).unwrap_err();
    assert!(matches!(err, DriverError::InvalidBeamline(_)));

    let mut beamline = Beamline::new();
    beamline.attach_component_at(LensIdeal::new("focus", 1.0, 1.0), BeamlinePosition::new(5.0));
    beamline.attach_component_at(Aperture::new("slit", 1e-3, 1e-3), BeamlinePosition::new(8.0));
    let err = driver.calculate_radiation(&beam, &magnet, &beamline).unwrap_err();
    assert!(matches!(err, DriverError::UnsupportedComponent(_)));

    let wiggler: RadiationSource = Wiggler::new(0.1, 20.0, 15.0).into();
    let mut beamline = Beamline::new();
    beamline.attach_component_at(ImagePlane::new("screen"), BeamlinePosition::new(10.0));
    let err = driver.calculate_radiation(&beam, &wiggler, &beamline).unwrap_err();
    assert!(matches!(err, DriverError::UnsupportedSource(_)));

    assert!(driver.engine().calls().is_empty());
}

#[test]
fn test_attached_component_payload_reaches_the_engine_unchanged() {
    let driver = SrwDriver::with_config(StubEngine::default(), small_config());
    let beam = ElectronBeam::pencil(3.0, 0.01, 0.5);
    let magnet: RadiationSource = BendingMagnet::new(2.25, 0.4, 4.0).into();

    let mut lens = LensIdeal::new("focus lens", 2.5, 2.5);
    lens.add_settings(&driver, SrwUndulatorSetting::default());
    let mut beamline = Beamline::new();
    beamline.attach_component_at(lens, BeamlinePosition::new(5.0));

    let sim = driver.simulation(&beam, &magnet, &beamline).unwrap();
    assert_eq!(
        sim.optics.propagation_parameters(),
        &[SrwUndulatorSetting::default().to_parameter_list()]
    );
}

#[test]
fn test_engine_error_is_passed_through() {
    let driver = SrwDriver::with_config(StubEngine::failing(), small_config());
    let (beam, source, beamline) = bending_magnet_fixture(&driver);

    let err = driver.calculate_radiation(&beam, &source, &beamline).unwrap_err();
    match err {
        DriverError::Engine(inner) => {
            assert_eq!(inner, EngineError::new("PropagElecField", "mesh too coarse"));
        }
        other => panic!("Expected engine error, got {:?}", other),
    }
}
