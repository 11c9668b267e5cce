//! SRW native records
//!
//! Plain Rust mirrors of the structures SRW takes as call arguments
//! (`SRWLPartBeam`, `SRWLMagFld*`, `SRWLRadMesh`, `SRWLWfr`, `SRWLOpt*`).
//! Field names follow the engine's naming so a binding can copy them over
//! one to one.

use num_complex::Complex32;
use serde::Serialize;

/// Statistical first moments of the electron beam at the reference point
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticleMoments {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xp: f64,
    pub yp: f64,
    pub gamma: f64,
}

/// `SRWLPartBeam`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartBeam {
    /// Average current (A)
    pub i_avg: f64,
    pub mom1: ParticleMoments,
}

/// Field orientation of a magnetic harmonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldPlane {
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

/// `SRWLMagFldH`: one harmonic of a periodic field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagFieldHarmonic {
    /// Harmonic number
    pub n: u32,
    pub plane: FieldPlane,
    /// Peak field (T)
    pub b: f64,
    /// Initial phase (rad)
    pub ph: f64,
    /// Symmetry vs longitudinal position: 1 symmetric, -1 anti-symmetric
    pub s: i32,
    /// Coefficient for transverse dependence
    pub a: f64,
}

/// `SRWLMagFldU`: periodic undulator field
#[derive(Debug, Clone, PartialEq)]
pub struct MagFieldUndulator {
    pub harmonics: Vec<MagFieldHarmonic>,
    /// Period length (m)
    pub per: f64,
    /// Number of periods
    pub nper: f64,
}

/// `SRWLMagFldM`: multipole field, used with `m = 1` as a dipole
#[derive(Debug, Clone, PartialEq)]
pub struct MagFieldMultipole {
    /// Field (T) for a dipole
    pub g: f64,
    /// Multipole order
    pub m: u32,
    /// Normal ('n') or skew ('s')
    pub n_or_s: char,
    /// Effective length (m)
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MagField {
    Undulator(MagFieldUndulator),
    Multipole(MagFieldMultipole),
}

/// `SRWLMagFldC`: magnetic elements with their centre positions
#[derive(Debug, Clone, PartialEq)]
pub struct MagFieldContainer {
    pub fields: Vec<MagField>,
    pub xc: Vec<f64>,
    pub yc: Vec<f64>,
    pub zc: Vec<f64>,
}

impl MagFieldContainer {
    /// Single element centred at the origin
    pub fn centered(field: MagField) -> Self {
        Self {
            fields: vec![field],
            xc: vec![0.0],
            yc: vec![0.0],
            zc: vec![0.0],
        }
    }
}

/// `SRWLRadMesh`: transverse sampling grid and photon energy range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadMesh {
    pub e_start: f64,
    pub e_fin: f64,
    pub ne: usize,
    pub x_start: f64,
    pub x_fin: f64,
    pub nx: usize,
    pub y_start: f64,
    pub y_fin: f64,
    pub ny: usize,
    /// Longitudinal position of the sampling plane (m)
    pub z_start: f64,
}

impl RadMesh {
    /// Single-energy grid centred on axis with the given half-widths
    pub fn centered(
        energy: f64,
        half_width_x: f64,
        half_width_y: f64,
        nx: usize,
        ny: usize,
        z_start: f64,
    ) -> Self {
        Self {
            e_start: energy,
            e_fin: energy,
            ne: 1,
            x_start: -half_width_x,
            x_fin: half_width_x,
            nx,
            y_start: -half_width_y,
            y_fin: half_width_y,
            ny,
            z_start,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.ne * self.nx * self.ny
    }
}

/// `SRWLWfr`: the electric field handle
///
/// The engine writes into `ex`/`ey` in place, so a wavefront is passed by
/// `&mut` to exactly one call at a time.
#[derive(Debug, Clone)]
pub struct Wavefront {
    pub mesh: RadMesh,
    pub part_beam: PartBeam,
    /// Horizontal field component, `ne * nx * ny` samples, energy fastest then x
    pub ex: Vec<Complex32>,
    /// Vertical field component, same layout as `ex`
    pub ey: Vec<Complex32>,
}

impl Wavefront {
    /// Allocate zeroed field arrays for `mesh`
    pub fn allocate(mesh: RadMesh, part_beam: PartBeam) -> Self {
        let n = mesh.sample_count();
        Self {
            mesh,
            part_beam,
            ex: vec![Complex32::new(0.0, 0.0); n],
            ey: vec![Complex32::new(0.0, 0.0); n],
        }
    }

    /// Re-size the field arrays after the engine changed the mesh
    pub fn reallocate(&mut self, mesh: RadMesh) {
        let n = mesh.sample_count();
        self.mesh = mesh;
        self.ex.resize(n, Complex32::new(0.0, 0.0));
        self.ey.resize(n, Complex32::new(0.0, 0.0));
    }

    /// Regression checksum: `sum(|ex|)` over the flat float layout plus `|sum(ey)|`
    pub fn field_checksum(&self) -> f64 {
        let ex: f64 = self
            .ex
            .iter()
            .map(|c| c.re.abs() as f64 + c.im.abs() as f64)
            .sum();
        let ey: f64 = self.ey.iter().map(|c| c.re as f64 + c.im as f64).sum();
        ex + ey.abs()
    }
}

/// `SRWLOptD`: free space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    /// Length (m)
    pub l: f64,
}

/// `SRWLOptL`: ideal thin lens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinLens {
    pub fx: f64,
    pub fy: f64,
    /// Transverse centre offsets (m)
    pub x: f64,
    pub y: f64,
}

impl ThinLens {
    pub fn new(fx: f64, fy: f64) -> Self {
        Self { fx, fy, x: 0.0, y: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpticalElement {
    Drift(Drift),
    ThinLens(ThinLens),
}

impl OpticalElement {
    pub fn is_drift(&self) -> bool {
        matches!(self, OpticalElement::Drift(_))
    }
}

/// `SRWLOptC`: element sequence with one propagation parameter list per element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpticalContainer {
    elements: Vec<OpticalElement>,
    propagation_parameters: Vec<Vec<f64>>,
}

impl OpticalContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element together with its propagation parameters
    pub fn push(&mut self, element: OpticalElement, parameters: Vec<f64>) {
        self.elements.push(element);
        self.propagation_parameters.push(parameters);
    }

    pub fn elements(&self) -> &[OpticalElement] {
        &self.elements
    }

    pub fn propagation_parameters(&self) -> &[Vec<f64>] {
        &self.propagation_parameters
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OpticalElement, &[f64])> {
        self.elements
            .iter()
            .zip(self.propagation_parameters.iter().map(|p| p.as_slice()))
    }
}
