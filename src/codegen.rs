//! Python code generation for SRW simulations

use anyhow::Result;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::srw::native::{MagField, OpticalElement};
use crate::srw::{Dependence, Polarization, Quantity, SrwSimulation};
use crate::{DriverConfig, LengthUnit};

const SRW_TEMPLATE: &str = r##"#!/usr/bin/env python3
"""
SRW wavefront simulation - auto-generated from a beamline description
{{ header_comment }}

Generated: {{ timestamp }}
Source: {{ source_kind }}
Display unit: {{ display_unit }}
"""

import argparse
import os
from array import array
from copy import deepcopy

import numpy as np
from srwlib import *

# =============================================================================
# Simulation Parameters
# =============================================================================

# CalcElecFieldSR precision parameters
SOURCE_PARAMETERS = [{{ source_parameters|join(", ") }}]

# Mesh bounds are multiplied by this for display
DISPLAY_SCALE = {{ display_scale }}


# =============================================================================
# Electron Beam
# =============================================================================

def build_electron_beam():
    """Pencil electron beam."""
    part_beam = SRWLPartBeam()
    part_beam.Iavg = {{ beam.i_avg }}
    part_beam.partStatMom1.x = {{ beam.mom1.x }}
    part_beam.partStatMom1.y = {{ beam.mom1.y }}
    part_beam.partStatMom1.z = {{ beam.mom1.z }}
    part_beam.partStatMom1.xp = {{ beam.mom1.xp }}
    part_beam.partStatMom1.yp = {{ beam.mom1.yp }}
    part_beam.partStatMom1.gamma = {{ beam.mom1.gamma }}
    return part_beam


# =============================================================================
# Magnetic Field
# =============================================================================

def build_magnetic_field():
    """Build the SRW magnetic field container."""
    fields = []
{% for field in fields %}
{% if field.type == "undulator" %}
    harmonics = []
{% for h in field.harmonics %}
    harmonics.append(SRWLMagFldH({{ h.n }}, '{{ h.plane }}', {{ h.b }}, {{ h.ph }}, {{ h.s }}, {{ h.a }}))
{% endfor %}
    fields.append(SRWLMagFldU(harmonics, {{ field.per }}, {{ field.nper|int }}))
{% elif field.type == "multipole" %}
    fields.append(SRWLMagFldM({{ field.g }}, {{ field.m }}, '{{ field.n_or_s }}', {{ field.length }}))
{% endif %}
{% endfor %}

    return SRWLMagFldC(fields,
                       array('d', [{{ xc|join(", ") }}]),
                       array('d', [{{ yc|join(", ") }}]),
                       array('d', [{{ zc|join(", ") }}]))


# =============================================================================
# Wavefront
# =============================================================================

def build_wavefront(part_beam):
    """Allocate the initial wavefront on the sampling plane."""
    wfr = SRWLWfr()
    wfr.allocate({{ mesh.ne }}, {{ mesh.nx }}, {{ mesh.ny }})
    wfr.mesh.zStart = {{ mesh.z_start }}
    wfr.mesh.eStart = {{ mesh.e_start }}
    wfr.mesh.eFin = {{ mesh.e_fin }}
    wfr.mesh.xStart = {{ mesh.x_start }}
    wfr.mesh.xFin = {{ mesh.x_fin }}
    wfr.mesh.yStart = {{ mesh.y_start }}
    wfr.mesh.yFin = {{ mesh.y_fin }}
    wfr.partBeam = part_beam
    return wfr


# =============================================================================
# Optics
# =============================================================================

def build_optics():
    """Build the SRW optical container."""
    elements = []
    propagation_parameters = []
{% for el in optics %}

{% if el.type == "drift" %}
    elements.append(SRWLOptD({{ el.l }}))
{% elif el.type == "thin_lens" %}
    elements.append(SRWLOptL({{ el.fx }}, {{ el.fy }}, {{ el.x }}, {{ el.y }}))
{% endif %}
    propagation_parameters.append([{{ el.params|join(", ") }}])
{% endfor %}

    return SRWLOptC(elements, propagation_parameters)


# =============================================================================
# Main Simulation
# =============================================================================

def extract(wfr, polarization, quantity, typecode):
    mesh = deepcopy(wfr.mesh)
    values = array(typecode, [0] * mesh.nx * mesh.ny)
    srwl.CalcIntFromElecField(values, wfr, polarization, quantity, {{ dependence }}, mesh.eStart, 0, 0)
    values = np.array(values).reshape((mesh.ny, mesh.nx))
    x_axis = [DISPLAY_SCALE * mesh.xStart, DISPLAY_SCALE * mesh.xFin, mesh.nx]
    y_axis = [DISPLAY_SCALE * mesh.yStart, DISPLAY_SCALE * mesh.yFin, mesh.ny]
    return values, x_axis, y_axis


def run_simulation(output_dir="output", plot=False, check=False):
    """Compute the source field and propagate it."""

    os.makedirs(output_dir, exist_ok=True)

    print("=" * 60)
    print("SRW Wavefront Simulation")
    print("=" * 60)

    wfr = build_wavefront(build_electron_beam())

    print("Computing source field...")
    srwl.CalcElecFieldSR(wfr, 0, build_magnetic_field(), SOURCE_PARAMETERS)

    print("Propagating...")
    srwl.PropagElecField(wfr, build_optics())

    intensity, x_axis, y_axis = extract(wfr, {{ intensity_polarization }}, {{ intensity_quantity }}, 'f')
    phase, _, _ = extract(wfr, {{ phase_polarization }}, {{ phase_quantity }}, 'd')

    checksum = np.sum(np.abs(np.array(wfr.arEx))) + np.abs(np.sum(np.array(wfr.arEy)))
    print(f"Field checksum: {checksum:.7e}")
{% if reference %}

    if check:
        value = intensity[{{ reference.intensity_index[0] }}, {{ reference.intensity_index[1] }}]
        assert abs(value - {{ reference.intensity }}) < {{ reference.intensity_tolerance }}, \
            f"Intensity at ({{ reference.intensity_index[0] }}, {{ reference.intensity_index[1] }}) is {value:.7e}, expected {{ reference.intensity }}"
        assert abs(checksum - {{ reference.checksum }}) < {{ reference.checksum_tolerance }}, \
            f"Field checksum is {checksum:.7e}, expected {{ reference.checksum }}"
        print("Reference values reproduced")
{% endif %}

    np.savez(f"{output_dir}/results.npz",
             intensity=intensity, phase=phase,
             x_axis=x_axis, y_axis=y_axis)
    print(f"Results saved to {output_dir}/results.npz")

    if plot:
        plot_results(intensity, x_axis, y_axis, output_dir)

    return intensity, x_axis, y_axis


def plot_results(intensity, x_axis, y_axis, output_dir):
    """Plot the intensity at the end of the beamline."""
    try:
        import matplotlib.pyplot as plt
    except ImportError:
        print("matplotlib not available, skipping plots")
        return

    x = np.linspace(x_axis[0], x_axis[1], int(x_axis[2]))
    y = np.linspace(y_axis[0], y_axis[1], int(y_axis[2]))

    fig, ax = plt.subplots(figsize=(8, 6))
    mesh = ax.pcolormesh(x, y, intensity)
    fig.colorbar(mesh, ax=ax)
    ax.set_xlabel("x ({{ display_unit }})")
    ax.set_ylabel("y ({{ display_unit }})")
    ax.set_title("Intensity")

    plt.tight_layout()
    plt.savefig(f"{output_dir}/intensity.png", dpi=150)
    print(f"Plot saved to {output_dir}/intensity.png")
    plt.close()


# =============================================================================
# Entry Point
# =============================================================================

if __name__ == "__main__":
    parser = argparse.ArgumentParser(description="SRW Wavefront Simulation")
    parser.add_argument("--plot", action="store_true", help="Generate plots")
    parser.add_argument("--output", type=str, default="output", help="Output directory")
{% if reference %}
    parser.add_argument("--check", action="store_true", help="Compare against the reference values")
{% endif %}

    args = parser.parse_args()

{% if reference %}
    run_simulation(output_dir=args.output, plot=args.plot, check=args.check)
{% else %}
    run_simulation(output_dir=args.output, plot=args.plot)
{% endif %}
"##;

/// Known results of a scene, checked by the script when run with `--check`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReference {
    /// (row, column) of the intensity sample to compare
    pub intensity_index: [usize; 2],
    pub intensity: f64,
    pub intensity_tolerance: f64,
    /// `sum(|ex|) + |sum(ey)|` over the propagated field
    pub checksum: f64,
    pub checksum_tolerance: f64,
}

/// Generate an srwlib Python script from a translated simulation
pub fn generate_srw_script(
    sim: &SrwSimulation,
    config: &DriverConfig,
    reference: Option<&RegressionReference>,
) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("srw", SRW_TEMPLATE)?;

    let template = env.get_template("srw")?;

    let fields: Vec<_> = sim.magnetic_field.fields.iter().map(|field| match field {
        MagField::Undulator(und) => serde_json::json!({
            "type": "undulator",
            "harmonics": und.harmonics,
            "per": und.per,
            "nper": und.nper,
        }),
        MagField::Multipole(mult) => serde_json::json!({
            "type": "multipole",
            "g": mult.g,
            "m": mult.m,
            "n_or_s": mult.n_or_s.to_string(),
            "length": mult.length,
        }),
    }).collect();

    let optics: Vec<_> = sim.optics.iter().map(|(element, params)| match element {
        OpticalElement::Drift(drift) => serde_json::json!({
            "type": "drift",
            "l": drift.l,
            "params": params,
        }),
        OpticalElement::ThinLens(lens) => serde_json::json!({
            "type": "thin_lens",
            "fx": lens.fx,
            "fy": lens.fy,
            "x": lens.x,
            "y": lens.y,
            "params": params,
        }),
    }).collect();

    let output = template.render(context! {
        header_comment => "Translated from a generic beamline description",
        timestamp => chrono::Utc::now().to_rfc3339(),
        source_kind => sim.source_kind,
        display_unit => config.display_unit.symbol(),
        display_scale => LengthUnit::Meter.scale_to(&config.display_unit),
        source_parameters => sim.source_parameters,
        beam => sim.part_beam,
        fields => fields,
        xc => sim.magnetic_field.xc,
        yc => sim.magnetic_field.yc,
        zc => sim.magnetic_field.zc,
        mesh => sim.mesh,
        optics => optics,
        dependence => Dependence::XY as i32,
        intensity_polarization => Polarization::Total as i32,
        intensity_quantity => Quantity::SingleElectronIntensity as i32,
        phase_polarization => Polarization::LinearHorizontal as i32,
        phase_quantity => Quantity::Phase as i32,
        reference => reference,
    })?;

    Ok(output)
}
