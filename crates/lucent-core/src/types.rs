//! Core types shared across the Lucent framework.
//!
//! This module defines the data structures exchanged with the transport
//! engine: tissue layers and stacks, the scoring grid, and the result
//! container returned to callers.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Thickness of a tissue layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thickness {
    /// A finite slab (mm, must be > 0).
    Millimetres(f64),
    /// Unbounded below; only valid for the last layer of a stack.
    SemiInfinite,
}

impl Thickness {
    /// Thickness in mm, `f64::INFINITY` for semi-infinite layers.
    pub fn as_mm(&self) -> f64 {
        match self {
            Thickness::Millimetres(mm) => *mm,
            Thickness::SemiInfinite => f64::INFINITY,
        }
    }
}

/// A single tissue layer with its optical coefficients at the simulation
/// wavelength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Display name carried through to results.
    pub name: String,
    pub thickness: Thickness,
    /// Refractive index.
    pub n: f64,
    /// Absorption coefficient (mm⁻¹).
    pub mu_a_per_mm: f64,
    /// Scattering coefficient (mm⁻¹).
    pub mu_s_per_mm: f64,
    /// Scattering anisotropy factor.
    pub g: f64,
}

impl Layer {
    /// Total interaction coefficient μt = μa + μs (mm⁻¹).
    pub fn mu_t_per_mm(&self) -> f64 {
        self.mu_a_per_mm + self.mu_s_per_mm
    }

    /// Single-scattering albedo μs/μt, zero for a vacuum-like layer.
    pub fn albedo(&self) -> f64 {
        let mu_t = self.mu_t_per_mm();
        if mu_t > 0.0 {
            self.mu_s_per_mm / mu_t
        } else {
            0.0
        }
    }
}

/// An ordered sequence of layers defining a 1-D planar medium.
///
/// The first layer is the entry surface. Construction is unchecked; the
/// transport engine validates the stack (non-empty, positive finite
/// thicknesses, at most one semi-infinite layer and only in last position)
/// and reports violations as an input error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TissueStack {
    pub layers: Vec<Layer>,
}

impl TissueStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// A single semi-infinite slab, the most common quick-simulation case.
    pub fn semi_infinite_slab(
        name: impl Into<String>,
        n: f64,
        mu_a_per_mm: f64,
        mu_s_per_mm: f64,
        g: f64,
    ) -> Self {
        Self::new(vec![Layer {
            name: name.into(),
            thickness: Thickness::SemiInfinite,
            n,
            mu_a_per_mm,
            mu_s_per_mm,
            g,
        }])
    }
}

/// Scoring grid for absorption/fluence tallies.
///
/// Resolution and extent are simulation parameters, not physical constants:
/// photons propagating beyond the grid still contribute to the totals, they
/// are just not spatially resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of depth bins.
    pub n_z: usize,
    /// Number of radial bins.
    pub n_r: usize,
    /// Maximum scored depth (mm).
    pub z_max_mm: f64,
    /// Maximum scored radius (mm).
    pub r_max_mm: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            n_z: 200,
            n_r: 100,
            z_max_mm: 10.0,
            r_max_mm: 10.0,
        }
    }
}

impl GridSpec {
    /// Depth bin width (mm).
    pub fn dz_mm(&self) -> f64 {
        self.z_max_mm / self.n_z as f64
    }

    /// Radial bin width (mm).
    pub fn dr_mm(&self) -> f64 {
        self.r_max_mm / self.n_r as f64
    }

    /// Bin-centre depths (mm).
    pub fn z_centres_mm(&self) -> Vec<f64> {
        let dz = self.dz_mm();
        (0..self.n_z).map(|i| (i as f64 + 0.5) * dz).collect()
    }

    /// Bin-centre radii (mm).
    pub fn r_centres_mm(&self) -> Vec<f64> {
        let dr = self.dr_mm();
        (0..self.n_r).map(|i| (i as f64 + 0.5) * dr).collect()
    }
}

/// Parameters of a single transport run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Wavelength the layer coefficients were evaluated at (nm, metadata).
    pub wavelength_nm: f64,
    /// Number of photon packets to launch.
    pub n_photons: usize,
    /// Seed driving the entire run.
    pub seed: u64,
    #[serde(default)]
    pub grid: GridSpec,
}

/// Depth-profile metrics derived from the scored fluence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenetrationMetrics {
    /// Depth at which fluence falls to 1/e of its surface-bin value (mm).
    pub depth_1e_mm: f64,
    /// Depth at which fluence falls to 1/e² of its surface-bin value (mm).
    pub depth_1e2_mm: f64,
    /// Effective attenuation coefficient from a log-linear fit of the
    /// fluence profile (mm⁻¹); `None` when too few bins carry signal.
    pub fitted_mu_eff_per_mm: Option<f64>,
}

/// Complete results of one Monte Carlo transport run.
///
/// Immutable once produced; owned by the caller. All fractions are
/// normalized per launched photon actually traced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Wavelength metadata echoed from the request (nm).
    pub wavelength_nm: f64,
    /// Photons requested.
    pub photons_requested: usize,
    /// Photons actually traced (smaller than requested only for
    /// under-sampled runs).
    pub photons_traced: usize,
    /// Seed the run was driven by.
    pub seed: u64,
    /// Grid the spatial tallies were scored on.
    pub grid: GridSpec,

    /// Total diffuse + specular reflectance fraction.
    pub reflectance: f64,
    /// Total transmittance fraction.
    pub transmittance: f64,
    /// Total absorbed fraction.
    pub absorbed_fraction: f64,

    /// Fluence versus depth (per mm, normalized per photon).
    pub fluence_z: Vec<f64>,
    /// Absorbed energy fraction per (radius, depth) bin, normalized per
    /// photon and per bin volume (mm⁻³).
    pub absorption_rz: Array2<f64>,

    pub penetration: PenetrationMetrics,

    /// True when the run hit its wall-clock cutoff or was cancelled before
    /// tracing the full photon budget. The statistics remain unbiased but
    /// carry larger variance than requested.
    pub under_sampled: bool,
    /// Wall-clock duration of the run (s).
    pub elapsed_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_bin_widths() {
        let grid = GridSpec::default();
        assert!((grid.dz_mm() - 0.05).abs() < 1e-12);
        assert!((grid.dr_mm() - 0.1).abs() < 1e-12);
        assert_eq!(grid.z_centres_mm().len(), 200);
        assert!((grid.z_centres_mm()[0] - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_layer_albedo() {
        let layer = Layer {
            name: "test".into(),
            thickness: Thickness::Millimetres(1.0),
            n: 1.37,
            mu_a_per_mm: 0.03,
            mu_s_per_mm: 10.0,
            g: 0.9,
        };
        assert!((layer.mu_t_per_mm() - 10.03).abs() < 1e-12);
        assert!((layer.albedo() - 10.0 / 10.03).abs() < 1e-12);
    }
}
