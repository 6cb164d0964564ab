//! TOML configuration deserialisation for simulation jobs.

use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub simulation: SimulationConfig,
    /// Ordered layers, entry surface first.
    pub layer: Vec<LayerConfig>,
}

/// Simulation parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_wavelength_nm")]
    pub wavelength_nm: f64,
    #[serde(default = "default_n_photons")]
    pub n_photons: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub grid: GridConfig,
    /// Wall-clock cutoff in seconds; omitted means unlimited.
    pub time_limit_s: Option<f64>,
}

fn default_wavelength_nm() -> f64 {
    630.0
}
fn default_n_photons() -> usize {
    50_000
}
fn default_seed() -> u64 {
    42
}

/// Scoring grid from TOML.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_n_z")]
    pub n_z: usize,
    #[serde(default = "default_n_r")]
    pub n_r: usize,
    #[serde(default = "default_extent_mm")]
    pub z_max_mm: f64,
    #[serde(default = "default_extent_mm")]
    pub r_max_mm: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            n_z: default_n_z(),
            n_r: default_n_r(),
            z_max_mm: default_extent_mm(),
            r_max_mm: default_extent_mm(),
        }
    }
}

fn default_n_z() -> usize {
    200
}
fn default_n_r() -> usize {
    100
}
fn default_extent_mm() -> f64 {
    10.0
}

/// A single layer: either a catalog tissue resolved at the simulation
/// wavelength, or explicit coefficients.
#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    /// Catalog tissue identifier (e.g. `brain_gray_matter`).
    pub tissue_id: Option<String>,
    /// Display name; defaults to the tissue id for catalog layers.
    pub name: Option<String>,
    /// Explicit coefficients, used when `tissue_id` is absent.
    pub n: Option<f64>,
    pub mu_a_per_mm: Option<f64>,
    pub mu_s_per_mm: Option<f64>,
    pub g: Option<f64>,
    /// Finite thickness (mm); mutually exclusive with `semi_infinite`.
    pub thickness_mm: Option<f64>,
    #[serde(default)]
    pub semi_infinite: bool,
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}
