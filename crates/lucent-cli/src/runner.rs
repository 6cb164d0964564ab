//! Simulation runner: ties together the tissue catalog and the transport
//! engine for configured multi-layer jobs and the quick single-slab case.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use lucent_core::diffusion::{self, Attenuation};
use lucent_core::transport::{EngineConfig, MonteCarloEngine};
use lucent_core::types::{GridSpec, Layer, RunSpec, SimulationResult, Thickness, TissueStack};
use lucent_tissue::store::{TissueCategory, TissuePropertyStore};
use lucent_planning::thermal::TissueClass;

use crate::config::JobConfig;

/// Build a tissue stack from a parsed job configuration, resolving catalog
/// tissues at the simulation wavelength.
pub fn build_stack(store: &TissuePropertyStore, job: &JobConfig) -> Result<TissueStack> {
    let wavelength_nm = job.simulation.wavelength_nm;
    let mut layers = Vec::with_capacity(job.layer.len());

    for (i, layer) in job.layer.iter().enumerate() {
        let thickness = match (layer.thickness_mm, layer.semi_infinite) {
            (Some(_), true) => {
                bail!("layer {i}: 'thickness_mm' and 'semi_infinite' are mutually exclusive")
            }
            (Some(mm), false) => Thickness::Millimetres(mm),
            (None, true) => Thickness::SemiInfinite,
            (None, false) => {
                bail!("layer {i}: specify either 'thickness_mm' or 'semi_infinite = true'")
            }
        };

        let built = if let Some(tissue_id) = &layer.tissue_id {
            let props = store
                .lookup(tissue_id, wavelength_nm)
                .with_context(|| format!("layer {i} ('{tissue_id}')"))?;
            Layer {
                name: layer.name.clone().unwrap_or_else(|| tissue_id.clone()),
                thickness,
                n: props.n,
                mu_a_per_mm: props.mu_a_per_mm,
                mu_s_per_mm: props.mu_s_per_mm,
                g: props.g,
            }
        } else {
            let require = |value: Option<f64>, field: &str| -> Result<f64> {
                value.with_context(|| {
                    format!("layer {i}: '{field}' is required when no tissue_id is given")
                })
            };
            Layer {
                name: layer
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("layer_{i}")),
                thickness,
                n: require(layer.n, "n")?,
                mu_a_per_mm: require(layer.mu_a_per_mm, "mu_a_per_mm")?,
                mu_s_per_mm: require(layer.mu_s_per_mm, "mu_s_per_mm")?,
                g: require(layer.g, "g")?,
            }
        };
        layers.push(built);
    }

    Ok(TissueStack::new(layers))
}

/// Run a configured multi-layer simulation job.
pub fn run_job(store: &TissuePropertyStore, job: &JobConfig) -> Result<SimulationResult> {
    let stack = build_stack(store, job)?;
    let grid = GridSpec {
        n_z: job.simulation.grid.n_z,
        n_r: job.simulation.grid.n_r,
        z_max_mm: job.simulation.grid.z_max_mm,
        r_max_mm: job.simulation.grid.r_max_mm,
    };
    let engine = MonteCarloEngine::with_config(EngineConfig {
        wall_clock_limit: job.simulation.time_limit_s.map(Duration::from_secs_f64),
        ..Default::default()
    });
    let spec = RunSpec {
        wavelength_nm: job.simulation.wavelength_nm,
        n_photons: job.simulation.n_photons,
        seed: job.simulation.seed,
        grid,
    };
    engine
        .simulate(&stack, &spec)
        .context("transport simulation failed")
}

/// Quick-simulation report: transport totals plus the diffusion-theory
/// comparison.
#[derive(Debug, Serialize)]
pub struct QuickReport {
    pub tissue_id: String,
    pub wavelength_nm: f64,
    pub n_photons: usize,
    pub seed: u64,
    pub reflectance: f64,
    pub transmittance: f64,
    pub absorption_fraction: f64,
    pub mc_penetration_depth_1e_mm: f64,
    pub diffusion_penetration_depth_mm: Option<f64>,
    pub agreement: &'static str,
    pub under_sampled: bool,
    pub simulation_time_s: f64,
}

/// Single semi-infinite slab simulation with defaults, compared against the
/// diffusion approximation.
pub fn run_quick(
    store: &TissuePropertyStore,
    tissue_id: &str,
    wavelength_nm: f64,
    n_photons: usize,
    seed: u64,
) -> Result<QuickReport> {
    let props = store.lookup(tissue_id, wavelength_nm)?;
    let stack = TissueStack::semi_infinite_slab(
        tissue_id,
        props.n,
        props.mu_a_per_mm,
        props.mu_s_per_mm,
        props.g,
    );

    let engine = MonteCarloEngine::new();
    let result = engine.simulate(
        &stack,
        &RunSpec {
            wavelength_nm,
            n_photons,
            seed,
            grid: GridSpec::default(),
        },
    )?;

    let derived = diffusion::derive(props.mu_a_per_mm, props.mu_s_per_mm, props.g, props.n)?;
    let diffusion_depth = match derived.attenuation {
        Attenuation::Finite {
            penetration_depth_mm,
            ..
        } => Some(penetration_depth_mm),
        Attenuation::NonAttenuating => None,
    };

    let agreement = match diffusion_depth {
        Some(delta) if delta > 0.0 => {
            let diff_pct =
                (result.penetration.depth_1e_mm - delta).abs() / delta * 100.0;
            if diff_pct < 10.0 {
                "excellent"
            } else if diff_pct < 20.0 {
                "good"
            } else if diff_pct < 40.0 {
                "moderate"
            } else {
                "check parameters"
            }
        }
        _ => "not applicable",
    };

    Ok(QuickReport {
        tissue_id: tissue_id.to_string(),
        wavelength_nm,
        n_photons,
        seed,
        reflectance: result.reflectance,
        transmittance: result.transmittance,
        absorption_fraction: result.absorbed_fraction,
        mc_penetration_depth_1e_mm: result.penetration.depth_1e_mm,
        diffusion_penetration_depth_mm: diffusion_depth,
        agreement,
        under_sampled: result.under_sampled,
        simulation_time_s: result.elapsed_s,
    })
}

/// Map a catalog tissue onto the coarse thermal classes.
pub fn thermal_class(store: &TissuePropertyStore, tissue_id: &str) -> Result<TissueClass> {
    let summaries = store.list(None, None);
    let summary = summaries
        .iter()
        .find(|t| t.id == tissue_id)
        .with_context(|| format!("unknown tissue '{tissue_id}'"))?;
    Ok(match summary.category {
        TissueCategory::Neural => TissueClass::Brain,
        TissueCategory::Skin => TissueClass::Skin,
        TissueCategory::Tumor => TissueClass::Tumor,
        TissueCategory::Organ | TissueCategory::Connective => TissueClass::Muscle,
    })
}
