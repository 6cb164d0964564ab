//! Optogenetics power planning.
//!
//! Inverts the light-propagation model: given an opsin's activation
//! threshold at a target depth, what launch power does the fiber need?
//! Fluence attenuation comes from the diffusion approximation by default,
//! or from a Monte Carlo depth profile when the caller asks for transport
//! precision; the NA-dependent beam divergence spreads the power over the
//! spot at depth.

use serde::Serialize;

use lucent_core::diffusion;
use lucent_core::transport::MonteCarloEngine;
use lucent_core::types::{GridSpec, RunSpec, TissueStack};
use lucent_tissue::opsins::{OpsinCatalog, OpsinKind};
use lucent_tissue::store::TissuePropertyStore;

use crate::fiber::FiberSpec;
use crate::thermal::ApplicationClass;
use crate::PlanningError;

/// Patch-cable and ferrule loss allowance folded into the power estimate.
const DELIVERY_MARGIN: f64 = 1.04;

/// Activation headroom over the bare threshold for reliable spiking.
pub const DEFAULT_ACTIVATION_FACTOR: f64 = 2.0;

/// How the depth attenuation is computed.
#[derive(Debug, Clone, Copy)]
pub enum Precision {
    /// Closed-form μeff attenuation; microseconds.
    Diffusion,
    /// Monte Carlo depth-fluence profile with this photon budget.
    MonteCarlo { n_photons: usize },
}

/// Which opsin kinds a recommendation should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    Excitatory,
    Inhibitory,
    Any,
}

impl Application {
    fn matches(&self, kind: OpsinKind) -> bool {
        match self {
            Application::Excitatory => kind == OpsinKind::Excitatory,
            Application::Inhibitory => kind == OpsinKind::Inhibitory,
            Application::Any => true,
        }
    }
}

impl std::str::FromStr for Application {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excitatory" => Ok(Self::Excitatory),
            "inhibitory" => Ok(Self::Inhibitory),
            "any" | "all" => Ok(Self::Any),
            other => Err(format!(
                "Unknown application '{}'. Valid: excitatory, inhibitory, any",
                other
            )),
        }
    }
}

/// A power calculation request.
#[derive(Debug, Clone)]
pub struct PowerQuery {
    pub opsin_id: String,
    pub tissue_id: String,
    pub target_depth_mm: f64,
    pub fiber: FiberSpec,
    pub activation_factor: f64,
}

impl PowerQuery {
    /// Query with the standard defaults: gray matter, 200 μm / 0.39 NA
    /// fiber, 2× activation headroom.
    pub fn new(opsin_id: impl Into<String>, target_depth_mm: f64) -> Self {
        Self {
            opsin_id: opsin_id.into(),
            tissue_id: "brain_gray_matter".into(),
            target_depth_mm,
            fiber: FiberSpec::default(),
            activation_factor: DEFAULT_ACTIVATION_FACTOR,
        }
    }
}

/// Recommended light source for a required power.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRecommendation {
    Led,
    Laser,
}

/// Result of a power calculation.
#[derive(Debug, Clone, Serialize)]
pub struct PowerEstimate {
    pub opsin_id: String,
    pub wavelength_nm: f64,
    pub threshold_mw_mm2: f64,
    pub target_depth_mm: f64,
    /// Effective attenuation of the tissue at the opsin wavelength (mm⁻¹).
    pub mu_eff_per_mm: f64,
    /// Fluence ratio surface/target-depth.
    pub attenuation_factor: f64,
    pub spot_diameter_at_depth_mm: f64,
    /// Minimum launch power meeting the threshold at depth (mW).
    pub required_power_mw: f64,
    pub fiber_tip_irradiance_mw_mm2: f64,
    /// Whether the tip irradiance stays below the chronic-implant limit.
    pub within_tip_irradiance_limit: bool,
    pub source: SourceRecommendation,
}

/// One entry of an opsin recommendation, ranked by required power.
#[derive(Debug, Clone, Serialize)]
pub struct OpsinCandidate {
    pub opsin_id: String,
    pub name: String,
    pub kind: OpsinKind,
    pub wavelength_nm: f64,
    pub required_power_mw: f64,
}

/// Outcome of [`OptogeneticsPowerModel::recommend`]; a caller must branch
/// on the variant rather than expect an error for the empty case.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Recommendation {
    /// Viable opsins, cheapest first.
    Ranked { candidates: Vec<OpsinCandidate> },
    /// No catalogued opsin meets the threshold within the power budget.
    NoViableOpsin { max_power_mw: f64 },
}

/// The optogenetics power model over a property store and opsin catalog.
pub struct OptogeneticsPowerModel<'a> {
    store: &'a TissuePropertyStore,
    opsins: &'a OpsinCatalog,
}

impl<'a> OptogeneticsPowerModel<'a> {
    pub fn new(store: &'a TissuePropertyStore, opsins: &'a OpsinCatalog) -> Self {
        Self { store, opsins }
    }

    /// Minimum launch power for the queried opsin at depth.
    pub fn required_power(
        &self,
        query: &PowerQuery,
        precision: Precision,
    ) -> Result<PowerEstimate, PlanningError> {
        let opsin = self.opsins.get(&query.opsin_id)?;
        let wavelength_nm = opsin.peak_wavelength_nm;
        let props = self.store.lookup(&query.tissue_id, wavelength_nm)?;

        let derived = diffusion::derive(
            props.mu_a_per_mm,
            props.mu_s_per_mm,
            props.g,
            props.n,
        )?;
        let mu_eff = derived.attenuation.mu_eff_per_mm();

        let attenuation_factor = match precision {
            Precision::Diffusion => (mu_eff * query.target_depth_mm).exp(),
            Precision::MonteCarlo { n_photons } => {
                self.transport_attenuation(&props, &query.tissue_id, query.target_depth_mm, n_photons, wavelength_nm)?
                    .unwrap_or_else(|| {
                        log::warn!(
                            "Monte Carlo fluence too sparse at {} mm; falling back to diffusion",
                            query.target_depth_mm
                        );
                        (mu_eff * query.target_depth_mm).exp()
                    })
            }
        };

        let spot_radius_mm = query.fiber.spot_radius_mm(query.target_depth_mm, props.n);
        let spot_area_mm2 = std::f64::consts::PI * spot_radius_mm * spot_radius_mm;

        let target_irradiance = opsin.activation_threshold_mw_mm2 * query.activation_factor;
        let required_power_mw =
            target_irradiance * spot_area_mm2 * attenuation_factor * DELIVERY_MARGIN;
        let fiber_tip_irradiance = required_power_mw / query.fiber.core_area_mm2();

        let tip_limit = ApplicationClass::BrainChronic
            .limits()
            .max_power_density_mw_mm2;

        Ok(PowerEstimate {
            opsin_id: opsin.id.to_string(),
            wavelength_nm,
            threshold_mw_mm2: opsin.activation_threshold_mw_mm2,
            target_depth_mm: query.target_depth_mm,
            mu_eff_per_mm: mu_eff,
            attenuation_factor,
            spot_diameter_at_depth_mm: 2.0 * spot_radius_mm,
            required_power_mw,
            fiber_tip_irradiance_mw_mm2: fiber_tip_irradiance,
            within_tip_irradiance_limit: fiber_tip_irradiance < tip_limit,
            source: if required_power_mw < 30.0 {
                SourceRecommendation::Led
            } else {
                SourceRecommendation::Laser
            },
        })
    }

    /// Search the catalog for opsins usable within a power budget,
    /// cheapest first.
    pub fn recommend(
        &self,
        application: Application,
        target_depth_mm: f64,
        max_power_mw: f64,
        tissue_id: &str,
    ) -> Result<Recommendation, PlanningError> {
        let mut candidates = Vec::new();
        for opsin in self.opsins.list(None) {
            if !application.matches(opsin.kind) {
                continue;
            }
            let query = PowerQuery {
                opsin_id: opsin.id.to_string(),
                tissue_id: tissue_id.to_string(),
                target_depth_mm,
                fiber: FiberSpec::default(),
                activation_factor: DEFAULT_ACTIVATION_FACTOR,
            };
            let estimate = self.required_power(&query, Precision::Diffusion)?;
            if estimate.required_power_mw <= max_power_mw {
                candidates.push(OpsinCandidate {
                    opsin_id: opsin.id.to_string(),
                    name: opsin.name.to_string(),
                    kind: opsin.kind,
                    wavelength_nm: opsin.peak_wavelength_nm,
                    required_power_mw: estimate.required_power_mw,
                });
            }
        }

        if candidates.is_empty() {
            return Ok(Recommendation::NoViableOpsin { max_power_mw });
        }
        candidates.sort_by(|a, b| {
            a.required_power_mw
                .partial_cmp(&b.required_power_mw)
                .expect("required power is finite")
        });
        Ok(Recommendation::Ranked { candidates })
    }

    /// Surface-to-depth fluence ratio from a Monte Carlo run; `None` when
    /// the profile carries no signal at the target depth.
    fn transport_attenuation(
        &self,
        props: &lucent_tissue::store::OpticalProperties,
        tissue_id: &str,
        target_depth_mm: f64,
        n_photons: usize,
        wavelength_nm: f64,
    ) -> Result<Option<f64>, PlanningError> {
        let stack = TissueStack::semi_infinite_slab(
            tissue_id,
            props.n,
            props.mu_a_per_mm,
            props.mu_s_per_mm,
            props.g,
        );
        let grid = GridSpec {
            z_max_mm: (2.0 * target_depth_mm).max(10.0),
            ..GridSpec::default()
        };
        let engine = MonteCarloEngine::new();
        let result = engine.simulate(
            &stack,
            &RunSpec {
                wavelength_nm,
                n_photons,
                seed: 0,
                grid,
            },
        )?;

        let dz = grid.dz_mm();
        let iz = ((target_depth_mm / dz) as usize).min(grid.n_z - 1);
        let surface = result.fluence_z[0];
        let at_depth = result.fluence_z[iz];
        if surface > 0.0 && at_depth > 0.0 {
            Ok(Some(surface / at_depth))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (TissuePropertyStore, OpsinCatalog) {
        (TissuePropertyStore::builtin(), OpsinCatalog::builtin())
    }

    #[test]
    fn test_required_power_grows_with_depth() {
        let (store, opsins) = fixtures();
        let model = OptogeneticsPowerModel::new(&store, &opsins);
        let shallow = model
            .required_power(&PowerQuery::new("ChR2", 1.0), Precision::Diffusion)
            .unwrap();
        let deep = model
            .required_power(&PowerQuery::new("ChR2", 4.0), Precision::Diffusion)
            .unwrap();
        assert!(deep.required_power_mw > shallow.required_power_mw);
    }

    #[test]
    fn test_unknown_opsin_is_an_input_error() {
        let (store, opsins) = fixtures();
        let model = OptogeneticsPowerModel::new(&store, &opsins);
        let err = model
            .required_power(&PowerQuery::new("NotAnOpsin", 1.0), Precision::Diffusion)
            .unwrap_err();
        assert!(matches!(err, PlanningError::Opsin(_)));
    }

    #[test]
    fn test_recommend_ranks_by_required_power() {
        let (store, opsins) = fixtures();
        let model = OptogeneticsPowerModel::new(&store, &opsins);
        match model
            .recommend(Application::Excitatory, 2.0, 30.0, "brain_gray_matter")
            .unwrap()
        {
            Recommendation::Ranked { candidates } => {
                assert!(!candidates.is_empty());
                for pair in candidates.windows(2) {
                    assert!(pair[0].required_power_mw <= pair[1].required_power_mw);
                }
                assert!(candidates
                    .iter()
                    .all(|c| c.required_power_mw <= 30.0));
            }
            Recommendation::NoViableOpsin { .. } => {
                panic!("expected viable opsins at 2 mm under 30 mW")
            }
        }
    }

    #[test]
    fn test_recommend_no_viable_opsin_under_tiny_budget() {
        let (store, opsins) = fixtures();
        let model = OptogeneticsPowerModel::new(&store, &opsins);
        match model
            .recommend(Application::Any, 6.0, 1e-6, "brain_gray_matter")
            .unwrap()
        {
            Recommendation::NoViableOpsin { max_power_mw } => {
                assert!(max_power_mw < 1e-5);
            }
            Recommendation::Ranked { candidates } => {
                panic!("expected NoViableOpsin, got {} candidates", candidates.len())
            }
        }
    }

    #[test]
    fn test_monte_carlo_precision_is_same_order_as_diffusion() {
        let (store, opsins) = fixtures();
        let model = OptogeneticsPowerModel::new(&store, &opsins);
        let query = PowerQuery::new("ChR2", 1.0);
        let diffusion = model
            .required_power(&query, Precision::Diffusion)
            .unwrap();
        let transport = model
            .required_power(&query, Precision::MonteCarlo { n_photons: 20_000 })
            .unwrap();
        let ratio = transport.required_power_mw / diffusion.required_power_mw;
        assert!(
            (0.1..10.0).contains(&ratio),
            "MC and diffusion estimates diverge: ratio {ratio}"
        );
    }
}
