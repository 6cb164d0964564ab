//! Monte Carlo photon-transport engine for layered tissue.
//!
//! Each photon packet performs an independent random walk ([`packet`]);
//! packets are distributed over a Rayon thread pool in fixed-size chunks,
//! each chunk scoring into its own partial tally ([`tally`]), and the
//! partial tallies are merged in chunk order. Because every packet draws
//! from its own counter-derived random stream, the result is
//! bit-reproducible for a given (stack, wavelength, N, seed, grid) on any
//! thread count.
//!
//! Termination of a run is bounded three ways: the photon budget ceiling
//! (an input error when exceeded), an optional wall-clock cutoff, and a
//! cooperative cancellation flag checked between packets. The latter two
//! return a partial result explicitly flagged `under_sampled`.

mod packet;
mod tally;

pub use packet::{fresnel_reflectance, sample_hg_cos_theta};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use thiserror::Error;

use crate::types::{
    GridSpec, PenetrationMetrics, RunSpec, SimulationResult, Thickness, TissueStack,
};
use packet::ResolvedLayer;
use tally::Tally;

/// Errors from the transport engine.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid tissue stack: {0}")]
    InvalidStack(String),

    #[error("Photon budget exceeded: requested {requested}, ceiling is {ceiling}")]
    PhotonBudgetExceeded { requested: usize, ceiling: usize },

    #[error("Photon count must be at least 1")]
    EmptyPhotonBudget,
}

/// Engine tuning parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard ceiling on the photon budget of a single run (cost control).
    pub photon_ceiling: usize,
    /// Weight below which Russian roulette begins.
    pub weight_threshold: f64,
    /// Roulette survival probability.
    pub roulette_survival: f64,
    /// Packets per work chunk. Fixed chunking keeps the reduction order,
    /// and therefore the result, independent of thread scheduling.
    pub chunk_size: usize,
    /// Refractive index of the medium above/below the stack.
    pub ambient_n: f64,
    /// Optional wall-clock cutoff; hitting it yields a flagged partial
    /// result rather than an error.
    pub wall_clock_limit: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            photon_ceiling: 1_000_000,
            weight_threshold: 1e-4,
            roulette_survival: 0.1,
            chunk_size: 1024,
            ambient_n: 1.0,
            wall_clock_limit: None,
        }
    }
}

/// The Monte Carlo transport engine.
///
/// Holds no per-run state: every simulation is reproducible solely from its
/// inputs and seed, and a single engine may serve concurrent callers.
#[derive(Debug, Default)]
pub struct MonteCarloEngine {
    pub config: EngineConfig,
}

impl MonteCarloEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run a simulation to completion (or wall-clock cutoff).
    pub fn simulate(
        &self,
        stack: &TissueStack,
        spec: &RunSpec,
    ) -> Result<SimulationResult, TransportError> {
        self.simulate_cancellable(stack, spec, &AtomicBool::new(false))
    }

    /// Run a simulation with a cooperative cancellation flag.
    ///
    /// The flag is checked between packets, never mid-packet, so an abort
    /// takes effect within one packet's simulation time.
    pub fn simulate_cancellable(
        &self,
        stack: &TissueStack,
        spec: &RunSpec,
        cancel: &AtomicBool,
    ) -> Result<SimulationResult, TransportError> {
        if spec.n_photons == 0 {
            return Err(TransportError::EmptyPhotonBudget);
        }
        if spec.n_photons > self.config.photon_ceiling {
            return Err(TransportError::PhotonBudgetExceeded {
                requested: spec.n_photons,
                ceiling: self.config.photon_ceiling,
            });
        }
        let layers = resolve_stack(stack)?;

        let start = Instant::now();
        let deadline = self.config.wall_clock_limit.map(|limit| start + limit);

        let n = spec.n_photons;
        let chunk_size = self.config.chunk_size.max(1);
        let n_chunks = (n + chunk_size - 1) / chunk_size;

        let partials: Vec<Tally> = (0..n_chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut local = Tally::new(spec.grid);
                let first = chunk * chunk_size;
                let last = ((chunk + 1) * chunk_size).min(n);
                for i in first..last {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            break;
                        }
                    }
                    let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(spec.seed, i as u64));
                    packet::trace_packet(&layers, &self.config, &mut rng, &mut local);
                    local.photons_traced += 1;
                }
                local
            })
            .collect();

        // Ordered merge: chunk 0 first, always.
        let mut total = Tally::new(spec.grid);
        for partial in &partials {
            total.merge(partial);
        }

        let under_sampled = total.photons_traced < n;
        if under_sampled {
            log::warn!(
                "transport run under-sampled: {}/{} packets traced",
                total.photons_traced,
                n
            );
        }

        Ok(finalize(total, spec, under_sampled, start.elapsed().as_secs_f64()))
    }
}

/// Derive the seed of one packet's random stream from the run seed and the
/// packet index (SplitMix64 over the golden-gamma increment). Streams of
/// distinct packets are statistically independent, which is what makes the
/// packet loop safe to parallelize without locks.
fn derive_seed(seed: u64, packet: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let z = seed ^ packet.wrapping_mul(GOLDEN_GAMMA);
    let mut result = z.wrapping_add(GOLDEN_GAMMA);
    result = (result ^ (result >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    result = (result ^ (result >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    result ^ (result >> 31)
}

/// Validate the stack and compute absolute layer boundaries.
fn resolve_stack(stack: &TissueStack) -> Result<Vec<ResolvedLayer>, TransportError> {
    if stack.layers.is_empty() {
        return Err(TransportError::InvalidStack("stack has no layers".into()));
    }

    let mut layers = Vec::with_capacity(stack.layers.len());
    let mut z_top = 0.0_f64;
    let last = stack.layers.len() - 1;

    for (i, layer) in stack.layers.iter().enumerate() {
        if layer.mu_a_per_mm < 0.0 || layer.mu_s_per_mm < 0.0 {
            return Err(TransportError::InvalidStack(format!(
                "layer '{}' has a negative coefficient",
                layer.name
            )));
        }
        if !(-1.0..=1.0).contains(&layer.g) {
            return Err(TransportError::InvalidStack(format!(
                "layer '{}' has g = {} outside [-1, 1]",
                layer.name, layer.g
            )));
        }
        if layer.n <= 0.0 {
            return Err(TransportError::InvalidStack(format!(
                "layer '{}' has non-positive refractive index",
                layer.name
            )));
        }
        let z_bottom = match layer.thickness {
            Thickness::Millimetres(mm) => {
                if mm <= 0.0 || !mm.is_finite() {
                    return Err(TransportError::InvalidStack(format!(
                        "layer '{}' has non-positive thickness {} mm",
                        layer.name, mm
                    )));
                }
                z_top + mm
            }
            Thickness::SemiInfinite => {
                if i != last {
                    return Err(TransportError::InvalidStack(format!(
                        "semi-infinite layer '{}' must be last in the stack",
                        layer.name
                    )));
                }
                f64::INFINITY
            }
        };
        layers.push(ResolvedLayer {
            z_top_mm: z_top,
            z_bottom_mm: z_bottom,
            n: layer.n,
            mu_a_per_mm: layer.mu_a_per_mm,
            mu_s_per_mm: layer.mu_s_per_mm,
            g: layer.g,
        });
        z_top = z_bottom;
    }

    Ok(layers)
}

/// Normalize tallies and derive the depth-profile metrics.
fn finalize(tally: Tally, spec: &RunSpec, under_sampled: bool, elapsed_s: f64) -> SimulationResult {
    let n = tally.photons_traced.max(1) as f64;
    let grid = spec.grid;
    let dz = grid.dz_mm();
    let dr = grid.dr_mm();

    // Fluence per photon per unit depth.
    let fluence_z: Vec<f64> = tally.fluence_z.iter().map(|w| w / (n * dz)).collect();

    // Absorbed density per photon per unit volume (cylindrical rings).
    let mut absorption_rz = tally.absorption_rz;
    for ir in 0..grid.n_r {
        let r_inner = ir as f64 * dr;
        let r_outer = r_inner + dr;
        let ring_area = std::f64::consts::PI * (r_outer * r_outer - r_inner * r_inner);
        for iz in 0..grid.n_z {
            absorption_rz[[ir, iz]] /= n * ring_area * dz;
        }
    }

    let penetration = penetration_metrics(&fluence_z, &grid);

    SimulationResult {
        wavelength_nm: spec.wavelength_nm,
        photons_requested: spec.n_photons,
        photons_traced: tally.photons_traced,
        seed: spec.seed,
        grid,
        reflectance: tally.reflected / n,
        transmittance: tally.transmitted / n,
        absorbed_fraction: tally.absorbed / n,
        fluence_z,
        absorption_rz,
        penetration,
        under_sampled,
        elapsed_s,
    }
}

/// 1/e and 1/e² penetration depths plus a log-linear μeff fit of the depth
/// fluence profile.
fn penetration_metrics(fluence_z: &[f64], grid: &GridSpec) -> PenetrationMetrics {
    let z_centres = grid.z_centres_mm();
    let surface = fluence_z.first().copied().unwrap_or(0.0);

    let depth_where_below = |threshold: f64| -> f64 {
        fluence_z
            .iter()
            .position(|&f| f < threshold)
            .map(|i| z_centres[i])
            .unwrap_or(grid.z_max_mm)
    };

    let (depth_1e_mm, depth_1e2_mm) = if surface > 0.0 {
        (
            depth_where_below(surface / std::f64::consts::E),
            depth_where_below(surface / std::f64::consts::E.powi(2)),
        )
    } else {
        (0.0, 0.0)
    };

    // Least-squares slope of ln(fluence) against depth over the bins that
    // carry signal.
    let points: Vec<(f64, f64)> = fluence_z
        .iter()
        .zip(z_centres.iter())
        .filter(|(f, _)| **f > 0.0)
        .map(|(f, z)| (*z, f.ln()))
        .collect();

    let fitted_mu_eff_per_mm = if points.len() > 2 {
        let n = points.len() as f64;
        let mean_z = points.iter().map(|(z, _)| z).sum::<f64>() / n;
        let mean_lf = points.iter().map(|(_, lf)| lf).sum::<f64>() / n;
        let cov: f64 = points
            .iter()
            .map(|(z, lf)| (z - mean_z) * (lf - mean_lf))
            .sum();
        let var: f64 = points.iter().map(|(z, _)| (z - mean_z).powi(2)).sum();
        if var > 0.0 {
            Some(-(cov / var))
        } else {
            None
        }
    } else {
        None
    };

    PenetrationMetrics {
        depth_1e_mm,
        depth_1e2_mm,
        fitted_mu_eff_per_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layer;

    fn gray_matter_stack() -> TissueStack {
        TissueStack::semi_infinite_slab("gray matter", 1.37, 0.03, 10.0, 0.9)
    }

    #[test]
    fn test_empty_stack_rejected() {
        let engine = MonteCarloEngine::new();
        let spec = RunSpec {
            wavelength_nm: 630.0,
            n_photons: 100,
            seed: 1,
            grid: GridSpec::default(),
        };
        let err = engine
            .simulate(&TissueStack::new(vec![]), &spec)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidStack(_)));
    }

    #[test]
    fn test_semi_infinite_must_be_last() {
        let engine = MonteCarloEngine::new();
        let stack = TissueStack::new(vec![
            Layer {
                name: "inner".into(),
                thickness: Thickness::SemiInfinite,
                n: 1.37,
                mu_a_per_mm: 0.03,
                mu_s_per_mm: 10.0,
                g: 0.9,
            },
            Layer {
                name: "below".into(),
                thickness: Thickness::Millimetres(1.0),
                n: 1.38,
                mu_a_per_mm: 0.02,
                mu_s_per_mm: 40.0,
                g: 0.87,
            },
        ]);
        let spec = RunSpec {
            wavelength_nm: 630.0,
            n_photons: 10,
            seed: 1,
            grid: GridSpec::default(),
        };
        assert!(matches!(
            engine.simulate(&stack, &spec),
            Err(TransportError::InvalidStack(_))
        ));
    }

    #[test]
    fn test_photon_budget_ceiling() {
        let engine = MonteCarloEngine::with_config(EngineConfig {
            photon_ceiling: 1000,
            ..Default::default()
        });
        let spec = RunSpec {
            wavelength_nm: 630.0,
            n_photons: 2000,
            seed: 1,
            grid: GridSpec::default(),
        };
        match engine.simulate(&gray_matter_stack(), &spec) {
            Err(TransportError::PhotonBudgetExceeded { requested, ceiling }) => {
                assert_eq!(requested, 2000);
                assert_eq!(ceiling, 1000);
            }
            other => panic!("expected PhotonBudgetExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_photons_rejected() {
        let engine = MonteCarloEngine::new();
        let spec = RunSpec {
            wavelength_nm: 630.0,
            n_photons: 0,
            seed: 1,
            grid: GridSpec::default(),
        };
        assert!(matches!(
            engine.simulate(&gray_matter_stack(), &spec),
            Err(TransportError::EmptyPhotonBudget)
        ));
    }

    #[test]
    fn test_cancellation_yields_flagged_partial() {
        let engine = MonteCarloEngine::new();
        let spec = RunSpec {
            wavelength_nm: 630.0,
            n_photons: 50_000,
            seed: 1,
            grid: GridSpec::default(),
        };
        let cancel = AtomicBool::new(true); // cancelled before the first packet
        let result = engine
            .simulate_cancellable(&gray_matter_stack(), &spec, &cancel)
            .unwrap();
        assert!(result.under_sampled);
        assert_eq!(result.photons_traced, 0);
    }

    #[test]
    fn test_derive_seed_spreads_neighbouring_packets() {
        let a = derive_seed(42, 0);
        let b = derive_seed(42, 1);
        let c = derive_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        // Neighbouring counters should differ in many bits, not just one.
        assert!((a ^ b).count_ones() > 10);
    }
}
