//! Lucent command-line interface.
//!
//! Query the tissue catalog and run the planning calculators and Monte
//! Carlo simulations:
//! ```sh
//! lucent lookup brain_gray_matter 630
//! lucent quick --tissue-id brain_gray_matter --wavelength-nm 630
//! lucent simulate job.toml
//! lucent recommend --depth-mm 2.0 --max-power-mw 30
//! ```
//! All output is structured JSON on stdout.

mod config;
mod runner;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use lucent_core::diffusion;
use lucent_planning::fiber::FiberSpec;
use lucent_planning::fluorescence::{self, SignalQuery};
use lucent_planning::optogenetics::{
    Application, OptogeneticsPowerModel, PowerQuery, Precision,
};
use lucent_planning::pdt;
use lucent_planning::thermal::{self, ApplicationClass};
use lucent_tissue::indicators::IndicatorCatalog;
use lucent_tissue::opsins::{OpsinCatalog, OpsinKind};
use lucent_tissue::photosensitizers::PhotosensitizerCatalog;
use lucent_tissue::store::{TissueCategory, TissuePropertyStore};

#[derive(Parser)]
#[command(name = "lucent")]
#[command(about = "Lucent: layered-tissue light transport and dosimetry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogued tissues, optionally filtered.
    Tissues {
        /// Category filter: neural, skin, organ, tumor, connective.
        #[arg(long)]
        category: Option<TissueCategory>,
        /// Case-insensitive substring over id and display name.
        #[arg(long)]
        search: Option<String>,
    },
    /// Optical properties of a tissue at one wavelength.
    Lookup {
        tissue_id: String,
        wavelength_nm: f64,
    },
    /// Coefficient spectrum of a tissue.
    Spectrum {
        tissue_id: String,
        #[arg(long, default_value_t = 400.0)]
        wl_min_nm: f64,
        #[arg(long, default_value_t = 900.0)]
        wl_max_nm: f64,
        #[arg(long, default_value_t = 10.0)]
        step_nm: f64,
    },
    /// Compare several tissues at one wavelength.
    Compare {
        /// Comma-separated tissue ids.
        tissue_ids: String,
        wavelength_nm: f64,
    },
    /// List the opsin catalog.
    Opsins {
        /// Filter: excitatory or inhibitory.
        #[arg(long)]
        kind: Option<String>,
    },
    /// Minimum launch power for an opsin at depth.
    Power {
        opsin_id: String,
        target_depth_mm: f64,
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
        #[arg(long, default_value_t = 200.0)]
        fiber_diameter_um: f64,
        #[arg(long, default_value_t = 0.39)]
        fiber_na: f64,
        /// Use the Monte Carlo engine instead of the diffusion
        /// approximation.
        #[arg(long)]
        monte_carlo: bool,
        #[arg(long, default_value_t = 20_000)]
        n_photons: usize,
    },
    /// Rank opsins usable within a power budget.
    Recommend {
        #[arg(long, default_value = "excitatory")]
        application: Application,
        #[arg(long, default_value_t = 2.0)]
        depth_mm: f64,
        #[arg(long, default_value_t = 30.0)]
        max_power_mw: f64,
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
    },
    /// Steady-state thermal safety check for continuous illumination.
    Thermal {
        power_mw: f64,
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
        #[arg(long, default_value_t = 470.0)]
        wavelength_nm: f64,
        #[arg(long, default_value_t = 0.2)]
        spot_mm: f64,
        #[arg(long, default_value = "chronic")]
        application: ApplicationClass,
    },
    /// Transient thermal check for a pulse train.
    Pulsed {
        peak_power_mw: f64,
        pulse_ms: f64,
        freq_hz: f64,
        #[arg(long, default_value_t = 1.0)]
        duration_s: f64,
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
        #[arg(long, default_value_t = 470.0)]
        wavelength_nm: f64,
        #[arg(long, default_value_t = 0.2)]
        spot_mm: f64,
        #[arg(long, default_value = "chronic")]
        application: ApplicationClass,
    },
    /// Quick single-slab Monte Carlo simulation with defaults.
    Quick {
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
        #[arg(long, default_value_t = 630.0)]
        wavelength_nm: f64,
        #[arg(long, default_value_t = 1000)]
        n_photons: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Multi-layer Monte Carlo simulation from a TOML job file.
    Simulate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Photodynamic-therapy dose at depth.
    Dose {
        photosensitizer_id: String,
        #[arg(long, default_value_t = 100.0)]
        irradiance_mw_cm2: f64,
        #[arg(long, default_value_t = 600.0)]
        exposure_time_s: f64,
        #[arg(long, default_value_t = 3.0)]
        depth_mm: f64,
        #[arg(long, default_value = "skin_dermis")]
        tissue_id: String,
        #[arg(long, default_value_t = 5.0)]
        concentration_um: f64,
    },
    /// Expected fluorescence signal for an indicator at depth.
    Signal {
        indicator_id: String,
        #[arg(long, default_value_t = 1.0)]
        depth_mm: f64,
        #[arg(long, default_value_t = 5.0)]
        excitation_power_mw: f64,
        #[arg(long, default_value_t = 0.8)]
        objective_na: f64,
        #[arg(long, default_value_t = 10.0)]
        concentration_um: f64,
        #[arg(long, default_value = "brain_gray_matter")]
        tissue_id: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = TissuePropertyStore::builtin();
    let opsins = OpsinCatalog::builtin();

    match cli.command {
        Commands::Tissues { category, search } => {
            print_json(&store.list(category, search.as_deref()))
        }
        Commands::Lookup {
            tissue_id,
            wavelength_nm,
        } => {
            let props = store.lookup(&tissue_id, wavelength_nm)?;
            let derived = diffusion::derive(
                props.mu_a_per_mm,
                props.mu_s_per_mm,
                props.g,
                props.n,
            )?;
            #[derive(Serialize)]
            struct LookupReport {
                tissue_id: String,
                #[serde(flatten)]
                properties: lucent_tissue::store::OpticalProperties,
                #[serde(flatten)]
                derived: diffusion::DerivedOptics,
            }
            print_json(&LookupReport {
                tissue_id,
                properties: props,
                derived,
            })
        }
        Commands::Spectrum {
            tissue_id,
            wl_min_nm,
            wl_max_nm,
            step_nm,
        } => {
            let rows: Vec<_> = store
                .spectrum(&tissue_id, wl_min_nm, wl_max_nm, step_nm)?
                .collect();
            print_json(&rows)
        }
        Commands::Compare {
            tissue_ids,
            wavelength_nm,
        } => {
            let ids: Vec<&str> = tissue_ids.split(',').map(str::trim).collect();
            let rows = store.compare(&ids, wavelength_nm)?;
            print_json(&rows)
        }
        Commands::Opsins { kind } => {
            let kind = match kind.as_deref() {
                Some("excitatory") => Some(OpsinKind::Excitatory),
                Some("inhibitory") => Some(OpsinKind::Inhibitory),
                Some(other) => anyhow::bail!(
                    "Unknown opsin kind '{other}'. Valid: excitatory, inhibitory"
                ),
                None => None,
            };
            print_json(&opsins.list(kind))
        }
        Commands::Power {
            opsin_id,
            target_depth_mm,
            tissue_id,
            fiber_diameter_um,
            fiber_na,
            monte_carlo,
            n_photons,
        } => {
            let model = OptogeneticsPowerModel::new(&store, &opsins);
            let mut query = PowerQuery::new(opsin_id, target_depth_mm);
            query.tissue_id = tissue_id;
            query.fiber = FiberSpec {
                core_diameter_um: fiber_diameter_um,
                numerical_aperture: fiber_na,
            };
            let precision = if monte_carlo {
                Precision::MonteCarlo { n_photons }
            } else {
                Precision::Diffusion
            };
            print_json(&model.required_power(&query, precision)?)
        }
        Commands::Recommend {
            application,
            depth_mm,
            max_power_mw,
            tissue_id,
        } => {
            let model = OptogeneticsPowerModel::new(&store, &opsins);
            print_json(&model.recommend(application, depth_mm, max_power_mw, &tissue_id)?)
        }
        Commands::Thermal {
            power_mw,
            tissue_id,
            wavelength_nm,
            spot_mm,
            application,
        } => {
            let props = store.lookup(&tissue_id, wavelength_nm)?;
            let class = runner::thermal_class(&store, &tissue_id)?;
            let report = thermal::steady_state(
                power_mw,
                spot_mm / 2.0,
                props.mu_a_per_mm,
                class,
                application,
            );
            print_json(&report)
        }
        Commands::Pulsed {
            peak_power_mw,
            pulse_ms,
            freq_hz,
            duration_s,
            tissue_id,
            wavelength_nm,
            spot_mm,
            application,
        } => {
            let props = store.lookup(&tissue_id, wavelength_nm)?;
            let class = runner::thermal_class(&store, &tissue_id)?;
            let report = thermal::pulsed(
                peak_power_mw,
                pulse_ms,
                freq_hz,
                duration_s,
                props.mu_a_per_mm,
                spot_mm / 2.0,
                class,
                application,
            );
            print_json(&report)
        }
        Commands::Quick {
            tissue_id,
            wavelength_nm,
            n_photons,
            seed,
        } => {
            let report =
                runner::run_quick(&store, &tissue_id, wavelength_nm, n_photons, seed)?;
            print_json(&report)
        }
        Commands::Simulate { config } => {
            let job = config::load_config(&config)?;
            log::info!(
                "running {} photons over {} layers",
                job.simulation.n_photons,
                job.layer.len()
            );
            let result = runner::run_job(&store, &job)?;
            print_json(&result)
        }
        Commands::Dose {
            photosensitizer_id,
            irradiance_mw_cm2,
            exposure_time_s,
            depth_mm,
            tissue_id,
            concentration_um,
        } => {
            let photosensitizers = PhotosensitizerCatalog::builtin();
            let ps = photosensitizers.get(&photosensitizer_id)?;
            let props = store.lookup(&tissue_id, ps.activation_wavelength_nm)?;
            let derived = diffusion::derive(
                props.mu_a_per_mm,
                props.mu_s_per_mm,
                props.g,
                props.n,
            )?;
            let fluence = pdt::fluence_at_depth(
                irradiance_mw_cm2,
                exposure_time_s,
                depth_mm,
                derived.attenuation.mu_eff_per_mm(),
            );
            let dose = pdt::dose(
                ps,
                ps.activation_wavelength_nm,
                fluence.depth_fluence_j_cm2,
                concentration_um,
            )?;
            #[derive(Serialize)]
            struct DoseCommandReport {
                photosensitizer_id: String,
                tissue_id: String,
                wavelength_nm: f64,
                depth_mm: f64,
                fluence: pdt::FluenceAtDepth,
                dose: pdt::DoseReport,
            }
            print_json(&DoseCommandReport {
                photosensitizer_id,
                tissue_id,
                wavelength_nm: ps.activation_wavelength_nm,
                depth_mm,
                fluence,
                dose,
            })
        }
        Commands::Signal {
            indicator_id,
            depth_mm,
            excitation_power_mw,
            objective_na,
            concentration_um,
            tissue_id,
        } => {
            let indicators = IndicatorCatalog::builtin();
            let prediction = fluorescence::predict_signal(
                &store,
                &indicators,
                &SignalQuery {
                    indicator_id,
                    tissue_id,
                    depth_mm,
                    excitation_power_mw,
                    objective_na,
                    concentration_um,
                },
            )?;
            print_json(&prediction)
        }
    }
}
