//! Thermal safety bounds for optical stimulation.
//!
//! Pennes bio-heat approximation: absorbed optical power acts as a
//! volumetric heat source balanced by conduction and blood-perfusion
//! cooling. Continuous illumination is assessed at steady state; pulsed
//! illumination combines the per-pulse adiabatic rise with the steady-state
//! rise from the time-averaged power.
//!
//! Exposure limits follow the ANSI/IEC-derived values used in chronic
//! optogenetic implants; an exceeded limit is a result the caller must
//! branch on, not an error.

use serde::Serialize;

/// Baseline body temperature (°C).
pub const BODY_TEMPERATURE_C: f64 = 37.0;

/// Radial sample distances for the reported temperature profile (mm).
const PROFILE_DISTANCES_MM: [f64; 6] = [0.0, 0.5, 1.0, 2.0, 3.0, 5.0];

/// Bulk thermal properties of a tissue class.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThermalProperties {
    /// Density (g/cm³).
    pub density_g_cm3: f64,
    /// Specific heat capacity (J/(g·K)).
    pub specific_heat_j_g_k: f64,
    /// Thermal conductivity (W/(m·K)).
    pub conductivity_w_m_k: f64,
    /// Blood perfusion rate (s⁻¹).
    pub perfusion_per_s: f64,
}

/// Coarse tissue classes with distinct thermal behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TissueClass {
    Brain,
    Skin,
    Muscle,
    Tumor,
}

impl TissueClass {
    pub fn properties(self) -> ThermalProperties {
        match self {
            TissueClass::Brain => ThermalProperties {
                density_g_cm3: 1.04,
                specific_heat_j_g_k: 3.6,
                conductivity_w_m_k: 0.51,
                perfusion_per_s: 0.01,
            },
            TissueClass::Skin => ThermalProperties {
                density_g_cm3: 1.1,
                specific_heat_j_g_k: 3.5,
                conductivity_w_m_k: 0.37,
                perfusion_per_s: 0.02,
            },
            TissueClass::Muscle => ThermalProperties {
                density_g_cm3: 1.05,
                specific_heat_j_g_k: 3.8,
                conductivity_w_m_k: 0.49,
                perfusion_per_s: 0.008,
            },
            TissueClass::Tumor => ThermalProperties {
                density_g_cm3: 1.05,
                specific_heat_j_g_k: 3.7,
                conductivity_w_m_k: 0.55,
                perfusion_per_s: 0.015,
            },
        }
    }
}

impl std::str::FromStr for TissueClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brain" => Ok(Self::Brain),
            "skin" => Ok(Self::Skin),
            "muscle" => Ok(Self::Muscle),
            "tumor" => Ok(Self::Tumor),
            other => Err(format!(
                "Unknown tissue class '{}'. Valid: brain, skin, muscle, tumor",
                other
            )),
        }
    }
}

/// Safety limits for a given exposure scenario.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExposureLimits {
    pub max_power_density_mw_mm2: f64,
    pub max_temp_rise_c: f64,
}

/// Exposure scenario; chronic and acute limits differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationClass {
    BrainChronic,
    BrainAcute,
    Skin,
    Retina,
    General,
}

impl ApplicationClass {
    pub fn limits(self) -> ExposureLimits {
        match self {
            ApplicationClass::BrainChronic => ExposureLimits {
                max_power_density_mw_mm2: 75.0,
                max_temp_rise_c: 1.0,
            },
            ApplicationClass::BrainAcute => ExposureLimits {
                max_power_density_mw_mm2: 200.0,
                max_temp_rise_c: 2.0,
            },
            ApplicationClass::Skin => ExposureLimits {
                max_power_density_mw_mm2: 200.0,
                max_temp_rise_c: 5.0,
            },
            ApplicationClass::Retina => ExposureLimits {
                max_power_density_mw_mm2: 1.0,
                max_temp_rise_c: 0.5,
            },
            ApplicationClass::General => ExposureLimits {
                max_power_density_mw_mm2: 100.0,
                max_temp_rise_c: 2.0,
            },
        }
    }
}

impl std::str::FromStr for ApplicationClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chronic" | "brain_chronic" => Ok(Self::BrainChronic),
            "acute" | "brain_acute" => Ok(Self::BrainAcute),
            "skin" => Ok(Self::Skin),
            "retina" => Ok(Self::Retina),
            "general" => Ok(Self::General),
            other => Err(format!(
                "Unknown application class '{}'. Valid: chronic, acute, skin, retina, general",
                other
            )),
        }
    }
}

/// Safety classification of a computed temperature rise.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case", tag = "classification")]
pub enum Exposure {
    Safe {
        /// Headroom below the limit (°C).
        margin_c: f64,
    },
    Unsafe {
        /// Overshoot above the limit (°C).
        excess_c: f64,
    },
}

impl Exposure {
    fn classify(delta_t_c: f64, limit_c: f64) -> Self {
        if delta_t_c < limit_c {
            Exposure::Safe {
                margin_c: limit_c - delta_t_c,
            }
        } else {
            Exposure::Unsafe {
                excess_c: delta_t_c - limit_c,
            }
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Exposure::Safe { .. })
    }
}

/// Steady-state assessment of continuous illumination.
#[derive(Debug, Clone, Serialize)]
pub struct SteadyStateReport {
    pub power_mw: f64,
    pub spot_radius_mm: f64,
    /// Peak temperature rise at the source (°C).
    pub delta_t_max_c: f64,
    /// Peak absolute temperature (°C).
    pub max_temperature_c: f64,
    /// (distance_mm, temperature_c) radial profile.
    pub temperature_profile_c: Vec<(f64, f64)>,
    /// Perfusion-limited thermal penetration depth (mm).
    pub thermal_penetration_depth_mm: f64,
    /// Largest power keeping ΔT below the limit (mW).
    pub max_safe_power_mw: f64,
    pub limit_c: f64,
    pub exposure: Exposure,
}

/// Steady-state temperature rise for continuous illumination.
///
/// The peak rise uses the conduction-limited point-source solution
/// ΔT = P·μa / (4πk), with distances folded from mm to m; the profile
/// decays over the perfusion length L_c = √(k / (ρ c w_b)).
pub fn steady_state(
    power_mw: f64,
    spot_radius_mm: f64,
    mu_a_per_mm: f64,
    tissue: TissueClass,
    application: ApplicationClass,
) -> SteadyStateReport {
    let props = tissue.properties();
    let k = props.conductivity_w_m_k;
    let power_w = power_mw / 1000.0;

    let delta_t_max_c = power_w * mu_a_per_mm / (4.0 * std::f64::consts::PI * k * 0.001);

    let perfusion_length_m = if props.perfusion_per_s > 0.0 {
        (k / (props.density_g_cm3 * 1000.0 * props.specific_heat_j_g_k * props.perfusion_per_s))
            .sqrt()
    } else {
        0.01
    };

    let temperature_profile_c = PROFILE_DISTANCES_MM
        .iter()
        .map(|&d| {
            let decay = (-(d / 1000.0) / perfusion_length_m).exp();
            (d, BODY_TEMPERATURE_C + delta_t_max_c * decay)
        })
        .collect();

    let limit_c = application.limits().max_temp_rise_c;
    let max_safe_power_mw = if delta_t_max_c > 0.0 {
        power_mw * limit_c / delta_t_max_c
    } else {
        power_mw
    };

    SteadyStateReport {
        power_mw,
        spot_radius_mm,
        delta_t_max_c,
        max_temperature_c: BODY_TEMPERATURE_C + delta_t_max_c,
        temperature_profile_c,
        thermal_penetration_depth_mm: perfusion_length_m * 1000.0,
        max_safe_power_mw,
        limit_c,
        exposure: Exposure::classify(delta_t_max_c, limit_c),
    }
}

/// Whether consecutive pulses arrive faster than the spot can cool.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseAccumulation {
    Significant,
    Minimal,
}

/// Transient assessment of pulsed illumination.
#[derive(Debug, Clone, Serialize)]
pub struct PulsedReport {
    pub peak_power_mw: f64,
    pub pulse_ms: f64,
    pub freq_hz: f64,
    pub duration_s: f64,
    pub duty_cycle: f64,
    pub average_power_mw: f64,
    pub total_pulses: u64,
    /// Diffusion time across the spot (ms).
    pub thermal_time_constant_ms: f64,
    /// Adiabatic temperature rise of a single pulse (°C).
    pub single_pulse_delta_t_c: f64,
    /// Steady-state rise from the time-averaged power (°C).
    pub steady_state_delta_t_c: f64,
    /// Worst-case instantaneous temperature (°C).
    pub peak_temperature_c: f64,
    pub accumulation: PulseAccumulation,
    pub limit_c: f64,
    /// Classification of the time-averaged rise; brief per-pulse peaks do
    /// not rescue a duty cycle that heats the bulk tissue.
    pub exposure: Exposure,
}

/// Temperature dynamics of a pulse train.
pub fn pulsed(
    peak_power_mw: f64,
    pulse_ms: f64,
    freq_hz: f64,
    duration_s: f64,
    mu_a_per_mm: f64,
    spot_radius_mm: f64,
    tissue: TissueClass,
    application: ApplicationClass,
) -> PulsedReport {
    let props = tissue.properties();
    let pulse_period_s = if freq_hz > 0.0 { 1.0 / freq_hz } else { 1.0 };
    let duty_cycle = ((pulse_ms / 1000.0) / pulse_period_s).min(1.0);
    let average_power_mw = peak_power_mw * duty_cycle;

    let rho_kg_m3 = props.density_g_cm3 * 1000.0;
    let c_j_kg_k = props.specific_heat_j_g_k * 1000.0;
    let k = props.conductivity_w_m_k;

    let thermal_diffusivity_m2_s = k / (rho_kg_m3 * c_j_kg_k);
    let spot_radius_m = spot_radius_mm / 1000.0;
    let tau_s = spot_radius_m * spot_radius_m / (4.0 * thermal_diffusivity_m2_s);

    // Adiabatic single-pulse rise: pulse energy deposited in roughly one
    // absorption length under the spot.
    let pulse_energy_j = peak_power_mw / 1000.0 * pulse_ms / 1000.0;
    let heated_volume_m3 = if mu_a_per_mm > 0.0 {
        std::f64::consts::PI * spot_radius_m * spot_radius_m * (1.0 / mu_a_per_mm / 1000.0)
    } else {
        0.0
    };
    let single_pulse_delta_t_c = if heated_volume_m3 > 0.0 {
        pulse_energy_j * mu_a_per_mm * 10.0 / (rho_kg_m3 * c_j_kg_k * heated_volume_m3)
    } else {
        0.0
    };

    let steady = steady_state(
        average_power_mw,
        spot_radius_mm,
        mu_a_per_mm,
        tissue,
        application,
    );

    let limit_c = application.limits().max_temp_rise_c;

    PulsedReport {
        peak_power_mw,
        pulse_ms,
        freq_hz,
        duration_s,
        duty_cycle,
        average_power_mw,
        total_pulses: (duration_s * freq_hz).max(0.0) as u64,
        thermal_time_constant_ms: tau_s * 1000.0,
        single_pulse_delta_t_c,
        steady_state_delta_t_c: steady.delta_t_max_c,
        peak_temperature_c: BODY_TEMPERATURE_C + single_pulse_delta_t_c + steady.delta_t_max_c,
        accumulation: if pulse_period_s < tau_s {
            PulseAccumulation::Significant
        } else {
            PulseAccumulation::Minimal
        },
        limit_c,
        exposure: Exposure::classify(steady.delta_t_max_c, limit_c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_power_is_safe() {
        let report = steady_state(
            1.0,
            0.1,
            0.03,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        assert!(report.exposure.is_safe());
        assert!(report.delta_t_max_c < 0.1);
    }

    #[test]
    fn test_delta_t_scales_linearly_with_power() {
        let a = steady_state(
            10.0,
            0.1,
            0.03,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        let b = steady_state(
            20.0,
            0.1,
            0.03,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        assert!((b.delta_t_max_c / a.delta_t_max_c - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_chronic_limit_is_stricter_than_acute() {
        // Same power, classified differently by exposure scenario.
        let power_mw = 400.0;
        let chronic = steady_state(
            power_mw,
            0.1,
            0.1,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        let acute = steady_state(
            power_mw,
            0.1,
            0.1,
            TissueClass::Brain,
            ApplicationClass::BrainAcute,
        );
        assert!(chronic.limit_c < acute.limit_c);
        assert!(chronic.delta_t_max_c > 0.0);
    }

    #[test]
    fn test_high_duty_cycle_flags_unsafe_despite_brief_pulses() {
        // 2 ms pulses are individually harmless, but at 400 Hz the duty
        // cycle is 0.8 and the averaged power cooks the tissue.
        let report = pulsed(
            800.0,
            2.0,
            400.0,
            10.0,
            0.1,
            0.1,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        assert!(report.duty_cycle > 0.5);
        assert!(report.single_pulse_delta_t_c < report.steady_state_delta_t_c);
        assert!(!report.exposure.is_safe());
    }

    #[test]
    fn test_sparse_pulses_are_safe() {
        let report = pulsed(
            10.0,
            2.0,
            5.0,
            10.0,
            0.03,
            0.1,
            TissueClass::Brain,
            ApplicationClass::BrainChronic,
        );
        assert!(report.duty_cycle < 0.05);
        assert!(report.exposure.is_safe());
    }
}
