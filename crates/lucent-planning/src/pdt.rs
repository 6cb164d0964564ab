//! Photodynamic-therapy dosimetry.
//!
//! The photodynamic dose couples the light that reaches the target with
//! the photosensitizer's ability to absorb it and convert it to singlet
//! oxygen: dose ∝ Φ · ε(λ) · [PS] · Φ_Δ. Fluence at depth uses the
//! diffuse-light modified Beer–Lambert form with a backscatter buildup
//! factor.

use serde::Serialize;

use lucent_tissue::photosensitizers::PhotosensitizerRecord;

use crate::PlanningError;

/// Backscatter buildup of diffuse fluence just below the surface; 3–5 for
/// red light in soft tissue.
const BUILDUP_FACTOR: f64 = 3.0;

/// Normalization of the relative dose scale.
const DOSE_SCALE: f64 = 1000.0;

/// Relative dose at which the therapeutic index reads 1.0.
const THERAPEUTIC_THRESHOLD: f64 = 10.0;

/// Light fluence delivered to a target depth.
#[derive(Debug, Clone, Serialize)]
pub struct FluenceAtDepth {
    pub surface_fluence_j_cm2: f64,
    pub depth_fluence_j_cm2: f64,
    /// Peak fluence just below the surface from backscatter buildup.
    pub peak_fluence_j_cm2: f64,
    pub peak_depth_mm: f64,
    pub transmission_fraction: f64,
    pub buildup_factor: f64,
}

/// Fluence reaching `depth_mm` for a given surface irradiance and exposure.
///
/// Φ(z) = Φ₀ · k · exp(−μeff·z), with buildup factor k for the
/// backscattered diffuse field.
pub fn fluence_at_depth(
    surface_irradiance_mw_cm2: f64,
    exposure_time_s: f64,
    depth_mm: f64,
    mu_eff_per_mm: f64,
) -> FluenceAtDepth {
    let surface_fluence_j_cm2 = surface_irradiance_mw_cm2 * exposure_time_s / 1000.0;
    let transmission_fraction = (-mu_eff_per_mm * depth_mm).exp();
    let peak_depth_mm = if mu_eff_per_mm > 0.0 {
        1.0 / mu_eff_per_mm
    } else {
        1.0
    };

    FluenceAtDepth {
        surface_fluence_j_cm2,
        depth_fluence_j_cm2: surface_fluence_j_cm2 * BUILDUP_FACTOR * transmission_fraction,
        peak_fluence_j_cm2: surface_fluence_j_cm2 * BUILDUP_FACTOR * (-1.0_f64).exp(),
        peak_depth_mm,
        transmission_fraction,
        buildup_factor: BUILDUP_FACTOR,
    }
}

/// Photodynamic dose metrics for one delivery.
#[derive(Debug, Clone, Serialize)]
pub struct DoseReport {
    /// Φ · ε · [PS] (relative units).
    pub absorbed_light_dose: f64,
    /// Absorbed dose weighted by the singlet-oxygen quantum yield.
    pub singlet_oxygen_dose: f64,
    /// Scaled dose index.
    pub pdt_dose_relative: f64,
    /// Dose normalized to the empirical cell-kill threshold.
    pub therapeutic_index: f64,
}

impl DoseReport {
    fn from_absorbed(absorbed: f64, singlet_oxygen_yield: f64) -> Self {
        let singlet = absorbed * singlet_oxygen_yield;
        let relative = singlet * DOSE_SCALE;
        Self {
            absorbed_light_dose: absorbed,
            singlet_oxygen_dose: singlet,
            pdt_dose_relative: relative,
            therapeutic_index: relative / THERAPEUTIC_THRESHOLD,
        }
    }

    fn accumulate(&mut self, other: &DoseReport) {
        self.absorbed_light_dose += other.absorbed_light_dose;
        self.singlet_oxygen_dose += other.singlet_oxygen_dose;
        self.pdt_dose_relative += other.pdt_dose_relative;
        self.therapeutic_index += other.therapeutic_index;
    }
}

/// One component of a spectral delivery.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpectralDelivery {
    pub wavelength_nm: f64,
    pub fluence_j_cm2: f64,
}

/// Photodynamic dose for a single-wavelength delivery.
///
/// The photosensitizer's extinction is interpolated at the delivery
/// wavelength, so delivering off-peak is representable and simply yields a
/// lower dose.
pub fn dose(
    photosensitizer: &PhotosensitizerRecord,
    wavelength_nm: f64,
    fluence_j_cm2: f64,
    concentration_um: f64,
) -> Result<DoseReport, PlanningError> {
    let extinction = photosensitizer.extinction_m_cm(wavelength_nm)?;
    let concentration_m = concentration_um * 1e-6;
    let absorbed = fluence_j_cm2 * extinction * concentration_m;
    Ok(DoseReport::from_absorbed(
        absorbed,
        photosensitizer.singlet_oxygen_yield,
    ))
}

/// Cumulative dose for a multi-wavelength delivery: contributions are
/// integrated across the requested wavelength set.
pub fn spectral_dose(
    photosensitizer: &PhotosensitizerRecord,
    deliveries: &[SpectralDelivery],
    concentration_um: f64,
) -> Result<DoseReport, PlanningError> {
    let mut total = DoseReport::from_absorbed(0.0, photosensitizer.singlet_oxygen_yield);
    for delivery in deliveries {
        let component = dose(
            photosensitizer,
            delivery.wavelength_nm,
            delivery.fluence_j_cm2,
            concentration_um,
        )?;
        total.accumulate(&component);
    }
    Ok(total)
}

/// Required treatment timing for a target fluence.
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentTime {
    pub exposure_time_s: f64,
    pub exposure_time_min: f64,
    pub target_fluence_j_cm2: f64,
    pub effective_irradiance_mw_cm2: f64,
    pub safety_margin: f64,
}

/// Exposure time to reach `target_fluence_j_cm2` at the applied irradiance,
/// derated by a delivery safety margin.
pub fn treatment_time(
    target_fluence_j_cm2: f64,
    irradiance_mw_cm2: f64,
    safety_margin: f64,
) -> TreatmentTime {
    let effective = irradiance_mw_cm2 * safety_margin;
    let time_s = target_fluence_j_cm2 * 1000.0 / effective;
    TreatmentTime {
        exposure_time_s: time_s,
        exposure_time_min: time_s / 60.0,
        target_fluence_j_cm2,
        effective_irradiance_mw_cm2: effective,
        safety_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lucent_tissue::photosensitizers::PhotosensitizerCatalog;

    #[test]
    fn test_fluence_decays_with_depth() {
        let shallow = fluence_at_depth(100.0, 600.0, 1.0, 0.3);
        let deep = fluence_at_depth(100.0, 600.0, 5.0, 0.3);
        assert_relative_eq!(shallow.surface_fluence_j_cm2, 60.0, max_relative = 1e-12);
        assert!(deep.depth_fluence_j_cm2 < shallow.depth_fluence_j_cm2);
    }

    #[test]
    fn test_dose_scales_with_concentration_and_yield() {
        let catalog = PhotosensitizerCatalog::builtin();
        let photofrin = catalog.get("Photofrin").unwrap();
        let low = dose(photofrin, 630.0, 100.0, 1.0).unwrap();
        let high = dose(photofrin, 630.0, 100.0, 10.0).unwrap();
        assert_relative_eq!(
            high.pdt_dose_relative / low.pdt_dose_relative,
            10.0,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            low.singlet_oxygen_dose,
            low.absorbed_light_dose * photofrin.singlet_oxygen_yield,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_off_peak_delivery_yields_lower_dose() {
        let catalog = PhotosensitizerCatalog::builtin();
        let foscan = catalog.get("Foscan").unwrap();
        let on_peak = dose(foscan, 652.0, 50.0, 5.0).unwrap();
        let off_peak = dose(foscan, 600.0, 50.0, 5.0).unwrap();
        assert!(on_peak.pdt_dose_relative > off_peak.pdt_dose_relative);
    }

    #[test]
    fn test_spectral_dose_sums_components() {
        let catalog = PhotosensitizerCatalog::builtin();
        let photofrin = catalog.get("Photofrin").unwrap();
        let a = dose(photofrin, 630.0, 40.0, 5.0).unwrap();
        let b = dose(photofrin, 505.0, 20.0, 5.0).unwrap();
        let combined = spectral_dose(
            photofrin,
            &[
                SpectralDelivery {
                    wavelength_nm: 630.0,
                    fluence_j_cm2: 40.0,
                },
                SpectralDelivery {
                    wavelength_nm: 505.0,
                    fluence_j_cm2: 20.0,
                },
            ],
            5.0,
        )
        .unwrap();
        assert_relative_eq!(
            combined.pdt_dose_relative,
            a.pdt_dose_relative + b.pdt_dose_relative,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_treatment_time_inverse_in_irradiance() {
        let slow = treatment_time(75.0, 50.0, 0.9);
        let fast = treatment_time(75.0, 100.0, 0.9);
        assert_relative_eq!(
            slow.exposure_time_s / fast.exposure_time_s,
            2.0,
            max_relative = 1e-9
        );
    }
}
