//! Diffusion-approximation optics.
//!
//! Closed-form quantities derived from the three transport coefficients:
//! reduced scattering μs′ = μs(1−g), effective attenuation
//! μeff = √(3μa(μa+μs′)), penetration depth δ = 1/μeff, and the
//! semi-infinite diffuse reflectance.
//!
//! # Reference
//! Flock, Patterson, Wilson & Wyman, *IEEE Trans. Biomed. Eng.* **36**,
//! 1162 (1989); Jacques, *Phys. Med. Biol.* **58**, R37 (2013).

use serde::Serialize;
use thiserror::Error;

/// Errors from the diffusion calculator.
#[derive(Debug, Error)]
pub enum DiffusionError {
    #[error("Invalid coefficient {name} = {value}: must be non-negative")]
    InvalidCoefficients { name: &'static str, value: f64 },
}

/// Exponential attenuation of fluence with depth.
///
/// A medium with neither absorption nor scattering does not attenuate at
/// all; that case is a sentinel, not an error.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Attenuation {
    Finite {
        /// Effective attenuation coefficient (mm⁻¹).
        mu_eff_per_mm: f64,
        /// Optical penetration depth δ = 1/μeff (mm).
        penetration_depth_mm: f64,
    },
    NonAttenuating,
}

impl Attenuation {
    /// μeff in mm⁻¹, zero for the non-attenuating sentinel.
    pub fn mu_eff_per_mm(&self) -> f64 {
        match self {
            Attenuation::Finite { mu_eff_per_mm, .. } => *mu_eff_per_mm,
            Attenuation::NonAttenuating => 0.0,
        }
    }

    /// Fluence attenuation factor exp(−μeff·z) at depth `z_mm`.
    pub fn factor_at_depth(&self, z_mm: f64) -> f64 {
        (-self.mu_eff_per_mm() * z_mm).exp()
    }
}

/// Derived diffusion-approximation quantities for one coefficient set.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedOptics {
    /// Reduced scattering coefficient μs′ (mm⁻¹).
    pub mu_s_prime_per_mm: f64,
    pub attenuation: Attenuation,
    /// Diffuse reflectance of a semi-infinite slab of this medium.
    pub diffuse_reflectance: f64,
}

/// Compute derived optics from (μa, μs, g) and the tissue/ambient relative
/// refractive index.
///
/// Negative coefficients are an input error. μa = μs′ = 0 yields the
/// [`Attenuation::NonAttenuating`] sentinel.
pub fn derive(
    mu_a_per_mm: f64,
    mu_s_per_mm: f64,
    g: f64,
    n_relative: f64,
) -> Result<DerivedOptics, DiffusionError> {
    if mu_a_per_mm < 0.0 {
        return Err(DiffusionError::InvalidCoefficients {
            name: "mu_a",
            value: mu_a_per_mm,
        });
    }
    if mu_s_per_mm < 0.0 {
        return Err(DiffusionError::InvalidCoefficients {
            name: "mu_s",
            value: mu_s_per_mm,
        });
    }
    let mu_s_prime = mu_s_per_mm * (1.0 - g);
    if mu_s_prime < 0.0 {
        return Err(DiffusionError::InvalidCoefficients {
            name: "mu_s_prime",
            value: mu_s_prime,
        });
    }

    let attenuation = if mu_a_per_mm == 0.0 && mu_s_prime == 0.0 {
        Attenuation::NonAttenuating
    } else {
        let mu_eff = (3.0 * mu_a_per_mm * (mu_a_per_mm + mu_s_prime)).sqrt();
        if mu_eff > 0.0 {
            Attenuation::Finite {
                mu_eff_per_mm: mu_eff,
                penetration_depth_mm: 1.0 / mu_eff,
            }
        } else {
            // Scattering without absorption: fluence spreads but is never
            // removed, so the exponential-decay description degenerates.
            Attenuation::NonAttenuating
        }
    };

    Ok(DerivedOptics {
        mu_s_prime_per_mm: mu_s_prime,
        attenuation,
        diffuse_reflectance: diffuse_reflectance(mu_a_per_mm, mu_s_prime, n_relative),
    })
}

/// Semi-infinite diffuse reflectance in the diffusion approximation.
///
/// $R_d = \frac{a'}{1 + 2A(1-a') + (1 + 2A/3)\sqrt{3(1-a')}}$
///
/// with transport albedo $a' = \mu_s'/(\mu_a + \mu_s')$ and internal
/// reflection parameter $A = (1+r_i)/(1-r_i)$ from the empirical fit of
/// Egan & Hilgeman for the relative index mismatch.
pub fn diffuse_reflectance(mu_a_per_mm: f64, mu_s_prime_per_mm: f64, n_relative: f64) -> f64 {
    let total = mu_a_per_mm + mu_s_prime_per_mm;
    if total <= 0.0 {
        return 0.0;
    }
    let albedo = mu_s_prime_per_mm / total;
    let a = internal_reflection_parameter(n_relative);
    let one_minus = 1.0 - albedo;
    albedo / (1.0 + 2.0 * a * one_minus + (1.0 + 2.0 * a / 3.0) * (3.0 * one_minus).sqrt())
}

/// Internal reflection parameter A from the Egan–Hilgeman fit.
fn internal_reflection_parameter(n_relative: f64) -> f64 {
    if (n_relative - 1.0).abs() < 1e-9 {
        return 1.0;
    }
    let r_i = -1.440 / (n_relative * n_relative) + 0.710 / n_relative + 0.668
        + 0.0636 * n_relative;
    (1.0 + r_i) / (1.0 - r_i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gray_matter_reference_values() {
        // μa = 0.03 mm⁻¹, μs = 10 mm⁻¹, g = 0.9: the canonical red-light
        // gray-matter operating point.
        let d = derive(0.03, 10.0, 0.9, 1.37).unwrap();
        assert_relative_eq!(d.mu_s_prime_per_mm, 1.0, max_relative = 1e-9);
        match d.attenuation {
            Attenuation::Finite {
                mu_eff_per_mm,
                penetration_depth_mm,
            } => {
                assert_relative_eq!(
                    mu_eff_per_mm,
                    (3.0_f64 * 0.03 * 1.03).sqrt(),
                    max_relative = 1e-12
                );
                assert_relative_eq!(mu_eff_per_mm, 0.304, max_relative = 2e-3);
                assert_relative_eq!(penetration_depth_mm, 3.28, max_relative = 2e-3);
            }
            Attenuation::NonAttenuating => panic!("expected finite attenuation"),
        }
    }

    #[test]
    fn test_mu_eff_positive_whenever_mu_a_positive() {
        for &mu_a in &[1e-6, 0.01, 0.1, 1.0, 10.0] {
            for &mu_s in &[0.0, 0.1, 10.0, 100.0] {
                let d = derive(mu_a, mu_s, 0.9, 1.4).unwrap();
                assert!(
                    d.attenuation.mu_eff_per_mm() > 0.0,
                    "μeff must be positive for μa = {}",
                    mu_a
                );
            }
        }
    }

    #[test]
    fn test_penetration_depth_monotone_in_mu_a() {
        let mut last_depth = f64::INFINITY;
        for &mu_a in &[0.001, 0.01, 0.03, 0.1, 0.3, 1.0] {
            let d = derive(mu_a, 10.0, 0.9, 1.37).unwrap();
            let depth = match d.attenuation {
                Attenuation::Finite {
                    penetration_depth_mm,
                    ..
                } => penetration_depth_mm,
                Attenuation::NonAttenuating => f64::INFINITY,
            };
            assert!(
                depth <= last_depth,
                "penetration depth must not increase with μa"
            );
            last_depth = depth;
        }
    }

    #[test]
    fn test_non_attenuating_sentinel() {
        let d = derive(0.0, 0.0, 0.0, 1.0).unwrap();
        assert!(matches!(d.attenuation, Attenuation::NonAttenuating));
        assert_eq!(d.attenuation.factor_at_depth(100.0), 1.0);
    }

    #[test]
    fn test_negative_coefficients_rejected() {
        assert!(matches!(
            derive(-0.1, 1.0, 0.9, 1.4),
            Err(DiffusionError::InvalidCoefficients { name: "mu_a", .. })
        ));
        assert!(matches!(
            derive(0.1, -1.0, 0.9, 1.4),
            Err(DiffusionError::InvalidCoefficients { name: "mu_s", .. })
        ));
    }

    #[test]
    fn test_reflectance_bounds() {
        // Strong scatterers reflect most light, strong absorbers very little.
        let bright = diffuse_reflectance(0.01, 5.0, 1.4);
        let dark = diffuse_reflectance(5.0, 0.5, 1.4);
        assert!(bright > 0.3 && bright < 1.0);
        assert!(dark < 0.05);
        assert!(bright > dark);
    }
}
