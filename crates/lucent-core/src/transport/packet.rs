//! Single photon-packet random walk.
//!
//! Implements the classic weighted-packet scheme for layered media (Wang,
//! Jacques & Zheng, *Comput. Methods Programs Biomed.* **47**, 131, 1995):
//! exponential step sampling at the local interaction coefficient, partial
//! absorption at each interaction, Henyey–Greenstein direction sampling,
//! Fresnel reflect-or-transmit decisions at layer interfaces, and Russian
//! roulette termination for low-weight packets.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::tally::Tally;
use super::EngineConfig;

/// Direction cosines treated as vertical for the scattering rotation.
const COS_VERTICAL: f64 = 0.999_99;

/// Safety bound on interactions per packet. A packet that survives this
/// many events carries negligible weight; whatever remains is dropped.
const MAX_EVENTS: usize = 100_000;

/// A layer with resolved absolute depth boundaries.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedLayer {
    /// Top boundary depth (mm).
    pub z_top_mm: f64,
    /// Bottom boundary depth (mm), `f64::INFINITY` for the last layer of a
    /// semi-infinite stack.
    pub z_bottom_mm: f64,
    pub n: f64,
    pub mu_a_per_mm: f64,
    pub mu_s_per_mm: f64,
    pub g: f64,
}

impl ResolvedLayer {
    fn mu_t_per_mm(&self) -> f64 {
        self.mu_a_per_mm + self.mu_s_per_mm
    }
}

/// Trace one packet from the entry surface to termination, scoring into
/// `tally`.
///
/// The packet launches at the origin with unit weight, direction normal to
/// the surface. The ambient/tissue specular reflection is tallied before
/// the walk starts.
pub(crate) fn trace_packet(
    layers: &[ResolvedLayer],
    config: &EngineConfig,
    rng: &mut ChaCha8Rng,
    tally: &mut Tally,
) {
    let (mut x, mut y, mut z) = (0.0_f64, 0.0_f64, 0.0_f64);
    let (mut ux, mut uy, mut uz) = (0.0_f64, 0.0_f64, 1.0_f64);
    let mut weight = 1.0_f64;
    let mut idx = 0_usize;

    // Specular reflection at the entry surface (perpendicular incidence).
    let r_specular = fresnel_reflectance(config.ambient_n, layers[0].n, 1.0);
    tally.reflected += r_specular * weight;
    weight *= 1.0 - r_specular;

    for _ in 0..MAX_EVENTS {
        let layer = &layers[idx];
        let mu_t = layer.mu_t_per_mm();

        // Step length from the exponential free-path distribution.
        let step = if mu_t > 0.0 {
            let u: f64 = 1.0 - rng.gen::<f64>(); // (0, 1]
            -u.ln() / mu_t
        } else {
            f64::INFINITY
        };

        // Distance along the flight direction to the layer boundary.
        let dist_to_boundary = if uz > 0.0 {
            (layer.z_bottom_mm - z) / uz
        } else if uz < 0.0 {
            (layer.z_top_mm - z) / uz
        } else {
            f64::INFINITY
        };

        if step < dist_to_boundary {
            // Interaction inside the layer: deposit, then scatter.
            x += step * ux;
            y += step * uy;
            z += step * uz;

            let dw = weight * layer.mu_a_per_mm / mu_t;
            if dw > 0.0 {
                tally.deposit(z, (x * x + y * y).sqrt(), dw);
                weight -= dw;
            }

            let (nux, nuy, nuz) = scatter(ux, uy, uz, layer.g, rng);
            ux = nux;
            uy = nuy;
            uz = nuz;
        } else {
            // Move to the boundary; the remaining path is re-sampled in the
            // next medium on the following iteration, so no distance is
            // counted twice.
            x += dist_to_boundary * ux;
            y += dist_to_boundary * uy;
            z = if uz > 0.0 {
                layer.z_bottom_mm
            } else {
                layer.z_top_mm
            };

            if uz > 0.0 {
                // Downward crossing.
                let exiting = idx + 1 == layers.len();
                let n_next = if exiting {
                    config.ambient_n
                } else {
                    layers[idx + 1].n
                };
                let r = fresnel_reflectance(layer.n, n_next, uz.abs());
                if rng.gen::<f64>() < r {
                    uz = -uz;
                } else if exiting {
                    tally.transmitted += weight;
                    return;
                } else {
                    idx += 1;
                }
            } else {
                // Upward crossing.
                let exiting = idx == 0;
                let n_next = if exiting {
                    config.ambient_n
                } else {
                    layers[idx - 1].n
                };
                let r = fresnel_reflectance(layer.n, n_next, uz.abs());
                if rng.gen::<f64>() < r {
                    uz = -uz;
                } else if exiting {
                    tally.reflected += weight;
                    return;
                } else {
                    idx -= 1;
                }
            }
        }

        // Russian roulette: survivors are boosted by 1/p so the expected
        // estimate is preserved; losers are discarded.
        if weight < config.weight_threshold {
            if rng.gen::<f64>() < config.roulette_survival {
                weight /= config.roulette_survival;
            } else {
                return;
            }
        }
    }

    log::debug!("packet exceeded {MAX_EVENTS} events; dropping residual weight {weight:.3e}");
}

/// Unpolarized Fresnel reflectance at a planar interface.
///
/// Returns 1.0 beyond the critical angle (total internal reflection).
pub fn fresnel_reflectance(n1: f64, n2: f64, cos_theta1: f64) -> f64 {
    if (n1 - n2).abs() < 1e-12 {
        return 0.0;
    }
    let sin_theta1 = (1.0 - cos_theta1 * cos_theta1).max(0.0).sqrt();
    let sin_theta2 = n1 / n2 * sin_theta1;
    if sin_theta2 >= 1.0 {
        return 1.0;
    }
    let cos_theta2 = (1.0 - sin_theta2 * sin_theta2).sqrt();

    let rs = ((n1 * cos_theta1 - n2 * cos_theta2) / (n1 * cos_theta1 + n2 * cos_theta2)).powi(2);
    let rp = ((n1 * cos_theta2 - n2 * cos_theta1) / (n1 * cos_theta2 + n2 * cos_theta1)).powi(2);
    0.5 * (rs + rp)
}

/// Sample the cosine of the deflection angle from the Henyey–Greenstein
/// phase function; isotropic when |g| is negligible.
pub fn sample_hg_cos_theta(g: f64, rng: &mut ChaCha8Rng) -> f64 {
    if g.abs() < 1e-6 {
        return 2.0 * rng.gen::<f64>() - 1.0;
    }
    let temp = (1.0 - g * g) / (1.0 - g + 2.0 * g * rng.gen::<f64>());
    (((1.0 + g * g) - temp * temp) / (2.0 * g)).clamp(-1.0, 1.0)
}

/// Rotate the direction cosines by a HG-sampled deflection and a uniform
/// azimuth.
fn scatter(ux: f64, uy: f64, uz: f64, g: f64, rng: &mut ChaCha8Rng) -> (f64, f64, f64) {
    let cos_theta = sample_hg_cos_theta(g, rng);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let phi = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();

    if uz.abs() > COS_VERTICAL {
        // Nearly vertical flight: the general rotation degenerates.
        (
            sin_theta * cos_phi,
            sin_theta * sin_phi,
            uz.signum() * cos_theta,
        )
    } else {
        let temp = (1.0 - uz * uz).sqrt();
        (
            sin_theta * (ux * uz * cos_phi - uy * sin_phi) / temp + ux * cos_theta,
            sin_theta * (uy * uz * cos_phi + ux * sin_phi) / temp + uy * cos_theta,
            -sin_theta * cos_phi * temp + uz * cos_theta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fresnel_normal_incidence() {
        // (n1-n2)²/(n1+n2)² at perpendicular incidence.
        let r = fresnel_reflectance(1.0, 1.37, 1.0);
        let expected = ((1.0_f64 - 1.37) / (1.0 + 1.37)).powi(2);
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fresnel_matched_index_is_transparent() {
        assert_eq!(fresnel_reflectance(1.37, 1.37, 0.3), 0.0);
    }

    #[test]
    fn test_fresnel_total_internal_reflection() {
        // Grazing from dense to rare medium.
        assert_eq!(fresnel_reflectance(1.5, 1.0, 0.1), 1.0);
    }

    #[test]
    fn test_scatter_preserves_unit_norm() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (mut ux, mut uy, mut uz) = (0.0, 0.0, 1.0);
        for _ in 0..1000 {
            let (nx, ny, nz) = scatter(ux, uy, uz, 0.9, &mut rng);
            let norm = (nx * nx + ny * ny + nz * nz).sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "direction drifted off unit sphere");
            ux = nx;
            uy = ny;
            uz = nz;
        }
    }
}
