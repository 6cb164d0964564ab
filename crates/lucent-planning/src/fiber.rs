//! Fiber-optic light delivery.
//!
//! A multimode fiber emits into a cone set by its numerical aperture; in
//! tissue the cone half-angle follows Snell's law, NA = n·sin θ. The spot
//! therefore grows with distance and the on-axis power density falls even
//! before attenuation is considered. A larger NA spreads the same launch
//! power over more tissue volume.

use serde::Serialize;

/// Geometry of a multimode delivery fiber.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FiberSpec {
    /// Core diameter (μm).
    pub core_diameter_um: f64,
    /// Numerical aperture.
    pub numerical_aperture: f64,
}

impl Default for FiberSpec {
    /// The workhorse 200 μm / 0.39 NA implant fiber.
    fn default() -> Self {
        Self {
            core_diameter_um: 200.0,
            numerical_aperture: 0.39,
        }
    }
}

impl FiberSpec {
    /// Core radius (mm).
    pub fn core_radius_mm(&self) -> f64 {
        self.core_diameter_um / 2000.0
    }

    /// Core cross-section area (mm²).
    pub fn core_area_mm2(&self) -> f64 {
        let r = self.core_radius_mm();
        std::f64::consts::PI * r * r
    }

    /// Emission cone half-angle in a medium of index `n` (radians).
    ///
    /// Clamped at π/2 when the NA exceeds the medium index.
    pub fn output_half_angle_rad(&self, n: f64) -> f64 {
        (self.numerical_aperture / n).min(1.0).asin()
    }

    /// Illuminated spot radius at `depth_mm` below the fiber tip (mm).
    pub fn spot_radius_mm(&self, depth_mm: f64, n: f64) -> f64 {
        self.core_radius_mm() + depth_mm * self.output_half_angle_rad(n).tan()
    }

    /// Illuminated spot area at depth (mm²).
    pub fn spot_area_mm2(&self, depth_mm: f64, n: f64) -> f64 {
        let r = self.spot_radius_mm(depth_mm, n);
        std::f64::consts::PI * r * r
    }

    /// Typical source-to-fiber coupling efficiency for this core size.
    pub fn coupling_efficiency(&self) -> f64 {
        if self.core_diameter_um >= 400.0 {
            0.7
        } else if self.core_diameter_um >= 200.0 {
            0.6
        } else {
            0.4
        }
    }
}

/// Spot geometry and power density at one distance from the fiber tip.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryPoint {
    pub distance_mm: f64,
    pub spot_diameter_mm: f64,
    pub power_density_mw_mm2: f64,
}

/// Beam expansion profile in tissue for a given launch power.
///
/// The per-millimetre power falloff approximates bulk coupling and ferrule
/// losses; scattering/absorption attenuation is the transport layer's job.
pub fn delivery_profile(
    fiber: &FiberSpec,
    input_power_mw: f64,
    tissue_n: f64,
    distances_mm: &[f64],
) -> Vec<DeliveryPoint> {
    distances_mm
        .iter()
        .map(|&d| {
            let spot_radius = fiber.spot_radius_mm(d, tissue_n);
            let spot_area = std::f64::consts::PI * spot_radius * spot_radius;
            let power = input_power_mw * (-0.1 * d).exp();
            DeliveryPoint {
                distance_mm: d,
                spot_diameter_mm: 2.0 * spot_radius,
                power_density_mw_mm2: power / spot_area,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spot_grows_with_depth() {
        let fiber = FiberSpec::default();
        let r0 = fiber.spot_radius_mm(0.0, 1.37);
        let r2 = fiber.spot_radius_mm(2.0, 1.37);
        assert_relative_eq!(r0, 0.1, max_relative = 1e-12);
        assert!(r2 > r0);
    }

    #[test]
    fn test_higher_na_spreads_more() {
        let narrow = FiberSpec {
            core_diameter_um: 200.0,
            numerical_aperture: 0.22,
        };
        let wide = FiberSpec {
            core_diameter_um: 200.0,
            numerical_aperture: 0.50,
        };
        assert!(wide.spot_radius_mm(2.0, 1.37) > narrow.spot_radius_mm(2.0, 1.37));
    }

    #[test]
    fn test_power_density_falls_with_distance() {
        let fiber = FiberSpec::default();
        let profile = delivery_profile(&fiber, 10.0, 1.37, &[0.0, 0.5, 1.0, 2.0]);
        for window in profile.windows(2) {
            assert!(window[1].power_density_mw_mm2 < window[0].power_density_mw_mm2);
        }
    }

    #[test]
    fn test_na_clamped_at_medium_index() {
        let fiber = FiberSpec {
            core_diameter_um: 200.0,
            numerical_aperture: 1.5,
        };
        assert_relative_eq!(
            fiber.output_half_angle_rad(1.33),
            std::f64::consts::FRAC_PI_2,
            max_relative = 1e-12
        );
    }
}
