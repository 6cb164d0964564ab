//! Validation against the Beer–Lambert law.
//!
//! With scattering switched off and the refractive index matched to the
//! ambient medium, photons travel straight through a slab and the
//! transmitted fraction must reduce to exp(−μa·L).

use lucent_core::transport::MonteCarloEngine;
use lucent_core::types::{GridSpec, Layer, RunSpec, Thickness, TissueStack};

#[test]
fn test_pure_absorber_matches_beer_lambert() {
    let mu_a = 0.5; // mm⁻¹
    let thickness = 2.0; // mm

    let stack = TissueStack::new(vec![Layer {
        name: "pure absorber".into(),
        thickness: Thickness::Millimetres(thickness),
        n: 1.0, // index-matched: no specular loss, no internal reflection
        mu_a_per_mm: mu_a,
        mu_s_per_mm: 0.0,
        g: 0.0,
    }]);

    let n_photons = 20_000;
    let engine = MonteCarloEngine::new();
    let result = engine
        .simulate(
            &stack,
            &RunSpec {
                wavelength_nm: 630.0,
                n_photons,
                seed: 20240817,
                grid: GridSpec::default(),
            },
        )
        .unwrap();

    let analytic = (-mu_a * thickness).exp();
    // Binomial noise: σ = √(p(1−p)/N) ≈ 0.0034 here; 0.02 is > 5σ.
    assert!(
        (result.transmittance - analytic).abs() < 0.02,
        "MC transmittance {} vs Beer–Lambert {}",
        result.transmittance,
        analytic
    );
    // Without scattering nothing comes back out of the slab.
    assert!(result.reflectance < 1e-12);
    assert!(!result.under_sampled);
}

#[test]
fn test_thicker_slab_transmits_less() {
    let engine = MonteCarloEngine::new();
    let mut last = 1.0;
    for &thickness in &[0.5, 1.0, 2.0, 4.0] {
        let stack = TissueStack::new(vec![Layer {
            name: "absorber".into(),
            thickness: Thickness::Millimetres(thickness),
            n: 1.0,
            mu_a_per_mm: 0.5,
            mu_s_per_mm: 0.0,
            g: 0.0,
        }]);
        let result = engine
            .simulate(
                &stack,
                &RunSpec {
                    wavelength_nm: 630.0,
                    n_photons: 10_000,
                    seed: 7,
                    grid: GridSpec::default(),
                },
            )
            .unwrap();
        assert!(
            result.transmittance < last,
            "transmittance must fall with thickness"
        );
        last = result.transmittance;
    }
}
