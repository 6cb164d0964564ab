//! Energy conservation of the transport engine.
//!
//! Absorbed + reflected + transmitted must approach 1 as the photon budget
//! grows; roulette termination is the only source of imbalance and it is
//! unbiased, so the residual shrinks like 1/√N.

use lucent_core::transport::MonteCarloEngine;
use lucent_core::types::{GridSpec, Layer, RunSpec, Thickness, TissueStack};

fn imbalance(stack: &TissueStack, n_photons: usize, seed: u64) -> f64 {
    let engine = MonteCarloEngine::new();
    let result = engine
        .simulate(
            stack,
            &RunSpec {
                wavelength_nm: 630.0,
                n_photons,
                seed,
                grid: GridSpec::default(),
            },
        )
        .unwrap();
    (result.reflectance + result.transmittance + result.absorbed_fraction - 1.0).abs()
}

#[test]
fn test_semi_infinite_slab_conserves_energy() {
    let stack = TissueStack::semi_infinite_slab("gray matter", 1.37, 0.03, 10.0, 0.9);
    assert!(
        imbalance(&stack, 5_000, 11) < 0.02,
        "energy imbalance too large"
    );
}

#[test]
fn test_layered_stack_with_index_mismatch_conserves_energy() {
    let stack = TissueStack::new(vec![
        Layer {
            name: "gray matter".into(),
            thickness: Thickness::Millimetres(3.0),
            n: 1.37,
            mu_a_per_mm: 0.03,
            mu_s_per_mm: 10.0,
            g: 0.9,
        },
        Layer {
            name: "white matter".into(),
            thickness: Thickness::SemiInfinite,
            n: 1.38,
            mu_a_per_mm: 0.02,
            mu_s_per_mm: 44.0,
            g: 0.87,
        },
    ]);
    assert!(
        imbalance(&stack, 5_000, 23) < 0.02,
        "energy imbalance too large"
    );
}

#[test]
fn test_imbalance_shrinks_with_photon_count() {
    let stack = TissueStack::semi_infinite_slab("gray matter", 1.37, 0.03, 10.0, 0.9);
    // Averaged over a few seeds so the comparison is not hostage to one
    // lucky draw.
    let mean = |n: usize| -> f64 {
        (0..4).map(|s| imbalance(&stack, n, 100 + s)).sum::<f64>() / 4.0
    };
    let coarse = mean(500);
    let fine = mean(20_000);
    assert!(
        fine < coarse + 0.005,
        "imbalance did not shrink: {} photons → {:.4}, vs {:.4}",
        20_000,
        fine,
        coarse
    );
}
