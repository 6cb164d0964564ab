//! Angular statistics of the Henyey–Greenstein sampler.
//!
//! The mean cosine of the sampled deflection equals g by construction of
//! the phase function, and g = 0 must reduce to isotropic sampling.

use lucent_core::transport::sample_hg_cos_theta;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const N_SAMPLES: usize = 200_000;

fn moments(g: f64, seed: u64) -> (f64, f64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for _ in 0..N_SAMPLES {
        let c = sample_hg_cos_theta(g, &mut rng);
        assert!((-1.0..=1.0).contains(&c), "cosine outside [-1, 1]");
        sum += c;
        sum_sq += c * c;
    }
    let mean = sum / N_SAMPLES as f64;
    let var = sum_sq / N_SAMPLES as f64 - mean * mean;
    (mean, var)
}

#[test]
fn test_g_zero_is_isotropic() {
    let (mean, var) = moments(0.0, 5);
    // Uniform on [-1, 1]: mean 0, variance 1/3.
    assert!(mean.abs() < 0.01, "isotropic mean cosine was {mean}");
    assert!((var - 1.0 / 3.0).abs() < 0.01, "isotropic variance was {var}");
}

#[test]
fn test_mean_cosine_equals_g() {
    for &g in &[0.5, 0.9, 0.99] {
        let (mean, _) = moments(g, 17);
        assert!(
            (mean - g).abs() < 0.01,
            "mean cosine {mean} deviates from g = {g}"
        );
    }
}

#[test]
fn test_backward_peaked_sampling() {
    let (mean, _) = moments(-0.7, 29);
    assert!(
        (mean + 0.7).abs() < 0.01,
        "mean cosine {mean} deviates from g = -0.7"
    );
}
