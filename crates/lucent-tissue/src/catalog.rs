//! Embedded tissue optical-property catalog.
//!
//! Spectral samples compiled from the biophotonics literature, principally
//! Jacques, *Phys. Med. Biol.* **58**, R37 (2013), with brain data after
//! Yaroslavsky *et al.* (2002) and skin data after Bashkatov *et al.* (2005).
//! Samples are `(wavelength_nm, μa mm⁻¹, μs mm⁻¹, g)`; refractive indices
//! are treated as wavelength-independent over the visible/NIR window.

use crate::store::{TissueCategory, TissueRecord};

/// All tissues shipped with the built-in catalog.
pub fn builtin_tissues() -> Vec<TissueRecord> {
    vec![
        brain_gray_matter(),
        brain_white_matter(),
        cerebrospinal_fluid(),
        skin_epidermis(),
        skin_dermis(),
        adipose_tissue(),
        bone_cortical(),
        muscle_skeletal(),
        liver(),
        glioma(),
        breast_tumor(),
    ]
}

fn brain_gray_matter() -> TissueRecord {
    TissueRecord::new(
        "brain_gray_matter",
        "Brain gray matter",
        TissueCategory::Neural,
        1.37,
        vec![
            (400.0, 0.620, 42.0, 0.85),
            (450.0, 0.330, 33.0, 0.87),
            (480.0, 0.210, 28.0, 0.88),
            (530.0, 0.170, 22.0, 0.89),
            (560.0, 0.120, 18.0, 0.89),
            (630.0, 0.030, 10.0, 0.90),
            (700.0, 0.024, 9.3, 0.90),
            (800.0, 0.020, 8.6, 0.90),
            (900.0, 0.025, 8.0, 0.90),
            (1000.0, 0.030, 7.5, 0.90),
        ],
    )
}

fn brain_white_matter() -> TissueRecord {
    TissueRecord::new(
        "brain_white_matter",
        "Brain white matter",
        TissueCategory::Neural,
        1.38,
        vec![
            (400.0, 0.400, 95.0, 0.82),
            (480.0, 0.170, 78.0, 0.85),
            (530.0, 0.150, 68.0, 0.86),
            (630.0, 0.020, 44.0, 0.87),
            (700.0, 0.016, 40.0, 0.88),
            (800.0, 0.014, 37.0, 0.88),
            (900.0, 0.018, 34.0, 0.89),
            (1000.0, 0.022, 31.0, 0.89),
        ],
    )
}

fn cerebrospinal_fluid() -> TissueRecord {
    // Nearly transparent; included for multi-layer head models.
    TissueRecord::new(
        "cerebrospinal_fluid",
        "Cerebrospinal fluid",
        TissueCategory::Neural,
        1.33,
        vec![
            (400.0, 0.004, 0.35, 0.99),
            (630.0, 0.001, 0.10, 0.99),
            (800.0, 0.002, 0.08, 0.99),
            (1000.0, 0.004, 0.06, 0.99),
        ],
    )
}

fn skin_epidermis() -> TissueRecord {
    // Baseline (melanin-free) epidermis; melanin is added per-query by the
    // caller when a pigmented model is wanted.
    TissueRecord::new(
        "skin_epidermis",
        "Skin epidermis",
        TissueCategory::Skin,
        1.43,
        vec![
            (400.0, 1.500, 55.0, 0.75),
            (450.0, 0.900, 48.0, 0.76),
            (500.0, 0.550, 43.0, 0.77),
            (550.0, 0.350, 38.0, 0.78),
            (630.0, 0.180, 32.0, 0.80),
            (700.0, 0.120, 28.0, 0.81),
            (800.0, 0.080, 23.0, 0.82),
            (900.0, 0.070, 20.0, 0.83),
            (1000.0, 0.090, 18.0, 0.84),
        ],
    )
}

fn skin_dermis() -> TissueRecord {
    TissueRecord::new(
        "skin_dermis",
        "Skin dermis",
        TissueCategory::Skin,
        1.40,
        vec![
            (400.0, 0.850, 30.0, 0.82),
            (450.0, 0.500, 25.0, 0.83),
            (500.0, 0.300, 21.0, 0.84),
            (550.0, 0.250, 18.0, 0.84),
            (630.0, 0.055, 10.5, 0.85),
            (700.0, 0.035, 9.3, 0.85),
            (800.0, 0.028, 8.0, 0.86),
            (900.0, 0.035, 7.2, 0.86),
            (1000.0, 0.045, 6.6, 0.87),
        ],
    )
}

fn adipose_tissue() -> TissueRecord {
    TissueRecord::new(
        "adipose_tissue",
        "Adipose (subcutaneous fat)",
        TissueCategory::Connective,
        1.44,
        vec![
            (400.0, 0.250, 32.0, 0.90),
            (500.0, 0.110, 27.0, 0.90),
            (630.0, 0.010, 19.0, 0.90),
            (700.0, 0.009, 17.0, 0.90),
            (800.0, 0.010, 15.0, 0.90),
            (900.0, 0.016, 13.5, 0.90),
            (1000.0, 0.024, 12.5, 0.90),
        ],
    )
}

fn bone_cortical() -> TissueRecord {
    TissueRecord::new(
        "bone_cortical",
        "Cortical bone",
        TissueCategory::Connective,
        1.55,
        vec![
            (400.0, 0.350, 42.0, 0.92),
            (500.0, 0.200, 36.0, 0.92),
            (630.0, 0.045, 28.0, 0.92),
            (700.0, 0.035, 25.0, 0.92),
            (800.0, 0.030, 22.0, 0.92),
            (900.0, 0.035, 20.0, 0.92),
            (1000.0, 0.045, 18.0, 0.92),
        ],
    )
}

fn muscle_skeletal() -> TissueRecord {
    TissueRecord::new(
        "muscle_skeletal",
        "Skeletal muscle",
        TissueCategory::Organ,
        1.37,
        vec![
            (400.0, 1.200, 38.0, 0.90),
            (500.0, 0.550, 32.0, 0.90),
            (630.0, 0.090, 22.0, 0.90),
            (700.0, 0.050, 19.0, 0.90),
            (800.0, 0.028, 16.0, 0.90),
            (900.0, 0.032, 14.0, 0.90),
            (1000.0, 0.040, 13.0, 0.90),
        ],
    )
}

fn liver() -> TissueRecord {
    TissueRecord::new(
        "liver",
        "Liver",
        TissueCategory::Organ,
        1.38,
        vec![
            (400.0, 2.200, 40.0, 0.93),
            (500.0, 1.100, 33.0, 0.93),
            (630.0, 0.320, 24.0, 0.93),
            (700.0, 0.170, 21.0, 0.93),
            (800.0, 0.065, 18.0, 0.93),
            (900.0, 0.060, 16.0, 0.93),
            (1000.0, 0.070, 14.0, 0.93),
        ],
    )
}

fn glioma() -> TissueRecord {
    TissueRecord::new(
        "glioma",
        "Glioma (brain tumor)",
        TissueCategory::Tumor,
        1.39,
        vec![
            (400.0, 0.800, 50.0, 0.88),
            (500.0, 0.400, 40.0, 0.88),
            (630.0, 0.060, 24.0, 0.88),
            (700.0, 0.045, 21.0, 0.88),
            (800.0, 0.035, 18.0, 0.88),
            (900.0, 0.040, 16.0, 0.88),
            (1000.0, 0.050, 15.0, 0.88),
        ],
    )
}

fn breast_tumor() -> TissueRecord {
    TissueRecord::new(
        "breast_tumor",
        "Breast tumor",
        TissueCategory::Tumor,
        1.40,
        vec![
            (400.0, 0.550, 45.0, 0.88),
            (500.0, 0.280, 36.0, 0.88),
            (630.0, 0.050, 22.0, 0.88),
            (700.0, 0.040, 19.0, 0.88),
            (800.0, 0.030, 16.0, 0.88),
            (900.0, 0.038, 14.0, 0.88),
            (1000.0, 0.048, 13.0, 0.88),
        ],
    )
}
