//! Photosensitizer catalog for photodynamic-therapy dosimetry.
//!
//! Each record carries a coarse molar absorption spectrum (Soret band plus
//! the therapeutic Q-band) so dose calculations can be evaluated at any
//! delivery wavelength, not only at the nominal activation peak. Spectra
//! and singlet-oxygen yields follow the clinical PDT literature
//! (Agostinis *et al.*, *CA Cancer J. Clin.* **61**, 250, 2011).

use serde::Serialize;
use thiserror::Error;

use crate::interp::LinearTable;

/// Errors from photosensitizer catalog lookups.
#[derive(Debug, Error)]
pub enum PhotosensitizerError {
    #[error("Unknown photosensitizer: {0}")]
    UnknownPhotosensitizer(String),

    #[error(
        "Wavelength {wavelength_nm} nm is outside the absorption spectrum [{min_nm}, {max_nm}] nm of '{photosensitizer_id}'"
    )]
    WavelengthOutOfRange {
        photosensitizer_id: String,
        wavelength_nm: f64,
        min_nm: f64,
        max_nm: f64,
    },
}

/// Chemical family of a photosensitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotosensitizerClass {
    Porphyrin,
    Chlorin,
    Bacteriochlorin,
}

/// A photosensitizer with its photophysical and clinical parameters.
pub struct PhotosensitizerRecord {
    pub id: &'static str,
    pub generic_name: &'static str,
    pub class: PhotosensitizerClass,
    /// Nominal clinical activation wavelength (nm).
    pub activation_wavelength_nm: f64,
    /// Singlet-oxygen quantum yield Φ_Δ.
    pub singlet_oxygen_yield: f64,
    /// Hours between drug administration and illumination.
    pub drug_light_interval_h: f64,
    /// Typical systemic dose (mg/kg).
    pub typical_dose_mg_kg: f64,
    absorption: LinearTable,
}

impl PhotosensitizerRecord {
    /// Molar extinction coefficient ε(λ) in M⁻¹cm⁻¹.
    pub fn extinction_m_cm(&self, wavelength_nm: f64) -> Result<f64, PhotosensitizerError> {
        if !self.absorption.contains(wavelength_nm) {
            let (min_nm, max_nm) = self.absorption.domain();
            return Err(PhotosensitizerError::WavelengthOutOfRange {
                photosensitizer_id: self.id.to_string(),
                wavelength_nm,
                min_nm,
                max_nm,
            });
        }
        Ok(self.absorption.evaluate(wavelength_nm))
    }

    /// Wavelength range of the tabulated absorption spectrum (nm).
    pub fn spectrum_range_nm(&self) -> (f64, f64) {
        self.absorption.domain()
    }
}

/// Read-only photosensitizer catalog.
pub struct PhotosensitizerCatalog {
    records: Vec<PhotosensitizerRecord>,
}

impl PhotosensitizerCatalog {
    /// The embedded catalog of clinically used photosensitizers.
    pub fn builtin() -> Self {
        use PhotosensitizerClass::*;
        let records = vec![
            PhotosensitizerRecord {
                id: "Photofrin",
                generic_name: "Porfimer sodium",
                class: Porphyrin,
                activation_wavelength_nm: 630.0,
                singlet_oxygen_yield: 0.89,
                drug_light_interval_h: 48.0,
                typical_dose_mg_kg: 2.0,
                absorption: LinearTable::new(
                    vec![380.0, 400.0, 505.0, 540.0, 580.0, 630.0, 700.0],
                    vec![90_000.0, 120_000.0, 8_000.0, 6_000.0, 4_500.0, 3_000.0, 500.0],
                ),
            },
            PhotosensitizerRecord {
                id: "Foscan",
                generic_name: "Temoporfin (mTHPC)",
                class: Chlorin,
                activation_wavelength_nm: 652.0,
                singlet_oxygen_yield: 0.87,
                drug_light_interval_h: 96.0,
                typical_dose_mg_kg: 0.15,
                absorption: LinearTable::new(
                    vec![380.0, 420.0, 520.0, 600.0, 652.0, 700.0],
                    vec![80_000.0, 150_000.0, 10_000.0, 8_000.0, 30_000.0, 2_000.0],
                ),
            },
            PhotosensitizerRecord {
                id: "Verteporfin",
                generic_name: "Benzoporphyrin derivative (Visudyne)",
                class: Chlorin,
                activation_wavelength_nm: 690.0,
                singlet_oxygen_yield: 0.76,
                drug_light_interval_h: 0.25,
                typical_dose_mg_kg: 6.0,
                absorption: LinearTable::new(
                    vec![380.0, 430.0, 580.0, 630.0, 690.0, 740.0],
                    vec![60_000.0, 80_000.0, 9_000.0, 12_000.0, 34_000.0, 2_500.0],
                ),
            },
            PhotosensitizerRecord {
                id: "Radachlorin",
                generic_name: "Chlorin e6 derivative",
                class: Chlorin,
                activation_wavelength_nm: 662.0,
                singlet_oxygen_yield: 0.64,
                drug_light_interval_h: 3.0,
                typical_dose_mg_kg: 1.0,
                absorption: LinearTable::new(
                    vec![380.0, 405.0, 505.0, 600.0, 662.0, 720.0],
                    vec![100_000.0, 160_000.0, 9_000.0, 7_000.0, 40_000.0, 2_000.0],
                ),
            },
            PhotosensitizerRecord {
                id: "ALA",
                generic_name: "5-Aminolevulinic acid (PpIX)",
                class: Porphyrin,
                activation_wavelength_nm: 635.0,
                singlet_oxygen_yield: 0.56,
                drug_light_interval_h: 4.0,
                typical_dose_mg_kg: 20.0,
                absorption: LinearTable::new(
                    vec![380.0, 410.0, 505.0, 540.0, 575.0, 635.0, 700.0],
                    vec![120_000.0, 170_000.0, 11_000.0, 9_500.0, 7_500.0, 5_000.0, 400.0],
                ),
            },
            PhotosensitizerRecord {
                id: "MAL",
                generic_name: "Methyl aminolevulinate (Metvix)",
                class: Porphyrin,
                activation_wavelength_nm: 635.0,
                singlet_oxygen_yield: 0.56,
                drug_light_interval_h: 3.0,
                typical_dose_mg_kg: 160.0,
                absorption: LinearTable::new(
                    vec![380.0, 410.0, 505.0, 540.0, 575.0, 635.0, 700.0],
                    vec![120_000.0, 170_000.0, 11_000.0, 9_500.0, 7_500.0, 5_000.0, 400.0],
                ),
            },
            PhotosensitizerRecord {
                id: "Tookad",
                generic_name: "Padeliporfin (WST11)",
                class: Bacteriochlorin,
                activation_wavelength_nm: 753.0,
                singlet_oxygen_yield: 0.50,
                drug_light_interval_h: 0.1,
                typical_dose_mg_kg: 4.0,
                absorption: LinearTable::new(
                    vec![380.0, 450.0, 520.0, 630.0, 753.0, 800.0],
                    vec![70_000.0, 40_000.0, 25_000.0, 12_000.0, 88_000.0, 5_000.0],
                ),
            },
            PhotosensitizerRecord {
                id: "Redaporfin",
                generic_name: "LUZ11",
                class: Bacteriochlorin,
                activation_wavelength_nm: 749.0,
                singlet_oxygen_yield: 0.43,
                drug_light_interval_h: 0.25,
                typical_dose_mg_kg: 0.75,
                absorption: LinearTable::new(
                    vec![380.0, 450.0, 515.0, 630.0, 749.0, 800.0],
                    vec![90_000.0, 50_000.0, 30_000.0, 15_000.0, 140_000.0, 8_000.0],
                ),
            },
        ];
        Self { records }
    }

    /// Look up a photosensitizer by id.
    pub fn get(&self, id: &str) -> Result<&PhotosensitizerRecord, PhotosensitizerError> {
        self.records
            .iter()
            .find(|ps| ps.id == id)
            .ok_or_else(|| PhotosensitizerError::UnknownPhotosensitizer(id.to_string()))
    }

    /// All catalogued photosensitizers.
    pub fn list(&self) -> &[PhotosensitizerRecord] {
        &self.records
    }
}
