//! Fluorescence indicator catalog.
//!
//! Genetically encoded calcium indicators used by the fluorescence
//! collection model. Photophysics after Dana *et al.* (2019) and the
//! original GCaMP6 characterization (Chen *et al.*, *Nature* 2013).

use serde::Serialize;
use thiserror::Error;

/// Errors from indicator catalog lookups.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
}

/// A fluorescence indicator record.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorRecord {
    pub id: &'static str,
    pub name: &'static str,
    /// Excitation peak (nm).
    pub excitation_peak_nm: f64,
    /// Emission peak (nm).
    pub emission_peak_nm: f64,
    /// Fluorescence quantum yield.
    pub quantum_yield: f64,
    /// Molar extinction coefficient at the excitation peak (M⁻¹cm⁻¹).
    pub extinction_coefficient_m_cm: f64,
}

impl IndicatorRecord {
    /// Brightness figure of merit: quantum yield × extinction coefficient.
    pub fn brightness(&self) -> f64 {
        self.quantum_yield * self.extinction_coefficient_m_cm
    }
}

/// Read-only indicator catalog.
pub struct IndicatorCatalog {
    records: Vec<IndicatorRecord>,
}

impl IndicatorCatalog {
    /// The embedded catalog of common indicators.
    pub fn builtin() -> Self {
        let records = vec![
            IndicatorRecord {
                id: "GCaMP6s",
                name: "GCaMP6s",
                excitation_peak_nm: 488.0,
                emission_peak_nm: 512.0,
                quantum_yield: 0.65,
                extinction_coefficient_m_cm: 56_000.0,
            },
            IndicatorRecord {
                id: "GCaMP6f",
                name: "GCaMP6f",
                excitation_peak_nm: 488.0,
                emission_peak_nm: 512.0,
                quantum_yield: 0.59,
                extinction_coefficient_m_cm: 56_000.0,
            },
            IndicatorRecord {
                id: "GCaMP7f",
                name: "jGCaMP7f",
                excitation_peak_nm: 488.0,
                emission_peak_nm: 512.0,
                quantum_yield: 0.62,
                extinction_coefficient_m_cm: 60_000.0,
            },
            IndicatorRecord {
                id: "jRGECO1a",
                name: "jRGECO1a",
                excitation_peak_nm: 565.0,
                emission_peak_nm: 600.0,
                quantum_yield: 0.32,
                extinction_coefficient_m_cm: 72_000.0,
            },
            IndicatorRecord {
                id: "RCaMP2",
                name: "RCaMP2",
                excitation_peak_nm: 570.0,
                emission_peak_nm: 595.0,
                quantum_yield: 0.42,
                extinction_coefficient_m_cm: 56_000.0,
            },
        ];
        Self { records }
    }

    /// Look up an indicator by id.
    pub fn get(&self, id: &str) -> Result<&IndicatorRecord, IndicatorError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| IndicatorError::UnknownIndicator(id.to_string()))
    }

    /// All catalogued indicators.
    pub fn list(&self) -> &[IndicatorRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_ordering() {
        let catalog = IndicatorCatalog::builtin();
        let s6 = catalog.get("GCaMP6s").unwrap();
        let f6 = catalog.get("GCaMP6f").unwrap();
        assert!(s6.brightness() > f6.brightness());
    }

    #[test]
    fn test_unknown_indicator() {
        let catalog = IndicatorCatalog::builtin();
        assert!(matches!(
            catalog.get("GCaMP99"),
            Err(IndicatorError::UnknownIndicator(_))
        ));
    }
}
