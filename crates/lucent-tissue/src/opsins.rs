//! Opsin catalog for optogenetics planning.
//!
//! Activation thresholds are irradiances at the cell membrane needed for
//! reliable photocurrent, taken from the characterization papers of each
//! opsin (Boyden 2005 for ChR2 through Marshel 2019 for ChRmine).

use serde::Serialize;
use thiserror::Error;

/// Errors from opsin catalog lookups.
#[derive(Debug, Error)]
pub enum OpsinError {
    #[error("Unknown opsin: {0}")]
    UnknownOpsin(String),
}

/// Whether activating the opsin excites or silences the target neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpsinKind {
    Excitatory,
    Inhibitory,
}

/// A single opsin with its activation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct OpsinRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: OpsinKind,
    /// Peak activation wavelength (nm).
    pub peak_wavelength_nm: f64,
    /// Irradiance threshold for reliable activation (mW/mm²).
    pub activation_threshold_mw_mm2: f64,
}

/// Read-only opsin catalog.
pub struct OpsinCatalog {
    opsins: Vec<OpsinRecord>,
}

impl OpsinCatalog {
    /// The embedded catalog of commonly used opsins.
    pub fn builtin() -> Self {
        use OpsinKind::*;
        let opsins = vec![
            OpsinRecord {
                id: "ChR2",
                name: "Channelrhodopsin-2",
                kind: Excitatory,
                peak_wavelength_nm: 470.0,
                activation_threshold_mw_mm2: 1.0,
            },
            OpsinRecord {
                id: "ChR2_H134R",
                name: "Channelrhodopsin-2 H134R",
                kind: Excitatory,
                peak_wavelength_nm: 470.0,
                activation_threshold_mw_mm2: 0.5,
            },
            OpsinRecord {
                id: "ChRmine",
                name: "ChRmine",
                kind: Excitatory,
                peak_wavelength_nm: 520.0,
                activation_threshold_mw_mm2: 0.1,
            },
            OpsinRecord {
                id: "Chrimson",
                name: "Chrimson",
                kind: Excitatory,
                peak_wavelength_nm: 590.0,
                activation_threshold_mw_mm2: 0.3,
            },
            OpsinRecord {
                id: "ReaChR",
                name: "ReaChR",
                kind: Excitatory,
                peak_wavelength_nm: 590.0,
                activation_threshold_mw_mm2: 0.5,
            },
            OpsinRecord {
                id: "NpHR",
                name: "Halorhodopsin (eNpHR3.0)",
                kind: Inhibitory,
                peak_wavelength_nm: 590.0,
                activation_threshold_mw_mm2: 2.0,
            },
            OpsinRecord {
                id: "ArchT",
                name: "Archaerhodopsin-T",
                kind: Inhibitory,
                peak_wavelength_nm: 560.0,
                activation_threshold_mw_mm2: 1.0,
            },
            OpsinRecord {
                id: "GtACR2",
                name: "Guillardia theta anion channelrhodopsin 2",
                kind: Inhibitory,
                peak_wavelength_nm: 470.0,
                activation_threshold_mw_mm2: 0.05,
            },
        ];
        Self { opsins }
    }

    /// Look up an opsin by id.
    pub fn get(&self, opsin_id: &str) -> Result<&OpsinRecord, OpsinError> {
        self.opsins
            .iter()
            .find(|o| o.id == opsin_id)
            .ok_or_else(|| OpsinError::UnknownOpsin(opsin_id.to_string()))
    }

    /// All opsins, optionally restricted to one kind.
    pub fn list(&self, kind: Option<OpsinKind>) -> Vec<&OpsinRecord> {
        self.opsins
            .iter()
            .filter(|o| kind.map_or(true, |k| o.kind == k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_opsin() {
        let catalog = OpsinCatalog::builtin();
        let chr2 = catalog.get("ChR2").unwrap();
        assert_eq!(chr2.peak_wavelength_nm, 470.0);
        assert_eq!(chr2.kind, OpsinKind::Excitatory);
    }

    #[test]
    fn test_unknown_opsin() {
        let catalog = OpsinCatalog::builtin();
        assert!(matches!(
            catalog.get("NotAnOpsin"),
            Err(OpsinError::UnknownOpsin(_))
        ));
    }

    #[test]
    fn test_list_by_kind() {
        let catalog = OpsinCatalog::builtin();
        let inhibitory = catalog.list(Some(OpsinKind::Inhibitory));
        assert!(!inhibitory.is_empty());
        assert!(inhibitory.iter().all(|o| o.kind == OpsinKind::Inhibitory));
    }
}
