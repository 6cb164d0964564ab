//! Tissue optical-property store.
//!
//! [`TissuePropertyStore`] owns the catalog of [`TissueRecord`]s and answers
//! coefficient lookups at arbitrary wavelength. The store is built once at
//! startup from the embedded catalog ([`crate::catalog`]) and is immutable
//! afterwards, so it can be shared freely across reader threads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interp::LinearTable;

/// Errors from tissue property lookups.
#[derive(Debug, Error)]
pub enum TissueError {
    #[error("Unknown tissue: {0}")]
    UnknownTissue(String),

    #[error(
        "Wavelength {wavelength_nm} nm is outside the data range [{min_nm}, {max_nm}] nm for tissue '{tissue_id}'"
    )]
    WavelengthOutOfRange {
        tissue_id: String,
        wavelength_nm: f64,
        min_nm: f64,
        max_nm: f64,
    },
}

/// Broad anatomical category of a tissue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TissueCategory {
    Neural,
    Skin,
    Organ,
    Tumor,
    Connective,
}

impl std::str::FromStr for TissueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neural" => Ok(Self::Neural),
            "skin" => Ok(Self::Skin),
            "organ" => Ok(Self::Organ),
            "tumor" => Ok(Self::Tumor),
            "connective" => Ok(Self::Connective),
            other => Err(format!(
                "Unknown tissue category '{}'. Valid: neural, skin, organ, tumor, connective",
                other
            )),
        }
    }
}

/// Optical properties of a tissue at a single wavelength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpticalProperties {
    /// Wavelength at which the properties were evaluated (nm).
    pub wavelength_nm: f64,
    /// Absorption coefficient (mm⁻¹).
    pub mu_a_per_mm: f64,
    /// Scattering coefficient (mm⁻¹).
    pub mu_s_per_mm: f64,
    /// Scattering anisotropy factor (mean cosine of the scattering angle).
    pub g: f64,
    /// Refractive index.
    pub n: f64,
}

impl OpticalProperties {
    /// Reduced scattering coefficient μs′ = μs·(1−g) (mm⁻¹).
    pub fn mu_s_prime_per_mm(&self) -> f64 {
        self.mu_s_per_mm * (1.0 - self.g)
    }
}

/// A single tissue with tabulated spectral coefficients.
///
/// Construction asserts the record invariants (strictly increasing
/// wavelengths, non-negative coefficients, g ∈ [-1, 1], n > 0); a violated
/// invariant is a defect in the embedded catalog and aborts rather than
/// producing a plausible-looking wrong answer.
pub struct TissueRecord {
    id: String,
    display_name: String,
    category: TissueCategory,
    n: f64,
    wavelengths_nm: Vec<f64>,
    mu_a: LinearTable,
    mu_s: LinearTable,
    g: LinearTable,
}

impl TissueRecord {
    /// Construct from tabulated samples `(wavelength_nm, μa, μs, g)`.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: TissueCategory,
        n: f64,
        samples: Vec<(f64, f64, f64, f64)>,
    ) -> Self {
        let id = id.into();
        assert!(n > 0.0, "tissue '{}': refractive index must be > 0", id);
        assert!(
            samples.len() >= 2,
            "tissue '{}': need at least 2 spectral samples",
            id
        );

        let mut wavelengths_nm = Vec::with_capacity(samples.len());
        let mut mu_a_values = Vec::with_capacity(samples.len());
        let mut mu_s_values = Vec::with_capacity(samples.len());
        let mut g_values = Vec::with_capacity(samples.len());

        for (wl, mu_a, mu_s, g) in samples {
            assert!(
                mu_a >= 0.0 && mu_s >= 0.0,
                "tissue '{}': negative coefficient at {} nm",
                id,
                wl
            );
            assert!(
                (-1.0..=1.0).contains(&g),
                "tissue '{}': g = {} outside [-1, 1] at {} nm",
                id,
                g,
                wl
            );
            wavelengths_nm.push(wl);
            mu_a_values.push(mu_a);
            mu_s_values.push(mu_s);
            g_values.push(g);
        }

        // LinearTable::new re-asserts strict monotonicity of the knots.
        let mu_a = LinearTable::new(wavelengths_nm.clone(), mu_a_values);
        let mu_s = LinearTable::new(wavelengths_nm.clone(), mu_s_values);
        let g = LinearTable::new(wavelengths_nm.clone(), g_values);

        Self {
            id,
            display_name: display_name.into(),
            category,
            n,
            wavelengths_nm,
            mu_a,
            mu_s,
            g,
        }
    }

    /// Stable identifier of this tissue (e.g. `brain_gray_matter`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name of this tissue.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Anatomical category.
    pub fn category(&self) -> TissueCategory {
        self.category
    }

    /// Wavelength range over which data is available (nm).
    pub fn wavelength_range_nm(&self) -> (f64, f64) {
        (
            self.wavelengths_nm[0],
            self.wavelengths_nm[self.wavelengths_nm.len() - 1],
        )
    }

    fn properties(&self, wavelength_nm: f64) -> Result<OpticalProperties, TissueError> {
        let (min_nm, max_nm) = self.wavelength_range_nm();
        if wavelength_nm < min_nm || wavelength_nm > max_nm {
            return Err(TissueError::WavelengthOutOfRange {
                tissue_id: self.id.clone(),
                wavelength_nm,
                min_nm,
                max_nm,
            });
        }
        Ok(OpticalProperties {
            wavelength_nm,
            mu_a_per_mm: self.mu_a.evaluate(wavelength_nm),
            mu_s_per_mm: self.mu_s.evaluate(wavelength_nm),
            g: self.g.evaluate(wavelength_nm),
            n: self.n,
        })
    }
}

/// Identifier and display name of a catalog entry, as returned by
/// [`TissuePropertyStore::list`].
#[derive(Debug, Clone, Serialize)]
pub struct TissueSummary {
    pub id: String,
    pub display_name: String,
    pub category: TissueCategory,
    pub wavelength_min_nm: f64,
    pub wavelength_max_nm: f64,
}

/// Read-only store of tissue records, loaded once at startup.
pub struct TissuePropertyStore {
    tissues: BTreeMap<String, TissueRecord>,
}

impl TissuePropertyStore {
    /// Build a store from explicit records.
    pub fn from_records(records: Vec<TissueRecord>) -> Self {
        let mut tissues = BTreeMap::new();
        for record in records {
            let prev = tissues.insert(record.id.clone(), record);
            assert!(prev.is_none(), "duplicate tissue id in catalog");
        }
        Self { tissues }
    }

    /// Build the store with the embedded literature catalog.
    pub fn builtin() -> Self {
        Self::from_records(crate::catalog::builtin_tissues())
    }

    fn record(&self, tissue_id: &str) -> Result<&TissueRecord, TissueError> {
        self.tissues
            .get(tissue_id)
            .ok_or_else(|| TissueError::UnknownTissue(tissue_id.to_string()))
    }

    /// Optical properties of a tissue at a given wavelength.
    pub fn lookup(
        &self,
        tissue_id: &str,
        wavelength_nm: f64,
    ) -> Result<OpticalProperties, TissueError> {
        self.record(tissue_id)?.properties(wavelength_nm)
    }

    /// Refractive index of a tissue (wavelength-independent in this catalog).
    pub fn refractive_index(&self, tissue_id: &str) -> Result<f64, TissueError> {
        Ok(self.record(tissue_id)?.n)
    }

    /// Properties of several tissues at one wavelength, in input order.
    pub fn compare(
        &self,
        tissue_ids: &[&str],
        wavelength_nm: f64,
    ) -> Result<Vec<(String, OpticalProperties)>, TissueError> {
        tissue_ids
            .iter()
            .map(|id| Ok((id.to_string(), self.lookup(id, wavelength_nm)?)))
            .collect()
    }

    /// A restartable sequence of properties over `[wl_min, wl_max]` at the
    /// requested step.
    ///
    /// The whole requested range must lie within the tissue's sampled
    /// domain; the range check happens here so iteration itself cannot fail.
    pub fn spectrum(
        &self,
        tissue_id: &str,
        wl_min_nm: f64,
        wl_max_nm: f64,
        step_nm: f64,
    ) -> Result<Spectrum<'_>, TissueError> {
        assert!(step_nm > 0.0, "spectrum step must be positive");
        let record = self.record(tissue_id)?;
        record.properties(wl_min_nm)?;
        record.properties(wl_max_nm)?;
        Ok(Spectrum {
            record,
            wl_min_nm,
            wl_max_nm,
            step_nm,
            next_index: 0,
        })
    }

    /// List catalog entries, optionally filtered by category and by a
    /// case-insensitive substring over id and display name.
    pub fn list(&self, category: Option<TissueCategory>, search: Option<&str>) -> Vec<TissueSummary> {
        let needle = search.map(|s| s.to_lowercase());
        self.tissues
            .values()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .filter(|t| {
                needle.as_deref().map_or(true, |q| {
                    t.id.to_lowercase().contains(q) || t.display_name.to_lowercase().contains(q)
                })
            })
            .map(|t| {
                let (wavelength_min_nm, wavelength_max_nm) = t.wavelength_range_nm();
                TissueSummary {
                    id: t.id.clone(),
                    display_name: t.display_name.clone(),
                    category: t.category,
                    wavelength_min_nm,
                    wavelength_max_nm,
                }
            })
            .collect()
    }

    /// Number of catalogued tissues.
    pub fn len(&self) -> usize {
        self.tissues.len()
    }

    /// True if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tissues.is_empty()
    }
}

/// Restartable iterator over a tissue's coefficient spectrum.
pub struct Spectrum<'a> {
    record: &'a TissueRecord,
    wl_min_nm: f64,
    wl_max_nm: f64,
    step_nm: f64,
    next_index: usize,
}

impl Spectrum<'_> {
    /// Rewind to the first wavelength.
    pub fn restart(&mut self) {
        self.next_index = 0;
    }
}

impl Iterator for Spectrum<'_> {
    type Item = OpticalProperties;

    fn next(&mut self) -> Option<Self::Item> {
        let wl = self.wl_min_nm + self.step_nm * self.next_index as f64;
        if wl > self.wl_max_nm {
            return None;
        }
        self.next_index += 1;
        // Range was validated at construction, so this cannot fail.
        Some(
            self.record
                .properties(wl)
                .expect("spectrum wavelength validated at construction"),
        )
    }
}
