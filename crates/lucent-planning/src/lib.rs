//! # Lucent Planning
//!
//! Application-level calculators built on the property catalogs
//! (`lucent-tissue`) and the light-propagation core (`lucent-core`):
//!
//! - [`fiber`] — fiber-optic light delivery: NA-dependent divergence, spot
//!   size and power density versus distance in tissue.
//! - [`optogenetics`] — minimum launch power for opsin activation at depth,
//!   and opsin recommendation under a power budget.
//! - [`thermal`] — bio-heat safety bounds for continuous and pulsed
//!   illumination.
//! - [`pdt`] — photodynamic-therapy dosimetry.
//! - [`fluorescence`] — expected indicator signal and SNR at depth.
//!
//! Conditions a caller must branch on (unsafe exposure, no viable opsin)
//! are result variants, never `Err`; the error type below is reserved for
//! malformed inputs.

pub mod fiber;
pub mod fluorescence;
pub mod optogenetics;
pub mod pdt;
pub mod thermal;

use thiserror::Error;

use lucent_core::diffusion::DiffusionError;
use lucent_core::transport::TransportError;
use lucent_tissue::indicators::IndicatorError;
use lucent_tissue::opsins::OpsinError;
use lucent_tissue::photosensitizers::PhotosensitizerError;
use lucent_tissue::store::TissueError;

/// Input errors surfaced by the planning calculators.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error(transparent)]
    Tissue(#[from] TissueError),

    #[error(transparent)]
    Opsin(#[from] OpsinError),

    #[error(transparent)]
    Photosensitizer(#[from] PhotosensitizerError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Diffusion(#[from] DiffusionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
