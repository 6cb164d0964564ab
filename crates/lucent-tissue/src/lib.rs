//! # Lucent Tissue
//!
//! Optical-property catalogs for the Lucent framework. The central type is
//! [`store::TissuePropertyStore`], which answers coefficient lookups for any
//! catalogued tissue at an arbitrary wavelength within its sampled domain.
//!
//! ## Available catalogs
//!
//! | Catalog | Module | Contents |
//! |---------|--------|----------|
//! | Tissues | [`store`] / [`catalog`] | Spectral (μa, μs, g) samples + refractive index |
//! | Opsins | [`opsins`] | Activation wavelength and threshold irradiance |
//! | Photosensitizers | [`photosensitizers`] | Absorption spectra and singlet-oxygen yield |
//! | Fluorescence indicators | [`indicators`] | Excitation/emission peaks, quantum yield |
//!
//! ## Interpolation
//!
//! Tabulated data is interpolated linearly between the two bracketing
//! spectral samples ([`interp::LinearTable`]); queries that hit a sample
//! exactly bypass interpolation. There is no extrapolation: queries outside
//! the sampled domain are an error.
//!
//! All catalogs are immutable after construction and safe to share across
//! any number of reader threads.

pub mod catalog;
pub mod indicators;
pub mod interp;
pub mod opsins;
pub mod photosensitizers;
pub mod store;
