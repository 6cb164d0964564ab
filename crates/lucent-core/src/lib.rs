//! # Lucent Core
//!
//! The numerical backbone of the Lucent framework: light propagation in
//! layered absorbing/scattering tissue.
//!
//! ## Architecture
//!
//! Two answers are available for the same physical question, at different
//! cost/precision points:
//!
//! - [`diffusion`] — closed-form diffusion-approximation quantities
//!   (reduced scattering, effective attenuation, penetration depth, diffuse
//!   reflectance). Deterministic, microsecond-scale, adequate whenever the
//!   medium is scattering-dominated.
//! - [`transport`] — the Monte Carlo photon-transport engine. Stochastic
//!   but seeded and bit-reproducible; the numerically authoritative answer
//!   when precision beyond the diffusion approximation is requested.
//!
//! ## Modules
//!
//! - [`types`] — Layers, tissue stacks, scoring grids, result containers.
//! - [`diffusion`] — Diffusion-approximation calculator.
//! - [`transport`] — Monte Carlo engine.

pub mod diffusion;
pub mod transport;
pub mod types;
