//! # aerocascade
//!
//! A windshield sizing design cascade: heat load from windshield size,
//! cooling system weight from heat load, and fuel burn from weight and size.
//!
//! The core ([`models`], [`cascade`], [`sweep`]) is pure arithmetic over a
//! fixed thermal → cooling → fuel pipeline. Everything else is presentation:
//! configuration, CSV export, compliance flags, text reports, JSON bundles
//! and a memoizing interactive session.
//!
//! ```
//! use aerocascade::{Cascade, Preset};
//!
//! let cascade = Cascade::from_preset(Preset::Baseline);
//! let r = cascade.evaluate(3.0).unwrap();
//! assert!((r.fuel_burn - 50.6).abs() < 1e-9);
//! ```

pub mod cascade;
pub mod compliance;
pub mod config;
pub mod error;
pub mod interactive;
pub mod io;
pub mod models;
pub mod report;
pub mod session;
pub mod sweep;

pub use cascade::{Cascade, CascadeResult};
pub use error::CascadeError;
pub use models::{Coefficients, CoolingModel, FuelModel, Preset, ThermalModel};
pub use sweep::{Column, SweepRange, SweepTable};

#[cfg(test)]
mod tests;
