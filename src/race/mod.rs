//! Race bar chart: ranked brand values animated year by year
//!
//! Structure:
//! - `data.rs`: CSV loader with numeric coercion
//! - `snapshot.rs`: per-year top-N slice and ranking
//! - `ticker.rs`: self-terminating year counter
//! - `controller.rs`: `RaceChart`, reconciliation and frame building

pub mod controller;
pub mod data;
pub mod snapshot;
pub mod ticker;

pub use controller::{RaceChart, TickOutcome};
pub use data::{BrandDataset, BrandRecord};
