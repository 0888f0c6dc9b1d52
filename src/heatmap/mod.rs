//! Load heatmap: day × hour grid refreshed with random data
//!
//! Structure:
//! - `data.rs`: weekly load generator
//! - `controller.rs`: `Heatmap`, cell reconciliation, tooltip and frame building

pub mod controller;
pub mod data;

pub use controller::{CellKey, Heatmap};
pub use data::{GridCell, LoadGenerator};
