//! Chart engine shared by the race bar chart and the heatmap
//!
//! Structure:
//! - `error.rs`: error types
//! - `properties.rs`: chart.json property registry and typed reader
//! - `colors.rs`: colour parsing and interpolation
//! - `scales.rs`: linear/band scales and axis descriptors
//! - `axis.rs`: axis ticks reconciled and animated across ticks
//! - `reconcile.rs`: keyed enter/update/exit diffing
//! - `transition.rs`: tweens and the per-tick transition scheduler
//! - `scene.rs`: frame shapes, SVG output and render surfaces
//! - `tooltip.rs`: pointer-driven tooltip
//! - `logger.rs`: tracing setup

pub mod axis;
pub mod colors;
pub mod error;
pub mod logger;
pub mod properties;
pub mod reconcile;
pub mod scales;
pub mod scene;
pub mod tooltip;
pub mod transition;

pub use error::{ChartError, Result};
pub use logger::ChartLogger;
pub use properties::PropertyReader;
pub use reconcile::{Join, Reconciler};
pub use scene::{FrameDirectory, MemorySurface, Scene, Surface};
pub use transition::{LabelTween, Transition, TransitionScheduler, Tween};
