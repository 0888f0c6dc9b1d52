//! Animated Charts Library
//!
//! Headless race bar chart and load heatmap built on a keyed
//! enter/update/exit reconciler and time-based tweens. Frames are produced as
//! SVG scenes and handed to a pluggable surface.

pub mod chart;
pub mod config;
pub mod heatmap;
pub mod pipeline;
pub mod race;
