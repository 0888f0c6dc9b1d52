//! Chart configuration from properties
//!
//! Every default lives in chart.json; this module only turns property values
//! into typed configuration structs.

use crate::chart::properties::PropertyReader;
use std::time::Duration;

/// Space reserved around the drawing area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    /// From `[top, right, bottom, left]`
    pub fn from_quad(quad: [f64; 4]) -> Self {
        Self {
            top: quad[0],
            right: quad[1],
            bottom: quad[2],
            left: quad[3],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Number of ranked bars per year
    pub top_n: usize,

    /// Tick interval; also the duration of every transition
    pub tick: Duration,

    pub year_start: f64,
    pub year_end: f64,
    pub year_step: f64,

    pub width: f64,
    pub height: f64,
    pub margin: Margin,

    pub title: String,
    pub subtitle: String,
    pub caption: String,

    /// Seed for bar colours, None = random
    pub seed: Option<u64>,
}

impl RaceConfig {
    pub fn from_properties(props: &PropertyReader) -> Self {
        Self {
            top_n: props.get_usize("race.top.n").max(1),
            tick: period(props, "race.tick.ms"),
            year_start: props.get_f64("race.year.start"),
            year_end: props.get_f64("race.year.end"),
            year_step: props.get_f64_in_range("race.year.step", 1e-6, f64::MAX),
            width: props.get_f64_in_range("race.width", 1.0, 100_000.0),
            height: props.get_f64_in_range("race.height", 1.0, 100_000.0),
            margin: Margin::from_quad(props.get_quad("race.margin")),
            title: props.get_string("race.title"),
            subtitle: props.get_string("race.subtitle"),
            caption: props.get_string("race.caption"),
            seed: props.get_optional_u64("race.seed"),
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    /// Outer size, margins included
    pub width: f64,
    pub height: f64,
    pub margin: Margin,

    /// Duration of every transition
    pub duration: Duration,

    /// How often new load data arrives
    pub interval: Duration,

    pub free_color: [u8; 3],
    pub load_color: [u8; 3],

    /// Upper end of the colour domain (lower end is 0)
    pub value_max: f64,

    /// Seed for generated data, None = random
    pub seed: Option<u64>,
}

impl HeatmapConfig {
    pub fn from_properties(props: &PropertyReader) -> Self {
        Self {
            width: props.get_f64_in_range("heatmap.width", 1.0, 100_000.0),
            height: props.get_f64_in_range("heatmap.height", 1.0, 100_000.0),
            margin: Margin::from_quad(props.get_quad("heatmap.margin")),
            duration: period(props, "heatmap.duration.ms"),
            interval: period(props, "heatmap.interval.ms"),
            free_color: props.get_color("heatmap.color.free"),
            load_color: props.get_color("heatmap.color.load"),
            value_max: props.get_f64_in_range("heatmap.value.max", f64::MIN_POSITIVE, f64::MAX),
            seed: props.get_optional_u64("heatmap.seed"),
        }
    }

    /// Drawing width inside the margins
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    /// Drawing height inside the margins
    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}

/// Where rendered frames go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One SVG file per frame
    Frames,
    /// Render nothing (no container)
    None,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output: OutputMode,
    pub frame_interval: Duration,
}

impl RenderConfig {
    pub fn from_properties(props: &PropertyReader) -> Self {
        let output = match props.get_enum("render.output").as_str() {
            "none" => OutputMode::None,
            _ => OutputMode::Frames,
        };
        Self {
            output,
            frame_interval: period(props, "render.frame.ms"),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}

/// Longest accepted timer period, one hour
const MAX_PERIOD_MS: u64 = 3_600_000;

/// Timer period in milliseconds, non-zero and bounded
fn period(props: &PropertyReader, name: &str) -> Duration {
    Duration::from_millis(props.get_u64_in_range(name, 1, MAX_PERIOD_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_defaults() {
        let config = RaceConfig::default();
        assert_eq!(config.top_n, 12);
        assert_eq!(config.tick, Duration::from_millis(500));
        assert_eq!(config.year_start, 2000.0);
        assert_eq!(config.year_end, 2001.0);
        assert_eq!(config.year_step, 0.1);
        assert_eq!(config.margin.top, 80.0);
        assert_eq!(config.margin.bottom, 5.0);
        assert_eq!(config.subtitle, "Brand value, $m");
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_heatmap_defaults() {
        let config = HeatmapConfig::default();
        assert_eq!(config.inner_width(), 750.0);
        assert_eq!(config.inner_height(), 450.0);
        assert_eq!(config.duration, Duration::from_millis(2000));
        assert_eq!(config.interval, Duration::from_millis(5000));
        assert_eq!(config.free_color, [0, 255, 0]);
        assert_eq!(config.load_color, [255, 0, 0]);
        assert_eq!(config.value_max, 100.0);
    }

    #[test]
    fn test_overrides() {
        let mut props = PropertyReader::default();
        props.set("race.top.n", "0");
        props.set("race.tick.ms", "0");
        props.set("race.year.step", "-1");
        props.set("render.output", "none");

        let race = RaceConfig::from_properties(&props);
        assert_eq!(race.top_n, 1);
        assert_eq!(race.tick, Duration::from_millis(500));
        assert_eq!(race.year_step, 0.1);

        let render = RenderConfig::from_properties(&props);
        assert_eq!(render.output, OutputMode::None);
        assert_eq!(render.frame_interval, Duration::from_millis(40));
    }

    #[test]
    fn test_periods_are_bounded() {
        let mut props = PropertyReader::default();
        props.set("race.tick.ms", "18446744073709551615");
        props.set("heatmap.interval.ms", "3600001");
        props.set("heatmap.duration.ms", "3600000");
        props.set("render.frame.ms", "1");

        assert_eq!(RaceConfig::from_properties(&props).tick, Duration::from_millis(500));
        let heatmap = HeatmapConfig::from_properties(&props);
        assert_eq!(heatmap.interval, Duration::from_millis(5000));
        assert_eq!(heatmap.duration, Duration::from_secs(3600));
        assert_eq!(
            RenderConfig::from_properties(&props).frame_interval,
            Duration::from_millis(1)
        );
    }
}
