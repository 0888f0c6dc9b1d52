//! Positional scales and axis descriptors
//!
//! - `LinearScale`: continuous value → pixel mapping with "nice" tick generation
//! - `BandScale`: category → fixed-width pixel slot
//! - `Axis`: tick positions, labels and tick size for an oriented axis
//!
//! Scales are plain values; charts rebuild or re-domain them every tick.

use super::error::{ChartError, Result};
use std::collections::HashMap;

/// Linear mapping from a numeric domain onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Domain `[0, max]` over the given values
    ///
    /// An empty snapshot has no maximum; the domain falls back to `[0, 0]`,
    /// which maps every value onto the start of the range.
    pub fn zero_to_max<I>(values: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let max = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
            .unwrap_or(0.0);
        Self::new((0.0, max), range)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value to the range
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Roughly `count` evenly spaced, human friendly values inside the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (start, stop) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        nice_ticks(start, stop, count)
    }
}

/// Tick values at multiples of 1, 2 or 5 × 10^k covering `[start, stop]`
fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let raw_step = (stop - start) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        let step = factor * 10f64.powf(power);
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    } else {
        // Divide by the inverse step to keep decimals exact (0.1 rather than 0.30000000000000004)
        let inverse = 10f64.powf(-power) / factor;
        let first = (start * inverse).ceil() as i64;
        let last = (stop * inverse).floor() as i64;
        (first..=last).map(|i| i as f64 / inverse).collect()
    }
}

/// Band scale: each category gets an equal slot of the range
///
/// A reversed range (`r0 > r1`) assigns the first category to the slot
/// nearest `r0`.
#[derive(Debug, Clone)]
pub struct BandScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    range: (f64, f64),
}

impl BandScale {
    /// Build from categories; duplicates keep their first position
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::Scale(format!(
                "band range must be finite, got {:?}",
                range
            )));
        }

        let domain = distinct_in_order(domain);
        let index = domain
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();

        Ok(Self {
            domain,
            index,
            range,
        })
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Distance between the starts of adjacent bands
    pub fn step(&self) -> f64 {
        let (r0, r1) = self.range;
        (r1 - r0).abs() / self.domain.len().max(1) as f64
    }

    /// Width of a band (no padding, so equal to the step)
    pub fn bandwidth(&self) -> f64 {
        self.step()
    }

    /// Start of the band for `category`, None if it is not in the domain
    pub fn position(&self, category: &str) -> Option<f64> {
        let i = *self.index.get(category)?;
        let (r0, r1) = self.range;
        let n = self.domain.len();
        let slot = if r1 < r0 { n - 1 - i } else { i };
        Some(r0.min(r1) + self.step() * slot as f64)
    }
}

/// Distinct values in order of first appearance
pub fn distinct_in_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        let v: String = v.into();
        if seen.insert(v.clone()) {
            out.push(v);
        }
    }
    out
}

/// Which side of the plot an axis is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    Top,
    Bottom,
    Left,
}

/// A single axis tick
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    /// Formatted label, also the tick's identity across ticks
    pub label: String,
    /// Offset along the axis, in pixels
    pub position: f64,
    /// True for the tick at value zero of a linear axis
    pub origin: bool,
}

/// Axis descriptor: orientation, tick size and ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: AxisOrient,
    /// Tick line length; negative values draw across the plot
    pub tick_size: f64,
    pub ticks: Vec<AxisTick>,
}

impl Axis {
    /// Axis for a linear scale with about `count` ticks, labels grouped by thousands
    pub fn linear(scale: &LinearScale, orient: AxisOrient, count: usize, tick_size: f64) -> Self {
        let ticks = scale
            .ticks(count)
            .into_iter()
            .map(|v| AxisTick {
                label: format_grouped(v),
                position: scale.scale(v),
                origin: v == 0.0,
            })
            .collect();

        Self {
            orient,
            tick_size,
            ticks,
        }
    }

    /// Axis for a band scale: one tick per category at the band centre
    pub fn band(scale: &BandScale, orient: AxisOrient, tick_size: f64) -> Self {
        let half = scale.bandwidth() / 2.0;
        let ticks = scale
            .domain()
            .iter()
            .filter_map(|category| {
                scale.position(category).map(|p| AxisTick {
                    label: category.clone(),
                    position: p + half,
                    origin: false,
                })
            })
            .collect();

        Self {
            orient,
            tick_size,
            ticks,
        }
    }
}

/// Format a number with `,` thousands separators (`1234567.5` → `1,234,567.5`)
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let text = format!("{}", value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    if value < 0.0 && value.abs() > 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Round to an integer, then format with thousands separators
pub fn format_rounded(value: f64) -> String {
    format_grouped(value.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale_maps_endpoints() {
        let x = LinearScale::new((0.0, 200.0), (0.0, 895.0));
        assert_eq!(x.scale(0.0), 0.0);
        assert_eq!(x.scale(200.0), 895.0);
        assert_eq!(x.scale(100.0), 447.5);
    }

    #[test]
    fn test_reversed_rank_scale() {
        // domain [top_n, 0] onto [height - bottom, top]
        let y = LinearScale::new((12.0, 0.0), (595.0, 80.0));
        assert_eq!(y.scale(0.0), 80.0);
        assert_eq!(y.scale(12.0), 595.0);
        assert!(y.scale(1.0) > y.scale(0.0));
    }

    #[test]
    fn test_zero_to_max() {
        let x = LinearScale::zero_to_max(vec![50.0, 30.0, 80.0], (0.0, 100.0));
        assert_eq!(x.domain(), (0.0, 80.0));
    }

    #[test]
    fn test_empty_snapshot_falls_back_to_zero() {
        let x = LinearScale::zero_to_max(Vec::<f64>::new(), (10.0, 100.0));
        assert_eq!(x.domain(), (0.0, 0.0));
        assert_eq!(x.scale(0.0), 10.0);
        assert_eq!(x.scale(42.0), 10.0);
        assert!(x.scale(f64::NAN).is_finite());
    }

    #[test]
    fn test_ticks() {
        let x = LinearScale::new((0.0, 80_000.0), (0.0, 1.0));
        assert_eq!(
            x.ticks(5),
            vec![0.0, 20_000.0, 40_000.0, 60_000.0, 80_000.0]
        );

        let small = LinearScale::new((0.0, 1.0), (0.0, 1.0));
        assert_eq!(small.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let two = LinearScale::new((0.0, 95.0), (0.0, 1.0));
        assert_eq!(two.ticks(2), vec![0.0, 50.0]);

        let flat = LinearScale::new((0.0, 0.0), (0.0, 1.0));
        assert_eq!(flat.ticks(5), vec![0.0]);
    }

    #[test]
    fn test_band_scale_positions() {
        let days = BandScale::new(["Mon", "Tue", "Wed"], (0.0, 300.0)).unwrap();
        assert_eq!(days.bandwidth(), 100.0);
        assert_eq!(days.position("Mon"), Some(0.0));
        assert_eq!(days.position("Wed"), Some(200.0));
        assert_eq!(days.position("Sun"), None);
    }

    #[test]
    fn test_band_scale_reversed_range() {
        let hours = BandScale::new(["01am", "02am"], (450.0, 0.0)).unwrap();
        assert_eq!(hours.position("01am"), Some(225.0));
        assert_eq!(hours.position("02am"), Some(0.0));
    }

    #[test]
    fn test_band_scale_dedupes() {
        let s = BandScale::new(["a", "b", "a"], (0.0, 10.0)).unwrap();
        assert_eq!(s.domain(), &["a".to_string(), "b".to_string()]);
        assert!(BandScale::new(["a"], (0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_linear_axis() {
        let x = LinearScale::new((0.0, 100.0), (0.0, 500.0));
        let axis = Axis::linear(&x, AxisOrient::Top, 5, -515.0);
        assert_eq!(axis.ticks.len(), 6);
        assert!(axis.ticks[0].origin);
        assert!(!axis.ticks[1].origin);
        assert_eq!(axis.ticks[5].label, "100");
        assert_eq!(axis.ticks[5].position, 500.0);
        assert_eq!(axis.tick_size, -515.0);
    }

    #[test]
    fn test_band_axis_centres_ticks() {
        let days = BandScale::new(["Mon", "Tue"], (0.0, 200.0)).unwrap();
        let axis = Axis::band(&days, AxisOrient::Bottom, 6.0);
        let positions: Vec<f64> = axis.ticks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![50.0, 150.0]);
        assert_eq!(axis.ticks[1].label, "Tue");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1000.0), "1,000");
        assert_eq!(format_grouped(1234567.5), "1,234,567.5");
        assert_eq!(format_grouped(-45000.0), "-45,000");
        assert_eq!(format_rounded(72536.6), "72,537");
    }
}
