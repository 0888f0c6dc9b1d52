//! Colour parsing, conversion and interpolation
//!
//! Colours are plain `[u8; 3]` RGB triples throughout the crate. This module
//! provides:
//! - hex parsing/formatting (`#rrggbb`)
//! - HSL to RGB conversion (random bar colours)
//! - RGB interpolation, used by fill transitions
//! - `ColorPalette`, a continuous value → RGB scale built from sorted stops

/// Parse a hex colour string to an RGB array
///
/// Supports `#RRGGBB`, `#RRGGBBAA` (alpha ignored) and the same without `#`.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

/// Format an RGB array as `#rrggbb`
pub fn to_hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to RGB
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    let channel = |h: f64| -> u8 {
        let h = h.rem_euclid(360.0);
        let v = if h < 60.0 {
            m1 + (m2 - m1) * h / 60.0
        } else if h < 180.0 {
            m2
        } else if h < 240.0 {
            m1 + (m2 - m1) * (240.0 - h) / 60.0
        } else {
            m1
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [channel(h + 120.0), channel(h), channel(h - 120.0)]
}

/// Linear interpolation between two colours, channel by channel
///
/// `t` is clamped to [0, 1]; channels are rounded to the nearest integer so
/// that t=0 and t=1 reproduce the endpoints exactly.
pub fn interpolate_rgb(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    [
        mix(from[0], to[0]),
        mix(from[1], to[1]),
        mix(from[2], to[2]),
    ]
}

/// A continuous colour scale with sorted colour stops
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    /// Sorted list of colour stops (by value, ascending)
    pub stops: Vec<ColorStop>,
}

/// A single colour stop in a palette
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: [u8; 3],
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-stop palette mapping `[min, max]` onto `[low, high]`
    pub fn linear(min: f64, max: f64, low: [u8; 3], high: [u8; 3]) -> Self {
        let mut palette = Self::new();
        palette.add_stop(min, low);
        palette.add_stop(max, high);
        palette
    }

    /// Add a colour stop and maintain sorted order
    pub fn add_stop(&mut self, value: f64, color: [u8; 3]) {
        let stop = ColorStop { value, color };
        match self
            .stops
            .binary_search_by(|s| s.value.total_cmp(&value))
        {
            Ok(pos) => self.stops[pos] = stop, // Replace if exists
            Err(pos) => self.stops.insert(pos, stop),
        }
    }

    /// Get the value range of this palette
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => Some((first.value, last.value)),
            _ => None,
        }
    }

    /// Map a value to a colour
    ///
    /// Uses linear interpolation between the surrounding stops. Values outside
    /// the palette range clamp to the end colours; NaN maps to the first stop.
    pub fn color_at(&self, value: f64) -> [u8; 3] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [128, 128, 128], // Gray default
        };

        if value.is_nan() || value <= first.value {
            return first.color;
        }
        if value >= last.value {
            return last.color;
        }

        let idx = self.stops.partition_point(|stop| stop.value < value);
        let lower = &self.stops[idx - 1];
        let upper = &self.stops[idx];

        let t = (value - lower.value) / (upper.value - lower.value);
        interpolate_rgb(lower.color, upper.color, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("#00ff00"), Some([0, 255, 0]));
        assert_eq!(parse_hex_color("1F78B4"), Some([31, 120, 180]));
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));

        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex([255, 0, 0]), "#ff0000");
        assert_eq!(to_hex([1, 2, 3]), "#010203");
    }

    #[test]
    fn test_hsl_to_rgb() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), [255, 255, 255]);
        // s=0.75, l=0.75 keeps every channel in the pastel band
        let c = hsl_to_rgb(200.0, 0.75, 0.75);
        assert!(c.iter().all(|&ch| ch >= 127));
    }

    #[test]
    fn test_interpolate_rgb_endpoints() {
        let a = [0, 255, 0];
        let b = [255, 0, 0];
        assert_eq!(interpolate_rgb(a, b, 0.0), a);
        assert_eq!(interpolate_rgb(a, b, 1.0), b);
        assert_eq!(interpolate_rgb(a, b, 0.5), [128, 128, 0]);
        assert_eq!(interpolate_rgb(a, b, 7.0), b);
    }

    #[test]
    fn test_palette_add_stop() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [255, 255, 255]);
        palette.add_stop(50.0, [128, 128, 128]);
        palette.add_stop(50.0, [1, 1, 1]);

        assert_eq!(palette.stops.len(), 3);
        assert_eq!(palette.stops[1].value, 50.0);
        assert_eq!(palette.stops[1].color, [1, 1, 1]);
        assert_eq!(palette.range(), Some((0.0, 100.0)));
    }

    #[test]
    fn test_free_and_load_colours() {
        let palette = ColorPalette::linear(0.0, 100.0, [0, 255, 0], [255, 0, 0]);

        assert_eq!(palette.color_at(0.0), [0, 255, 0]);
        assert_eq!(palette.color_at(100.0), [255, 0, 0]);
        assert_eq!(palette.color_at(-10.0), [0, 255, 0]);
        assert_eq!(palette.color_at(140.0), [255, 0, 0]);
    }

    #[test]
    fn test_palette_monotonic() {
        let palette = ColorPalette::linear(0.0, 100.0, [0, 255, 0], [255, 0, 0]);
        let mut prev = palette.color_at(0.0);
        for v in 1..=100 {
            let c = palette.color_at(v as f64);
            assert!(c[0] >= prev[0], "red channel must not decrease at {}", v);
            assert!(c[1] <= prev[1], "green channel must not increase at {}", v);
            prev = c;
        }
    }

    #[test]
    fn test_empty_palette() {
        let palette = ColorPalette::new();
        assert_eq!(palette.range(), None);
        assert_eq!(palette.color_at(3.0), [128, 128, 128]);
    }
}
