//! Synthetic weekly load data

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const HOURS: [&str; 24] = [
    "01am", "02am", "03am", "04am", "05am", "06am", "07am", "08am", "09am", "10am", "11am", "12am",
    "01pm", "02pm", "03pm", "04pm", "05pm", "06pm", "07pm", "08pm", "09pm", "10pm", "11pm", "12pm",
];

/// One load reading
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub day: String,
    pub hour: String,
    pub value: f64,
}

impl GridCell {
    pub fn new(day: impl Into<String>, hour: impl Into<String>, value: f64) -> Self {
        Self {
            day: day.into(),
            hour: hour.into(),
            value,
        }
    }
}

/// Random load per (day, hour), uniform in `[0, max)`
#[derive(Debug, Clone)]
pub struct LoadGenerator {
    rng: SmallRng,
    max: f64,
}

impl LoadGenerator {
    pub fn new(seed: Option<u64>, max: f64) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng, max }
    }

    /// All 24 hours of one day
    pub fn generate_day(&mut self, day: &str) -> Vec<GridCell> {
        HOURS
            .iter()
            .map(|hour| GridCell::new(day, *hour, self.sample()))
            .collect()
    }

    /// Monday to Sunday, day-major
    pub fn generate_week(&mut self) -> Vec<GridCell> {
        WEEK_DAYS
            .iter()
            .flat_map(|day| self.generate_day(day))
            .collect()
    }

    fn sample(&mut self) -> f64 {
        if self.max > 0.0 {
            self.rng.gen_range(0.0..self.max)
        } else {
            0.0
        }
    }
}
