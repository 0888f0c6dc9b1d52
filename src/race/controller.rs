//! Race bar chart controller
//!
//! Owns everything that changes between ticks: the year counter, the value
//! scale, one bar per brand (with its name and value labels), the axis and the
//! colours handed out so far. Each tick builds the year slice, reconciles it
//! against the bars already on screen and starts one shared transition.

use super::data::BrandDataset;
use super::snapshot::{year_slice, RankedItem};
use super::ticker::YearTicker;
use crate::chart::axis::AnimatedAxis;
use crate::chart::colors::hsl_to_rgb;
use crate::chart::error::Result;
use crate::chart::logger::ChartLogger;
use crate::chart::reconcile::{Join, Reconciler};
use crate::chart::scales::{format_rounded, Axis, AxisOrient, LinearScale};
use crate::chart::scene::{Anchor, Rect, Scene, Shape, Text};
use crate::chart::transition::{LabelTween, Transition, TransitionScheduler, Tween};
use crate::config::RaceConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;

/// Space kept free right of the longest bar for its value label
const VALUE_LABEL_ROOM: f64 = 65.0;

/// Fill for a bar whose colour was never assigned
const FALLBACK_COLOR: [u8; 3] = [0x99, 0x99, 0x99];

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A year was reconciled and its transition started
    Rendered { year: f64 },
    /// The final year was already rendered; nothing was scheduled
    Finished,
}

/// Fixed layout derived from the configuration
#[derive(Debug, Clone, Copy)]
struct Geometry {
    top_n: usize,
    /// Rank → pixel, domain `[top_n, 0]`
    y: LinearScale,
    /// Pixel position of value 0
    x0: f64,
    /// Distance between two ranks
    band: f64,
    bar_height: f64,
    plot_height: f64,
    tick_count: usize,
}

impl Geometry {
    fn new(config: &RaceConfig) -> Self {
        let m = config.margin;
        let top_n = config.top_n.max(1);
        let plot_height = config.height - (m.top + m.bottom);
        let y = LinearScale::new((top_n as f64, 0.0), (config.height - m.bottom, m.top));
        let band = y.scale(1.0) - y.scale(0.0);
        let bar_padding = plot_height / (top_n as f64 * 5.0);

        Self {
            top_n,
            y,
            x0: m.left,
            band,
            bar_height: (band - bar_padding).max(0.0),
            plot_height,
            tick_count: if config.width > 500.0 { 5 } else { 2 },
        }
    }

    fn bar_y(&self, rank: usize) -> f64 {
        self.y.scale(rank as f64) + 5.0
    }

    /// Below the last visible rank; bars enter from and exit to here
    fn offscreen_y(&self) -> f64 {
        self.y.scale((self.top_n + 1) as f64) + 5.0
    }

    /// Baseline of the labels relative to the bar top
    fn label_offset(&self) -> f64 {
        self.band / 2.0 + 1.0
    }
}

/// One brand on screen: bar, name label and value label
#[derive(Debug, Clone)]
struct BarElement {
    color: [u8; 3],
    value: f64,
    rank: usize,
    /// Pixel position of the bar's end, `x(value)`
    end: Tween<f64>,
    /// Top of the bar
    y: Tween<f64>,
    label: LabelTween,
}

impl BarElement {
    fn is_settled(&self, now: Duration) -> bool {
        self.end.is_settled(now) && self.y.is_settled(now) && self.label.is_settled(now)
    }
}

pub struct RaceChart {
    config: RaceConfig,
    dataset: BrandDataset,
    geometry: Geometry,
    x: LinearScale,
    colors: HashMap<String, [u8; 3]>,
    rng: SmallRng,
    bars: Reconciler<String, BarElement>,
    axis: AnimatedAxis,
    scheduler: TransitionScheduler,
    ticker: YearTicker,
    running: bool,
    logger: ChartLogger,
}

impl RaceChart {
    pub fn new(config: RaceConfig, dataset: BrandDataset) -> Self {
        let geometry = Geometry::new(&config);
        let x = LinearScale::new(
            (0.0, 0.0),
            (
                config.margin.left,
                config.width - config.margin.right - VALUE_LABEL_ROOM,
            ),
        );
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let ticker = YearTicker::new(config.year_start, config.year_end, config.year_step);
        let scheduler = TransitionScheduler::new(config.tick);

        Self {
            config,
            dataset,
            geometry,
            x,
            colors: HashMap::new(),
            rng,
            bars: Reconciler::new(),
            axis: AnimatedAxis::new("axis xAxis", AxisOrient::Top),
            scheduler,
            ticker,
            running: false,
            logger: ChartLogger::new("race"),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Render the first year in place, without animation
    ///
    /// Value labels show `lastValue` until the first tick counts them on.
    pub fn start(&mut self, now: Duration) -> Result<TickOutcome> {
        self.running = true;
        self.logger.log(format!(
            "starting at {} with {} records",
            self.config.year_start,
            self.dataset.len()
        ));

        let Some(year) = self.ticker.advance() else {
            self.running = false;
            return Ok(TickOutcome::Finished);
        };
        let join = self.apply(year, Transition::new(now, Duration::ZERO))?;
        self.logger.tick(self.ticker.emitted(), &year_text(year), &join);
        self.finish_if_last();
        Ok(TickOutcome::Rendered { year })
    }

    /// Advance one year and animate towards it
    ///
    /// Once the final year has been rendered the chart stops itself; further
    /// calls return `Finished` without scheduling anything.
    pub fn tick(&mut self, now: Duration) -> Result<TickOutcome> {
        if !self.running {
            return Ok(TickOutcome::Finished);
        }
        let Some(year) = self.ticker.advance() else {
            self.running = false;
            return Ok(TickOutcome::Finished);
        };

        self.sweep(now);
        let transition = self.scheduler.begin(now);
        let join = self.apply(year, transition)?;
        self.logger.tick(self.ticker.emitted(), &year_text(year), &join);
        self.logger
            .progress(self.ticker.emitted(), self.ticker.total());
        self.finish_if_last();
        Ok(TickOutcome::Rendered { year })
    }

    /// Cancel the tick loop; in-flight transitions still complete
    pub fn stop(&mut self) {
        if self.running {
            self.logger.log("stopped");
        }
        self.ticker.stop();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// No bar, label or axis tick is animating
    pub fn is_settled(&self, now: Duration) -> bool {
        !self.scheduler.is_busy(now)
            && self.axis.is_settled(now)
            && self.bars.iter().all(|(_, bar)| bar.is_settled(now))
    }

    /// Destroy exited bars and ticks whose animation is over
    pub fn sweep(&mut self, now: Duration) -> usize {
        let removed = self.bars.sweep(|bar| bar.is_settled(now));
        if !removed.is_empty() {
            tracing::trace!(bars = ?removed, "removed exited bars");
        }
        removed.len() + self.axis.sweep(now)
    }

    /// Year shown by the chart
    pub fn current_year(&self) -> Option<f64> {
        self.ticker.current_year()
    }

    /// Live bars as `(name, value, rank)`, ordered by rank
    pub fn ranking(&self) -> Vec<(String, f64, usize)> {
        let mut live: Vec<(String, f64, usize)> = self
            .bars
            .iter()
            .filter(|(name, _)| !self.bars.is_exiting(name))
            .map(|(name, bar)| (name.clone(), bar.value, bar.rank))
            .collect();
        live.sort_by_key(|(_, _, rank)| *rank);
        live
    }

    /// Bars on screen, exiting ones included
    pub fn element_count(&self) -> usize {
        self.bars.len()
    }

    pub fn color_of(&self, name: &str) -> Option<[u8; 3]> {
        self.colors.get(name).copied()
    }

    /// Current value scale
    pub fn value_scale(&self) -> LinearScale {
        self.x
    }

    /// Everything on screen at `now`
    pub fn frame(&self, now: Duration) -> Scene {
        let config = &self.config;
        let g = self.geometry;
        let mut scene = Scene::new(config.width, config.height);

        scene.push(Shape::Text(Text::new("title", 0.0, 24.0, config.title.as_str())));
        scene.push(Shape::Text(Text::new(
            "subTitle",
            0.0,
            55.0,
            config.subtitle.as_str(),
        )));
        scene.push(Shape::Text(
            Text::new(
                "caption",
                config.width,
                config.height - 5.0,
                config.caption.as_str(),
            )
            .anchor(Anchor::End),
        ));

        if let Shape::Group { class, children, .. } = self.axis.shapes(now) {
            scene.push(Shape::Group {
                class,
                translate: (0.0, config.margin.top),
                children,
            });
        }

        // Exiting bars first so bars moving into place draw over them
        let mut order: Vec<(&String, &BarElement)> = self.bars.iter().collect();
        order.sort_by_key(|(name, _)| !self.bars.is_exiting(name));

        for (name, bar) in order {
            let end = bar.end.value_at(now);
            let y = bar.y.value_at(now);
            let label_y = y + g.label_offset();

            scene.push(Shape::Rect(Rect {
                class: "bar".to_string(),
                x: g.x0 + 1.0,
                y,
                width: end - g.x0 - 1.0,
                height: g.bar_height,
                radius: 0.0,
                fill: bar.color,
                stroke: None,
            }));
            scene.push(Shape::Text(
                Text::new("label", end - 8.0, label_y, name.as_str()).anchor(Anchor::End),
            ));
            scene.push(Shape::Text(Text::new(
                "valueLabel",
                end + 5.0,
                label_y,
                bar.label.text_at(now),
            )));
        }

        if let Some(year) = self.ticker.current_year() {
            scene.push(Shape::Text(
                Text::new(
                    "yearText",
                    config.width - config.margin.right,
                    config.height - 25.0,
                    year_text(year),
                )
                .anchor(Anchor::End)
                .halo(10.0),
            ));
        }

        scene
    }

    /// Reconcile the slice for `year` against the bars on screen
    fn apply(&mut self, year: f64, transition: Transition) -> Result<Join<String>> {
        let slice = year_slice(
            self.dataset.records(),
            year,
            self.ticker.tolerance(),
            self.config.top_n,
        );
        if slice.is_empty() {
            tracing::warn!(year, "no records for year");
        }

        self.x = LinearScale::zero_to_max(slice.iter().map(|i| i.value), self.x.range());
        self.assign_colors(&slice);

        let x = self.x;
        let g = self.geometry;
        let colors = &self.colors;

        let join = self.bars.reconcile(
            &slice,
            |item: &RankedItem| item.name.clone(),
            |item| {
                let mut y = Tween::at_rest(g.offscreen_y());
                y.animate_to(g.bar_y(item.rank), transition);
                // The first year is drawn at rest showing `lastValue`
                let mut label = LabelTween::at_rest(item.last_value, format_rounded);
                if !transition.duration().is_zero() {
                    label.count(item.last_value, item.value, transition);
                }
                BarElement {
                    color: colors.get(&item.name).copied().unwrap_or(FALLBACK_COLOR),
                    value: item.value,
                    rank: item.rank,
                    end: Tween::at_rest(x.scale(item.value)),
                    y,
                    label,
                }
            },
            |item, bar| {
                bar.value = item.value;
                bar.rank = item.rank;
                bar.end.animate_to(x.scale(item.value), transition);
                bar.y.animate_to(g.bar_y(item.rank), transition);
                bar.label.count(item.last_value, item.value, transition);
            },
            |_, bar| {
                bar.end.animate_to(x.scale(bar.value), transition);
                bar.y.animate_to(g.offscreen_y(), transition);
            },
        )?;

        let axis = Axis::linear(&x, AxisOrient::Top, g.tick_count, -g.plot_height);
        self.axis.update(&axis, transition)?;

        Ok(join)
    }

    /// Random pastel colour per brand, kept for the chart's lifetime
    fn assign_colors(&mut self, slice: &[RankedItem]) {
        for item in slice {
            if !self.colors.contains_key(&item.name) {
                let hue = self.rng.gen_range(0.0..360.0);
                self.colors
                    .insert(item.name.clone(), hsl_to_rgb(hue, 0.75, 0.75));
            }
        }
    }

    fn finish_if_last(&mut self) {
        if self.ticker.is_finished() {
            self.running = false;
            self.logger.log(format!(
                "reached final year {}",
                self.ticker
                    .current_year()
                    .map(year_text)
                    .unwrap_or_default()
            ));
        }
    }
}

/// Integer part of the year, as shown on the chart
fn year_text(year: f64) -> String {
    format!("{}", year.trunc() as i64)
}
