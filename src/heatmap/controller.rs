//! Heatmap controller
//!
//! Cells are keyed by `(day, hour)`. Each update recomputes the band scales
//! from the categories present in the data, reconciles cells and animates
//! their fill and value label. A pointer-driven tooltip shows the value under
//! the cursor.

use super::data::GridCell;
use crate::chart::axis::AnimatedAxis;
use crate::chart::colors::ColorPalette;
use crate::chart::error::Result;
use crate::chart::logger::ChartLogger;
use crate::chart::reconcile::{Join, Reconciler};
use crate::chart::scales::{distinct_in_order, format_rounded, Axis, AxisOrient, BandScale};
use crate::chart::scene::{Anchor, Rect, Scene, Shape, Stroke, Text};
use crate::chart::tooltip::TooltipController;
use crate::chart::transition::{LabelTween, TransitionScheduler, Tween};
use crate::config::HeatmapConfig;
use std::fmt;
use std::time::Duration;

const CELL_RADIUS: f64 = 4.0;

const CELL_STROKE: Stroke = Stroke {
    color: [0, 0, 0],
    width: 1.0,
};

/// Identity of a cell across updates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub day: String,
    pub hour: String,
}

impl CellKey {
    pub fn new(day: impl Into<String>, hour: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            hour: hour.into(),
        }
    }
}

impl From<&GridCell> for CellKey {
    fn from(cell: &GridCell) -> Self {
        Self::new(cell.day.as_str(), cell.hour.as_str())
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.day, self.hour)
    }
}

/// Band layout for one update
#[derive(Debug, Clone)]
struct Layout {
    x: BandScale,
    y: BandScale,
    cell_width: f64,
    cell_height: f64,
}

impl Layout {
    fn new(cells: &[GridCell], inner_width: f64, inner_height: f64) -> Result<Self> {
        let days = distinct_in_order(cells.iter().map(|c| c.day.as_str()));
        let hours = distinct_in_order(cells.iter().map(|c| c.hour.as_str()));

        let cell_width = (inner_width / days.len().max(1) as f64).floor();
        let cell_height = (inner_height / hours.len().max(1) as f64).floor();
        let x = BandScale::new(days.iter().cloned(), (0.0, days.len() as f64 * cell_width))?;
        let y = BandScale::new(hours.iter().cloned(), (inner_height, 0.0))?;

        Ok(Self {
            x,
            y,
            cell_width,
            cell_height,
        })
    }

    /// Top-left corner of the cell, in plot coordinates
    fn origin(&self, cell: &GridCell) -> (f64, f64) {
        (
            self.x.position(&cell.day).unwrap_or(0.0),
            self.y.position(&cell.hour).unwrap_or(0.0),
        )
    }
}

#[derive(Debug, Clone)]
struct CellElement {
    value: f64,
    x: Tween<f64>,
    y: Tween<f64>,
    width: Tween<f64>,
    height: Tween<f64>,
    fill: Tween<[u8; 3]>,
    label: LabelTween,
}

impl CellElement {
    fn is_settled(&self, now: Duration) -> bool {
        self.x.is_settled(now)
            && self.y.is_settled(now)
            && self.width.is_settled(now)
            && self.height.is_settled(now)
            && self.fill.is_settled(now)
            && self.label.is_settled(now)
    }

    fn contains(&self, now: Duration, px: f64, py: f64) -> bool {
        let x = self.x.value_at(now);
        let y = self.y.value_at(now);
        px >= x
            && px < x + self.width.value_at(now)
            && py >= y
            && py < y + self.height.value_at(now)
    }
}

pub struct Heatmap {
    config: HeatmapConfig,
    palette: ColorPalette,
    cells: Reconciler<CellKey, CellElement>,
    x_axis: AnimatedAxis,
    y_axis: AnimatedAxis,
    scheduler: TransitionScheduler,
    tooltip: TooltipController<CellKey>,
    running: bool,
    updates: u64,
    logger: ChartLogger,
}

impl Heatmap {
    pub fn new(config: HeatmapConfig) -> Self {
        let palette = ColorPalette::linear(0.0, config.value_max, config.free_color, config.load_color);
        let scheduler = TransitionScheduler::new(config.duration);

        Self {
            config,
            palette,
            cells: Reconciler::new(),
            x_axis: AnimatedAxis::new("x", AxisOrient::Bottom),
            y_axis: AnimatedAxis::new("y", AxisOrient::Left),
            scheduler,
            tooltip: TooltipController::new(),
            running: false,
            updates: 0,
            logger: ChartLogger::new("heatmap"),
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Begin accepting data; the first snapshot is rendered by `update`
    pub fn start(&mut self) {
        self.running = true;
        self.logger.log(format!(
            "started, refresh every {} ms",
            self.config.interval.as_millis()
        ));
    }

    pub fn stop(&mut self) {
        if self.running {
            self.logger.log(format!("stopped after {} updates", self.updates));
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of snapshots reconciled so far
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Fill for a load value
    pub fn color_for(&self, value: f64) -> [u8; 3] {
        self.palette.color_at(value)
    }

    /// Reconcile a new snapshot and start its transition
    ///
    /// Entering cells appear at their slot with the free colour and count up
    /// from 0. Cells missing from the snapshot fade back to the free colour
    /// and are removed once that transition ends.
    pub fn update(&mut self, snapshot: &[GridCell], now: Duration) -> Result<Join<CellKey>> {
        self.sweep(now);

        let layout = Layout::new(
            snapshot,
            self.config.inner_width(),
            self.config.inner_height(),
        )?;
        // Validate keys before the transition is issued
        let keys: Vec<CellKey> = snapshot.iter().map(CellKey::from).collect();
        self.cells.classify(keys.iter())?;

        let transition = self.scheduler.begin(now);
        let palette = &self.palette;
        let free = self.config.free_color;

        let join = self.cells.reconcile(
            snapshot,
            |cell: &GridCell| CellKey::from(cell),
            |cell| {
                let (x, y) = layout.origin(cell);
                let mut fill = Tween::at_rest(free);
                fill.animate_to(palette.color_at(cell.value), transition);
                let mut label = LabelTween::at_rest(0.0, format_rounded);
                label.count(0.0, cell.value, transition);
                CellElement {
                    value: cell.value,
                    x: Tween::at_rest(x),
                    y: Tween::at_rest(y),
                    width: Tween::at_rest(layout.cell_width),
                    height: Tween::at_rest(layout.cell_height),
                    fill,
                    label,
                }
            },
            |cell, element| {
                let (x, y) = layout.origin(cell);
                element.value = cell.value;
                element.x.animate_to(x, transition);
                element.y.animate_to(y, transition);
                element.width.animate_to(layout.cell_width, transition);
                element.height.animate_to(layout.cell_height, transition);
                element.fill.animate_to(palette.color_at(cell.value), transition);
                element.label.count_to(cell.value, transition);
            },
            |_, element| {
                element.fill.animate_to(free, transition);
                element.label.count_to(0.0, transition);
            },
        )?;

        self.x_axis.update(
            &Axis::band(&layout.x, AxisOrient::Bottom, 6.0),
            transition,
        )?;
        self.y_axis
            .update(&Axis::band(&layout.y, AxisOrient::Left, 6.0), transition)?;

        self.updates += 1;
        self.logger.tick(self.updates, "load", &join);
        Ok(join)
    }

    /// Destroy exited cells and axis ticks whose transition is over
    pub fn sweep(&mut self, now: Duration) -> usize {
        let removed = self.cells.sweep(|cell| cell.is_settled(now));
        let cells = &self.cells;
        self.tooltip.retain(|key| cells.get(key).is_some());
        removed.len() + self.x_axis.sweep(now) + self.y_axis.sweep(now)
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        !self.scheduler.is_busy(now)
            && self.x_axis.is_settled(now)
            && self.y_axis.is_settled(now)
            && self.cells.iter().all(|(_, cell)| cell.is_settled(now))
    }

    /// Cells on screen, exiting ones included
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Top-left corner of a cell at `now`, in plot coordinates
    pub fn cell_origin(&self, key: &CellKey, now: Duration) -> Option<(f64, f64)> {
        let cell = self.cells.get(key)?;
        Some((cell.x.value_at(now), cell.y.value_at(now)))
    }

    /// Fill of a cell at `now`
    pub fn cell_fill(&self, key: &CellKey, now: Duration) -> Option<[u8; 3]> {
        self.cells.get(key).map(|cell| cell.fill.value_at(now))
    }

    /// Label text of a cell at `now`
    pub fn cell_text(&self, key: &CellKey, now: Duration) -> Option<String> {
        self.cells.get(key).map(|cell| cell.label.text_at(now))
    }

    /// Live cell under a point given in scene coordinates
    pub fn cell_at(&self, x: f64, y: f64, now: Duration) -> Option<CellKey> {
        let (px, py) = self.to_plot(x, y);
        self.cells
            .iter()
            .filter(|(key, _)| !self.cells.is_exiting(key))
            .find(|(_, cell)| cell.contains(now, px, py))
            .map(|(key, _)| key.clone())
    }

    /// Pointer entered a cell
    pub fn pointer_enter(&mut self, key: CellKey, x: f64, y: f64) {
        tracing::trace!(cell = %key, x, y, "pointer enter");
        self.tooltip.pointer_enter(key, x, y);
    }

    /// Pointer moved within the current cell
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.tooltip.pointer_move(x, y);
    }

    /// Pointer left the current cell
    pub fn pointer_leave(&mut self) {
        self.tooltip.pointer_leave();
    }

    /// Route a raw pointer position to enter, move or leave
    pub fn pointer_at(&mut self, x: f64, y: f64, now: Duration) {
        match self.cell_at(x, y, now) {
            Some(key) if self.tooltip.target() == Some(&key) => self.pointer_move(x, y),
            Some(key) => self.pointer_enter(key, x, y),
            None => self.pointer_leave(),
        }
    }

    pub fn tooltip_visible(&self) -> bool {
        self.tooltip.is_visible()
    }

    /// Everything on screen at `now`
    pub fn frame(&self, now: Duration) -> Scene {
        let config = &self.config;
        let inner_height = config.inner_height();
        let mut scene = Scene::new(config.width, config.height);
        let mut children = Vec::with_capacity(self.cells.len() * 2 + 2);

        if let Shape::Group { class, children: ticks, .. } = self.x_axis.shapes(now) {
            children.push(Shape::Group {
                class,
                translate: (0.0, inner_height),
                children: ticks,
            });
        }
        children.push(self.y_axis.shapes(now));

        for (_, cell) in self.cells.iter() {
            let x = cell.x.value_at(now);
            let y = cell.y.value_at(now);
            let width = cell.width.value_at(now);
            let height = cell.height.value_at(now);

            children.push(Shape::Rect(Rect {
                class: "hour".to_string(),
                x,
                y,
                width,
                height,
                radius: CELL_RADIUS,
                fill: cell.fill.value_at(now),
                stroke: Some(CELL_STROKE),
            }));
            children.push(Shape::Text(
                Text::new(
                    "hourLabel",
                    x + width / 2.0,
                    y + height / 2.0,
                    cell.label.text_at(now),
                )
                .anchor(Anchor::Middle)
                .font_size(10.0),
            ));
        }

        scene.push(Shape::Group {
            class: "heatmap".to_string(),
            translate: (config.margin.left, config.margin.top),
            children,
        });

        scene.tooltip = self.tooltip.view(|key| {
            let cell = self.cells.get(key)?;
            let text = format!(
                "{} at {} {}",
                format_rounded(cell.value),
                key.day,
                key.hour
            );
            Some((text, self.palette.color_at(cell.value)))
        });

        scene
    }

    fn to_plot(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.config.margin.left, y - self.config.margin.top)
    }
}
