//! Axis whose ticks are reconciled and animated like any other element
//!
//! Ticks are keyed by their label. New ticks fade in at their position,
//! surviving ticks slide to their new position, vanished ticks fade out and
//! are removed once the fade completes.

use super::error::Result;
use super::reconcile::{Join, Reconciler};
use super::scales::{Axis, AxisOrient, AxisTick};
use super::scene::{Anchor, Line, Shape, Stroke, Text};
use super::transition::{Transition, Tween};
use std::time::Duration;

/// Gap between tick line end and label
const TICK_PADDING: f64 = 3.0;

/// Grey used for tick lines
const TICK_COLOR: [u8; 3] = [0x99, 0x99, 0x99];

#[derive(Debug, Clone)]
struct TickElement {
    position: Tween<f64>,
    opacity: Tween<f64>,
    origin: bool,
}

impl TickElement {
    fn is_settled(&self, now: Duration) -> bool {
        self.position.is_settled(now) && self.opacity.is_settled(now)
    }
}

#[derive(Debug, Clone)]
pub struct AnimatedAxis {
    class: String,
    orient: AxisOrient,
    tick_size: f64,
    ticks: Reconciler<String, TickElement>,
}

impl AnimatedAxis {
    pub fn new(class: &str, orient: AxisOrient) -> Self {
        Self {
            class: class.to_string(),
            orient,
            tick_size: 6.0,
            ticks: Reconciler::new(),
        }
    }

    /// Move to a new axis descriptor over `transition`
    pub fn update(&mut self, axis: &Axis, transition: Transition) -> Result<Join<String>> {
        self.orient = axis.orient;
        self.tick_size = axis.tick_size;

        self.ticks.reconcile(
            &axis.ticks,
            |tick: &AxisTick| tick.label.clone(),
            |tick| {
                let mut opacity = Tween::at_rest(0.0);
                opacity.animate_to(1.0, transition);
                TickElement {
                    position: Tween::at_rest(tick.position),
                    opacity,
                    origin: tick.origin,
                }
            },
            |tick, element| {
                element.position.animate_to(tick.position, transition);
                element.opacity.animate_to(1.0, transition);
                element.origin = tick.origin;
            },
            |_, element| element.opacity.animate_to(0.0, transition),
        )
    }

    /// Drop ticks whose fade-out has finished
    pub fn sweep(&mut self, now: Duration) -> usize {
        self.ticks.sweep(|t| t.is_settled(now)).len()
    }

    /// Labels of ticks that are not fading out
    pub fn labels(&self) -> Vec<String> {
        let mut live: Vec<(f64, String)> = self
            .ticks
            .iter()
            .filter(|(k, _)| !self.ticks.is_exiting(k))
            .map(|(k, t)| (*t.position.target(), k.clone()))
            .collect();
        live.sort_by(|a, b| a.0.total_cmp(&b.0));
        live.into_iter().map(|(_, k)| k).collect()
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        self.ticks.iter().all(|(_, t)| t.is_settled(now))
    }

    /// Tick lines and labels at `now`, to be placed inside a translated group
    pub fn shapes(&self, now: Duration) -> Shape {
        let mut children = Vec::with_capacity(self.ticks.len() * 2);
        let outer = self.tick_size.max(0.0) + TICK_PADDING;

        for (label, tick) in self.ticks.iter() {
            let p = tick.position.value_at(now);
            let opacity = tick.opacity.value_at(now);
            let class = if tick.origin { "tick origin" } else { "tick" };

            let (line, text) = match self.orient {
                AxisOrient::Top => (
                    (p, 0.0, p, -self.tick_size),
                    Text::new(class, p, -outer, label.as_str()).anchor(Anchor::Middle),
                ),
                AxisOrient::Bottom => (
                    (p, 0.0, p, self.tick_size),
                    Text::new(class, p, outer + 9.0, label.as_str()).anchor(Anchor::Middle),
                ),
                AxisOrient::Left => (
                    (0.0, p, -self.tick_size, p),
                    Text::new(class, -outer, p + 4.0, label.as_str()).anchor(Anchor::End),
                ),
            };

            children.push(Shape::Line(Line {
                class: class.to_string(),
                x1: line.0,
                y1: line.1,
                x2: line.2,
                y2: line.3,
                stroke: Stroke {
                    color: TICK_COLOR,
                    width: 1.0,
                },
                opacity,
            }));
            children.push(Shape::Text(text.font_size(10.0).opacity(opacity)));
        }

        Shape::Group {
            class: self.class.clone(),
            translate: (0.0, 0.0),
            children,
        }
    }
}
