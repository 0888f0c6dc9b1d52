//! Timer loops driving a chart
//!
//! Each loop multiplexes two tokio intervals on the current task:
//! 1. the coarse tick, which produces the next snapshot and starts a transition
//! 2. the frame timer, which samples every tween and hands the scene to a surface
//!
//! Chart time is the `Duration` since the loop started, so tests running on a
//! paused tokio clock see exactly the same timeline as a real run.

use crate::chart::error::Result;
use crate::chart::scene::{render, Surface};
use crate::heatmap::{Heatmap, LoadGenerator};
use crate::race::{RaceChart, TickOutcome};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What a finished loop did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Snapshots reconciled, the initial one included
    pub ticks: u64,
    /// Frames handed to the surface (or skipped for lack of one)
    pub frames: u64,
    pub elapsed: Duration,
}

/// Run the race chart until the final year has been shown and has settled
pub async fn run_race<S>(
    chart: &mut RaceChart,
    mut surface: Option<&mut S>,
    frame_interval: Duration,
) -> Result<RunSummary>
where
    S: Surface + ?Sized,
{
    let started = Instant::now();
    let mut summary = RunSummary::default();

    if let TickOutcome::Rendered { .. } = chart.start(Duration::ZERO)? {
        summary.ticks += 1;
    }
    render(surface.as_deref_mut(), summary.frames, &chart.frame(Duration::ZERO))?;
    summary.frames += 1;

    let tick_period = chart.config().tick;
    let mut ticks = interval_at(started + tick_period, tick_period);
    let mut frames = interval_at(started + frame_interval, frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticks.tick(), if chart.is_running() => {
                if let TickOutcome::Rendered { .. } = chart.tick(started.elapsed())? {
                    summary.ticks += 1;
                }
            }
            _ = frames.tick() => {
                let now = started.elapsed();
                chart.sweep(now);
                render(surface.as_deref_mut(), summary.frames, &chart.frame(now))?;
                summary.frames += 1;

                if !chart.is_running() && chart.is_settled(now) {
                    break;
                }
            }
        }
    }

    summary.elapsed = started.elapsed();
    tracing::info!(
        chart = "race",
        ticks = summary.ticks,
        frames = summary.frames,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "animation finished"
    );
    Ok(summary)
}

/// Run the heatmap, refreshing data every configured interval
///
/// Free-running unless `max_ticks` is given, in which case the loop stops
/// after that many snapshots and returns once the last transition settles.
/// `hover` places a pointer at a fixed scene position on every frame.
pub async fn run_heatmap<S>(
    chart: &mut Heatmap,
    generator: &mut LoadGenerator,
    mut surface: Option<&mut S>,
    frame_interval: Duration,
    max_ticks: Option<u64>,
    hover: Option<(f64, f64)>,
) -> Result<RunSummary>
where
    S: Surface + ?Sized,
{
    let started = Instant::now();
    let mut summary = RunSummary::default();

    chart.start();
    chart.update(&generator.generate_week(), Duration::ZERO)?;
    summary.ticks += 1;
    stop_at_limit(chart, summary.ticks, max_ticks);

    let refresh = chart.config().interval;
    let mut ticks = interval_at(started + refresh, refresh);
    let mut frames = interval_at(started, frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticks.tick(), if chart.is_running() => {
                chart.update(&generator.generate_week(), started.elapsed())?;
                summary.ticks += 1;
                stop_at_limit(chart, summary.ticks, max_ticks);
            }
            _ = frames.tick() => {
                let now = started.elapsed();
                chart.sweep(now);
                if let Some((x, y)) = hover {
                    chart.pointer_at(x, y, now);
                }
                render(surface.as_deref_mut(), summary.frames, &chart.frame(now))?;
                summary.frames += 1;

                if !chart.is_running() && chart.is_settled(now) {
                    break;
                }
            }
        }
    }

    summary.elapsed = started.elapsed();
    tracing::info!(
        chart = "heatmap",
        ticks = summary.ticks,
        frames = summary.frames,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "animation finished"
    );
    Ok(summary)
}

fn stop_at_limit(chart: &mut Heatmap, ticks: u64, max_ticks: Option<u64>) {
    if max_ticks.is_some_and(|max| ticks >= max) {
        chart.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::scene::{MemorySurface, Shape};
    use crate::config::{HeatmapConfig, RaceConfig};
    use crate::race::{BrandDataset, BrandRecord};

    fn race_chart() -> RaceChart {
        let records = (0..=10)
            .flat_map(|k| {
                let year = 2000.0 + k as f64 / 10.0;
                vec![
                    BrandRecord {
                        name: "Alpha".to_string(),
                        year,
                        value: 100.0 + k as f64,
                        last_value: 100.0,
                    },
                    BrandRecord {
                        name: "Beta".to_string(),
                        year,
                        value: 120.0 - 3.0 * k as f64,
                        last_value: 120.0,
                    },
                ]
            })
            .collect();
        let config = RaceConfig {
            seed: Some(1),
            ..RaceConfig::default()
        };
        RaceChart::new(config, BrandDataset::from_records(records))
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_terminates_at_final_year() {
        let mut chart = race_chart();
        let mut memory = MemorySurface::default();

        let summary = run_race(&mut chart, Some(&mut memory), Duration::from_millis(40))
            .await
            .unwrap();

        // 2000.0 through 2001.0 in 0.1 steps
        assert_eq!(summary.ticks, 11);
        assert_eq!(chart.current_year(), Some(2001.0));
        assert!(!chart.is_running());
        // Last tick at 5000 ms, its transition settles at 5500 ms
        assert!(summary.elapsed >= Duration::from_millis(5500));
        assert!(summary.elapsed < Duration::from_millis(5600));
        assert_eq!(memory.frames, summary.frames);

        let scene = memory.last_scene.unwrap();
        let year = scene.find_class("yearText").into_iter().find_map(|s| match s {
            Shape::Text(t) => Some(t.text.clone()),
            _ => None,
        });
        assert_eq!(year.as_deref(), Some("2001"));
        // Beta overtaken by Alpha in the final year
        assert_eq!(chart.ranking()[0].0, "Alpha");
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_without_surface_still_runs() {
        let mut chart = race_chart();
        let summary = run_race(
            &mut chart,
            None::<&mut MemorySurface>,
            Duration::from_millis(100),
        )
        .await
        .unwrap();
        assert_eq!(summary.ticks, 11);
        assert!(summary.frames > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heatmap_stops_after_tick_limit() {
        let mut chart = Heatmap::new(HeatmapConfig::default());
        let mut generator = LoadGenerator::new(Some(5), 100.0);
        let mut memory = MemorySurface::default();

        let summary = run_heatmap(
            &mut chart,
            &mut generator,
            Some(&mut memory),
            Duration::from_millis(40),
            Some(3),
            Some((60.0, 440.0)),
        )
        .await
        .unwrap();

        // Refreshes at 0, 5000 and 10000 ms; the last settles at 12000 ms
        assert_eq!(summary.ticks, 3);
        assert_eq!(chart.updates(), 3);
        assert!(summary.elapsed >= Duration::from_millis(12000));
        assert!(summary.elapsed < Duration::from_millis(12100));

        let scene = memory.last_scene.unwrap();
        assert_eq!(scene.find_class("hour").len(), 168);
        let tip = scene.tooltip.unwrap();
        assert!(tip.text.ends_with("at Monday 01am"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_heatmap_single_snapshot() {
        let mut chart = Heatmap::new(HeatmapConfig::default());
        let mut generator = LoadGenerator::new(Some(5), 100.0);
        let summary = run_heatmap(
            &mut chart,
            &mut generator,
            None::<&mut MemorySurface>,
            Duration::from_millis(40),
            Some(1),
            None,
        )
        .await
        .unwrap();
        assert_eq!(summary.ticks, 1);
        assert!(summary.elapsed >= Duration::from_millis(2000));
    }
}
